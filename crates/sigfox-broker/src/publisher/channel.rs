// crates/sigfox-broker/src/publisher/channel.rs
// ============================================================================
// Module: Sigfox Channel Publisher
// Description: Async channel publisher for in-process pipelines.
// Purpose: Hand published envelopes to a tokio receiver.
// Dependencies: sigfox-core, tokio
// ============================================================================

//! ## Overview
//! [`ChannelPublisher`] pushes every publish onto a bounded tokio channel.
//! A full or closed channel fails the publish.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;
use sigfox_core::PublishError;
use sigfox_core::PublishReceipt;
use sigfox_core::Publisher;
use sigfox_core::TopicName;
use tokio::sync::mpsc::Sender;

use crate::publisher::PublishedMessage;
use crate::publisher::ReceiptFactory;

// ============================================================================
// SECTION: Channel Publisher
// ============================================================================

/// Channel-based queue publisher.
///
/// # Invariants
/// - Each successful publish emits a message with a matching receipt.
#[derive(Debug)]
pub struct ChannelPublisher {
    /// Sender used to hand off messages.
    sender: Sender<PublishedMessage>,
    /// Receipt factory for sequential message ids.
    receipts: ReceiptFactory,
}

impl ChannelPublisher {
    /// Creates a channel publisher with the default publisher name.
    #[must_use]
    pub fn new(sender: Sender<PublishedMessage>) -> Self {
        Self::with_name(sender, "channel")
    }

    /// Creates a channel publisher with a custom publisher name.
    #[must_use]
    pub fn with_name(sender: Sender<PublishedMessage>, name: impl Into<String>) -> Self {
        Self {
            sender,
            receipts: ReceiptFactory::new(name),
        }
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn publish(
        &self,
        topic: &TopicName,
        payload: &Value,
    ) -> Result<PublishReceipt, PublishError> {
        let receipt = self.receipts.next(topic);
        let message = PublishedMessage {
            topic: topic.clone(),
            payload: payload.clone(),
            receipt: receipt.clone(),
        };
        self.sender.try_send(message).map_err(|err| PublishError::Delivery(err.to_string()))?;
        Ok(receipt)
    }
}
