// crates/sigfox-broker/src/publisher/mod.rs
// ============================================================================
// Module: Sigfox Queue Publishers
// Description: Reference publishers for the pipeline queue transport.
// Purpose: Deliver envelopes to topic queues and return receipts.
// Dependencies: sigfox-core, std
// ============================================================================

//! ## Overview
//! Publishers implement [`sigfox_core::Publisher`]. The in-process variants
//! ([`ChannelPublisher`], [`CallbackPublisher`], [`LogPublisher`]) are used by
//! tests and local runs; [`PubSubPublisher`] talks to the Google Pub/Sub REST
//! API.
//! Invariants:
//! - Receipts are returned only after successful delivery.
//! - A failed publish has no partial side effects on the in-process variants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Value;
use sigfox_core::PublishReceipt;
use sigfox_core::TopicName;

// ============================================================================
// SECTION: Published Message
// ============================================================================

/// Message emitted by channel-based publishers.
///
/// # Invariants
/// - `receipt.topic` equals `topic`.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    /// Destination topic.
    pub topic: TopicName,
    /// Published JSON payload.
    pub payload: Value,
    /// Publish receipt.
    pub receipt: PublishReceipt,
}

// ============================================================================
// SECTION: Receipt Helpers
// ============================================================================

/// Builds sequential publish receipts.
#[derive(Debug)]
pub(crate) struct ReceiptFactory {
    /// Publisher name embedded in message ids.
    publisher: String,
    /// Monotonic counter used for message ids.
    counter: AtomicU64,
}

impl ReceiptFactory {
    /// Creates a receipt factory with the provided publisher name.
    pub(crate) fn new(publisher: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the next receipt for the provided topic.
    pub(crate) fn next(&self, topic: &TopicName) -> PublishReceipt {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        PublishReceipt {
            message_id: format!("{}-{}", self.publisher, seq),
            topic: topic.clone(),
        }
    }
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod callback;
pub mod channel;
pub mod log;
pub mod pubsub;

pub use callback::CallbackPublisher;
pub use channel::ChannelPublisher;
pub use log::LogPublisher;
pub use pubsub::PubSubConfig;
pub use pubsub::PubSubPublisher;
