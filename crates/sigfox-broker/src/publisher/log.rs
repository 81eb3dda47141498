// crates/sigfox-broker/src/publisher/log.rs
// ============================================================================
// Module: Sigfox Log Publisher
// Description: Publisher that writes one JSON line per publish.
// Purpose: Run steps locally without a queue transport.
// Dependencies: sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! [`LogPublisher`] records each publish as a JSON line with the topic,
//! message id, and payload. Nothing is delivered anywhere else.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use sigfox_core::PublishError;
use sigfox_core::PublishReceipt;
use sigfox_core::Publisher;
use sigfox_core::TopicName;

use crate::publisher::ReceiptFactory;

// ============================================================================
// SECTION: Log Publisher
// ============================================================================

/// Log-only queue publisher.
pub struct LogPublisher<W: Write + Send> {
    /// Output writer for publish records.
    writer: Mutex<W>,
    /// Receipt factory for sequential message ids.
    receipts: ReceiptFactory,
}

impl<W: Write + Send> LogPublisher<W> {
    /// Creates a log publisher with the default publisher name.
    pub fn new(writer: W) -> Self {
        Self::with_name(writer, "log")
    }

    /// Creates a log publisher with a custom publisher name.
    pub fn with_name(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer: Mutex::new(writer),
            receipts: ReceiptFactory::new(name),
        }
    }

    /// Consumes the publisher and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Delivery`] when the writer mutex is poisoned.
    pub fn into_inner(self) -> Result<W, PublishError> {
        self.writer
            .into_inner()
            .map_err(|_| PublishError::Delivery("log writer mutex poisoned".to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> Publisher for LogPublisher<W> {
    async fn publish(
        &self,
        topic: &TopicName,
        payload: &Value,
    ) -> Result<PublishReceipt, PublishError> {
        let receipt = self.receipts.next(topic);
        let record = json!({
            "message_id": receipt.message_id,
            "topic": topic.as_str(),
            "payload": payload,
        });
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| PublishError::Delivery("log writer mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, &record)
            .map_err(|err| PublishError::Delivery(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| PublishError::Delivery(err.to_string()))?;
        drop(guard);
        Ok(receipt)
    }
}
