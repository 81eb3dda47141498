// crates/sigfox-broker/src/publisher/callback.rs
// ============================================================================
// Module: Sigfox Callback Publisher
// Description: Closure-backed publisher.
// Purpose: Let tests and embedders intercept publishes with plain functions.
// Dependencies: sigfox-core
// ============================================================================

//! ## Overview
//! [`CallbackPublisher`] forwards every publish to a user-supplied handler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sigfox_core::PublishError;
use sigfox_core::PublishReceipt;
use sigfox_core::Publisher;
use sigfox_core::TopicName;

// ============================================================================
// SECTION: Callback Publisher
// ============================================================================

/// Callback handler signature used by the publisher.
type CallbackHandler =
    dyn Fn(&TopicName, &Value) -> Result<PublishReceipt, PublishError> + Send + Sync;

/// Callback-based queue publisher.
#[derive(Clone)]
pub struct CallbackPublisher {
    /// Handler invoked with the topic and payload.
    handler: Arc<CallbackHandler>,
}

impl CallbackPublisher {
    /// Creates a callback publisher from a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&TopicName, &Value) -> Result<PublishReceipt, PublishError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl Publisher for CallbackPublisher {
    async fn publish(
        &self,
        topic: &TopicName,
        payload: &Value,
    ) -> Result<PublishReceipt, PublishError> {
        (self.handler)(topic, payload)
    }
}
