// crates/sigfox-broker/tests/publishers/channel_tests.rs
// ============================================================================
// Module: ChannelPublisher Tests
// Description: Tests for the tokio channel publisher.
// Purpose: Validate hand-off, receipts, and back-pressure failures.
// Dependencies: sigfox-broker, sigfox-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`sigfox_broker::ChannelPublisher`] delivery behavior.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use serde_json::json;
use sigfox_broker::ChannelPublisher;
use sigfox_broker::PublishedMessage;
use sigfox_core::PublishError;
use sigfox_core::Publisher;
use sigfox_core::TopicName;

/// Verifies a publish lands on the channel with a matching receipt.
#[tokio::test]
async fn channel_publish_emits_message_with_receipt() {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<PublishedMessage>(4);
    let publisher = ChannelPublisher::with_name(tx, "local");
    let topic = TopicName::new("sigfox.types.decodeStructuredMessage");

    let receipt = publisher.publish(&topic, &json!({"device": "1C8A7E"})).await.expect("publish");
    assert_eq!(receipt.message_id, "local-1");

    let message = rx.recv().await.expect("message");
    assert_eq!(message.topic, topic);
    assert_eq!(message.payload["device"], json!("1C8A7E"));
    assert_eq!(message.receipt, receipt);
}

/// Verifies a full channel fails the publish.
#[tokio::test]
async fn full_channel_fails_delivery() {
    let (tx, _rx) = tokio::sync::mpsc::channel::<PublishedMessage>(1);
    let publisher = ChannelPublisher::new(tx);
    let topic = TopicName::all();
    publisher.publish(&topic, &json!({})).await.expect("first publish");
    let err = publisher.publish(&topic, &json!({})).await.expect_err("channel full");
    assert!(matches!(err, PublishError::Delivery(_)));
}

/// Verifies a closed channel fails the publish.
#[tokio::test]
async fn closed_channel_fails_delivery() {
    let (tx, rx) = tokio::sync::mpsc::channel::<PublishedMessage>(1);
    drop(rx);
    let publisher = ChannelPublisher::new(tx);
    let err = publisher.publish(&TopicName::all(), &json!({})).await.expect_err("closed");
    assert!(matches!(err, PublishError::Delivery(_)));
}
