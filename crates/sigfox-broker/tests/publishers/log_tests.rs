// crates/sigfox-broker/tests/publishers/log_tests.rs
// ============================================================================
// Module: LogPublisher Tests
// Description: Tests for the JSON-line log publisher.
// Purpose: Validate record shape and writer failures.
// Dependencies: sigfox-broker, sigfox-core
// ============================================================================

//! ## Overview
//! Exercises [`sigfox_broker::LogPublisher`].

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
use sigfox_broker::LogPublisher;
use sigfox_core::PublishError;
use sigfox_core::Publisher;
use sigfox_core::TopicName;

use super::common::FailingWriter;
use super::common::SharedBuffer;

/// Verifies each publish is written as one JSON line.
#[tokio::test]
async fn log_publisher_writes_one_line_per_publish() {
    let buffer = SharedBuffer::new();
    let publisher = LogPublisher::new(buffer.clone());
    publisher.publish(&TopicName::all(), &json!({"device": "1C8A7E"})).await.expect("publish");
    publisher.publish(&TopicName::new("sigfox.types.log"), &json!({})).await.expect("publish");

    let lines = buffer.json_lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["topic"], json!("sigfox.devices.all"));
    assert_eq!(lines[0]["message_id"], json!("log-1"));
    assert_eq!(lines[0]["payload"]["device"], json!("1C8A7E"));
    assert_eq!(lines[1]["message_id"], json!("log-2"));
}

/// Verifies writer failures fail the publish.
#[tokio::test]
async fn log_publisher_write_failure_is_delivery_error() {
    let publisher = LogPublisher::new(FailingWriter);
    let err = publisher.publish(&TopicName::all(), &json!({})).await.expect_err("write fails");
    assert!(matches!(err, PublishError::Delivery(_)));
}
