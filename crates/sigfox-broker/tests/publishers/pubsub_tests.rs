// crates/sigfox-broker/tests/publishers/pubsub_tests.rs
// ============================================================================
// Module: PubSubPublisher Tests
// Description: Tests for the Pub/Sub REST publisher against a local server.
// Purpose: Validate request shape, auth header, and status handling.
// Dependencies: sigfox-broker, sigfox-core, tiny_http, base64
// ============================================================================

//! ## Overview
//! Exercises [`sigfox_broker::PubSubPublisher`] with a one-shot HTTP server.

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

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use serde_json::json;
use sigfox_broker::PubSubConfig;
use sigfox_broker::PubSubPublisher;
use sigfox_core::DeviceId;
use sigfox_core::PublishError;
use sigfox_core::Publisher;
use sigfox_core::TopicName;

use super::common::serve_once;

/// Builds a publisher for project `unatumbler` against `endpoint`.
fn publisher(endpoint: &str, token: Option<&str>) -> PubSubPublisher {
    let mut config = PubSubConfig::new("unatumbler");
    config.endpoint = endpoint.to_string();
    config.bearer_token = token.map(str::to_string);
    PubSubPublisher::new(config).expect("publisher")
}

/// Verifies the request path, auth header, and base64 body.
#[tokio::test(flavor = "multi_thread")]
async fn pubsub_publish_posts_base64_message() {
    let (endpoint, server) = serve_once(200, r#"{"messageIds":["4711"]}"#);
    let topic = TopicName::new("sigfox.types.decodeStructuredMessage");
    let receipt = publisher(&endpoint, Some("secret"))
        .publish(&topic, &json!({"device": "1C8A7E"}))
        .await
        .expect("publish");
    assert_eq!(receipt.message_id, "4711");
    assert_eq!(receipt.topic, topic);

    let request = server.join().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "/v1/projects/unatumbler/topics/sigfox.types.decodeStructuredMessage:publish");
    assert_eq!(request.header("Authorization"), Some("Bearer secret"));
    let body: Value = serde_json::from_str(&request.body).unwrap();
    let data = body["messages"][0]["data"].as_str().unwrap();
    let decoded: Value = serde_json::from_slice(&STANDARD.decode(data).unwrap()).unwrap();
    assert_eq!(decoded, json!({"device": "1C8A7E"}));
}

/// Verifies a 404 maps to a missing topic.
#[tokio::test(flavor = "multi_thread")]
async fn pubsub_not_found_is_topic_missing() {
    let (endpoint, server) = serve_once(404, r#"{"error":{"code":404}}"#);
    let err = publisher(&endpoint, None)
        .publish(&TopicName::new("sigfox.types.nope"), &json!({}))
        .await
        .expect_err("missing topic");
    let request = server.join().unwrap();
    assert_eq!(request.header("Authorization"), None);
    assert!(matches!(err, PublishError::TopicMissing(name) if name == "sigfox.types.nope"));
}

/// Verifies server errors fail the publish.
#[tokio::test(flavor = "multi_thread")]
async fn pubsub_server_error_is_delivery_error() {
    let (endpoint, server) = serve_once(500, "oops");
    let err = publisher(&endpoint, None).publish(&TopicName::all(), &json!({})).await.expect_err("500");
    server.join().unwrap();
    assert!(matches!(err, PublishError::Delivery(message) if message.contains("500")));
}

/// Verifies invalid endpoints are rejected at construction.
#[test]
fn pubsub_rejects_invalid_endpoint() {
    let mut config = PubSubConfig::new("p");
    config.endpoint = "not a url".to_string();
    assert!(matches!(PubSubPublisher::new(config), Err(PublishError::Encode(_))));
}

/// Verifies URL delimiters in a device-derived topic are percent-encoded.
#[tokio::test(flavor = "multi_thread")]
async fn pubsub_encodes_topic_path_segment() {
    let (endpoint, server) = serve_once(200, r#"{"messageIds":["1"]}"#);
    let topic = TopicName::for_device(&DeviceId::new("1c8a7e/../x?y#z"));
    publisher(&endpoint, None).publish(&topic, &json!({})).await.expect("publish");
    let request = server.join().unwrap();
    assert_eq!(
        request.url,
        "/v1/projects/unatumbler/topics/sigfox.devices.1C8A7E%2F..%2FX%3FY%23Z:publish"
    );
}
