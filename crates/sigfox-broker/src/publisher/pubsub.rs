// crates/sigfox-broker/src/publisher/pubsub.rs
// ============================================================================
// Module: Sigfox Pub/Sub Publisher
// Description: Google Pub/Sub REST publisher.
// Purpose: Publish envelopes to durable topic queues over HTTPS.
// Dependencies: sigfox-core, reqwest, base64, url
// ============================================================================

//! ## Overview
//! [`PubSubPublisher`] posts to `v1/projects/<project>/topics/<topic>:publish`
//! with the JSON payload base64-encoded in `messages[0].data`. The first
//! returned message id becomes the receipt id.
//! Invariants:
//! - Requests never follow redirects.
//! - Non-success statuses fail the publish; `404` maps to a missing topic.
//! - Response bodies are capped at [`MAX_RESPONSE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use sigfox_core::PublishError;
use sigfox_core::PublishReceipt;
use sigfox_core::Publisher;
use sigfox_core::TopicName;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default Pub/Sub REST endpoint.
pub const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";
/// Maximum accepted response body size.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;
/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Pub/Sub publisher settings.
#[derive(Debug, Clone)]
pub struct PubSubConfig {
    /// REST endpoint base URL.
    pub endpoint: String,
    /// Google Cloud project id.
    pub project: String,
    /// Optional OAuth bearer token.
    pub bearer_token: Option<String>,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub request_timeout: Duration,
}

impl PubSubConfig {
    /// Creates settings for `project` against the public endpoint.
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_PUBSUB_ENDPOINT.to_string(),
            project: project.into(),
            bearer_token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Publish response returned by Pub/Sub.
#[derive(Debug, Deserialize)]
struct PublishResponse {
    /// Server-assigned ids, one per published message.
    #[serde(rename = "messageIds", default)]
    message_ids: Vec<String>,
}

// ============================================================================
// SECTION: Pub/Sub Publisher
// ============================================================================

/// Google Pub/Sub REST publisher.
#[derive(Debug, Clone)]
pub struct PubSubPublisher {
    /// HTTP client with configured timeouts.
    client: Client,
    /// Parsed endpoint base URL.
    endpoint: Url,
    /// Google Cloud project id.
    project: String,
    /// Precomputed authorization header.
    authorization: Option<HeaderValue>,
}

impl PubSubPublisher {
    /// Builds a publisher from settings.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Encode`] when the endpoint, token, or client
    /// configuration is invalid.
    pub fn new(config: PubSubConfig) -> Result<Self, PublishError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|err| PublishError::Encode(format!("invalid pubsub endpoint: {err}")))?;
        if config.project.trim().is_empty() {
            return Err(PublishError::Encode("pubsub project is empty".to_string()));
        }
        let authorization = config
            .bearer_token
            .as_deref()
            .map(|token| {
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|err| PublishError::Encode(format!("invalid bearer token header: {err}")))
            })
            .transpose()?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| PublishError::Encode(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            endpoint,
            project: config.project,
            authorization,
        })
    }

    /// Returns the publish URL for a topic.
    ///
    /// Project and topic are appended as percent-encoded path segments, so
    /// `/`, `?`, and `#` in a device-derived topic stay inside the segment.
    fn publish_url(&self, topic: &TopicName) -> Result<Url, PublishError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| PublishError::Encode("pubsub endpoint cannot be a base url".to_string()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project.as_str(),
                "topics",
                &format!("{}:publish", topic.as_str()),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl Publisher for PubSubPublisher {
    async fn publish(
        &self,
        topic: &TopicName,
        payload: &Value,
    ) -> Result<PublishReceipt, PublishError> {
        let bytes = serde_json::to_vec(payload).map_err(|err| PublishError::Encode(err.to_string()))?;
        let request_body = json!({
            "messages": [{ "data": STANDARD.encode(bytes) }],
        });
        let mut request = self.client.post(self.publish_url(topic)?).json(&request_body);
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization.clone());
        }
        let mut response = request
            .send()
            .await
            .map_err(|err| PublishError::Delivery(format!("http request failed: {err}")))?;
        let status = response.status();
        let body = read_body_with_limit(&mut response).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(PublishError::TopicMissing(topic.to_string()));
        }
        if !status.is_success() {
            let preview = String::from_utf8_lossy(&body[.. body.len().min(256)]).into_owned();
            return Err(PublishError::Delivery(format!("http status {status}: {preview}")));
        }
        let parsed: PublishResponse = serde_json::from_slice(&body)
            .map_err(|err| PublishError::Delivery(format!("invalid publish response: {err}")))?;
        let message_id = parsed
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| PublishError::Delivery("publish response has no message id".to_string()))?;
        Ok(PublishReceipt {
            message_id,
            topic: topic.clone(),
        })
    }
}

/// Reads a response body while enforcing [`MAX_RESPONSE_BYTES`].
async fn read_body_with_limit(response: &mut reqwest::Response) -> Result<Vec<u8>, PublishError> {
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|err| PublishError::Delivery(format!("failed to read response body: {err}")))?
    {
        if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
            return Err(PublishError::Delivery("response body exceeds size limit".to_string()));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
