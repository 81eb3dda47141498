// crates/sigfox-runtime/src/ingest.rs
// ============================================================================
// Module: Sigfox Callback Ingestion
// Description: Normalises Sigfox backend callbacks and fans them out.
// Purpose: Turn one HTTP callback into queue messages and a downlink reply.
// Dependencies: sigfox-core, serde_json, time, uuid
// ============================================================================

//! ## Overview
//! [`CallbackIngestor::ingest`] receives the string-valued callback body sent
//! by the Sigfox backend, normalises it with [`parse_sigfox_body`], stamps a
//! first hop, and publishes the message to `sigfox.devices.all`, then
//! `sigfox.types.<type>`, then `sigfox.devices.<device>`. It always answers
//! with a [`DownlinkResponse`].
//! Invariants:
//! - Fan-out order is fixed; each publish failure is logged and skipped.
//! - Rejected (expired) messages are never published.
//! - Body fields sent by the backend win over generated ones.
//! - `ingest` never returns an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use serde_json::json;
use sigfox_core::Clock;
use sigfox_core::DeviceId;
use sigfox_core::Envelope;
use sigfox_core::EventSink;
use sigfox_core::HistoryTracker;
use sigfox_core::PipelineError;
use sigfox_core::PublishReceipt;
use sigfox_core::Publisher;
use sigfox_core::RequestContext;
use sigfox_core::StepName;
use sigfox_core::TopicName;
use sigfox_core::TraceId;
use sigfox_core::encode_published_payload;
use sigfox_core::events::EVENT_CALLBACK_PUBLISH;
use sigfox_core::events::EVENT_CALLBACK_PUBLISH_ERROR;
use sigfox_core::events::EVENT_CALLBACK_REJECTED;
use sigfox_core::events::EVENT_RESULT;
use sigfox_core::events::EVENT_START;
use sigfox_core::topics::MISSING_DEVICE;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;
use time::macros::offset;
use uuid::Uuid;

use crate::handler::DEFAULT_FLUSH_TIMEOUT;
use crate::handler::FlushStatus;
use crate::handler::finish_context;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Function name recorded on the first hop of every callback message.
pub const DEFAULT_CALLBACK_FUNCTION: &str = "sigfoxCallback";
/// Number of hex digits in a Sigfox downlink payload (8 bytes).
pub const DOWNLINK_HEX_DIGITS: usize = 16;

/// Callback fields converted to booleans.
const BOOL_FIELDS: [&str; 3] = ["duplicate", "ack", "longPolling"];
/// Callback fields converted to floats.
const FLOAT_FIELDS: [&str; 3] = ["snr", "avgSnr", "rssi"];
/// Callback fields converted to integers.
const INT_FIELDS: [&str; 3] = ["lat", "lng", "seqNumber"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Callback configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackError {
    /// Downlink data is not exactly 16 hex digits.
    #[error("invalid downlink data: {0}")]
    InvalidDownlink(String),
}

// ============================================================================
// SECTION: Request / Response
// ============================================================================

/// One Sigfox callback as received over HTTP.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackRequest {
    /// JSON callback body (string-valued fields).
    pub body: Map<String, Value>,
    /// Query string parameters.
    pub query: Map<String, Value>,
    /// Request path, recorded as the hop source.
    pub path: Option<String>,
}

/// Validated 8-byte downlink payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownlinkData(String);

impl DownlinkData {
    /// Parses a downlink payload, normalising it to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::InvalidDownlink`] unless `raw` is exactly
    /// sixteen hex digits.
    pub fn parse(raw: &str) -> Result<Self, CallbackError> {
        let lowered = raw.to_ascii_lowercase();
        if lowered.len() != DOWNLINK_HEX_DIGITS {
            return Err(CallbackError::InvalidDownlink(format!(
                "expected {DOWNLINK_HEX_DIGITS} hex digits, got {}",
                lowered.len()
            )));
        }
        if let Some(bad) = lowered.chars().find(|ch| !ch.is_ascii_hexdigit()) {
            return Err(CallbackError::InvalidDownlink(format!("invalid hex digit '{bad}'")));
        }
        Ok(Self(lowered))
    }

    /// Returns the payload as lowercase hex.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reply returned to the Sigfox backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownlinkResponse {
    /// Device key of the reply (`missing_device` when unknown).
    pub device: String,
    /// Downlink payload, or `None` for `noData`.
    pub downlink_data: Option<String>,
}

impl DownlinkResponse {
    /// Renders the backend reply body.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let inner = match &self.downlink_data {
            Some(data) => json!({ "downlinkData": data }),
            None => json!({ "noData": true }),
        };
        let mut reply = Map::new();
        reply.insert(self.device.clone(), inner);
        Value::Object(reply)
    }
}

/// Outcome of one callback ingestion.
#[derive(Debug)]
pub struct CallbackResult {
    /// Message built from the callback; `isDispatched` is true once fanned out.
    pub envelope: Envelope,
    /// Reply for the Sigfox backend.
    pub response: DownlinkResponse,
    /// Receipts of successful fan-out publishes, in publish order.
    pub published: Vec<PublishReceipt>,
    /// Errors recovered during fan-out.
    pub errors: Vec<PipelineError>,
    /// True when the message was rejected as too old.
    pub rejected: bool,
    /// Outcome of the event flush.
    pub flush: FlushStatus,
}

impl CallbackResult {
    /// Renders the result as JSON for operator output.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let published: Vec<Value> = self
            .published
            .iter()
            .map(|receipt| json!({ "messageId": receipt.message_id, "topic": receipt.topic.as_str() }))
            .collect();
        let errors: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        json!({
            "response": self.response.to_json(),
            "envelope": self.envelope,
            "published": published,
            "rejected": self.rejected,
            "errors": errors,
        })
    }
}

// ============================================================================
// SECTION: Body Normalisation
// ============================================================================

/// Converts the string-valued Sigfox callback fields into typed JSON.
///
/// `time` (seconds) becomes `baseStationTime` and a millisecond `timestamp`
/// string. Boolean, float, and integer fields are converted when they parse;
/// anything else, including empty strings, is left unchanged.
#[must_use]
pub fn parse_sigfox_body(body: &Map<String, Value>) -> Map<String, Value> {
    let mut parsed = body.clone();
    if let Some(seconds) = parsed.get("time").and_then(leading_integer) {
        parsed.remove("time");
        parsed.insert("timestamp".to_string(), Value::String(seconds.saturating_mul(1000).to_string()));
        parsed.insert("baseStationTime".to_string(), Value::from(seconds));
    }
    for field in BOOL_FIELDS {
        if let Some(Value::String(text)) = parsed.get(field)
            && !text.is_empty()
        {
            let flag = text == "true";
            parsed.insert(field.to_string(), Value::Bool(flag));
        }
    }
    for field in FLOAT_FIELDS {
        if let Some(Value::String(text)) = parsed.get(field)
            && let Ok(number) = text.trim().parse::<f64>()
            && let Some(number) = Number::from_f64(number)
        {
            parsed.insert(field.to_string(), Value::Number(number));
        }
    }
    for field in INT_FIELDS {
        if let Some(value @ Value::String(_)) = parsed.get(field)
            && let Some(number) = leading_integer(value)
        {
            parsed.insert(field.to_string(), Value::from(number));
        }
    }
    parsed
}

/// Reads a leading base-10 integer from a string or JSON integer.
fn leading_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let trimmed = text.trim_start();
            let digits_start = usize::from(trimmed.starts_with(['-', '+']));
            let digits_len =
                trimmed[digits_start ..].chars().take_while(char::is_ascii_digit).count();
            if digits_len == 0 {
                return None;
            }
            trimmed[.. digits_start + digits_len].parse().ok()
        }
        _ => None,
    }
}

/// Formats a unix millisecond timestamp as `YYYY-MM-DD HH:MM:SS`, optionally shifted to UTC+8.
fn format_datetime(millis: i64, local: bool) -> Option<String> {
    let nanos = i128::from(millis) * 1_000_000;
    let utc = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
    let moment = if local { utc.to_offset(offset!(+8)) } else { utc };
    moment.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")).ok()
}

/// Builds the callback body: generated fields first, backend fields on top.
fn merge_callback_body(received: &Map<String, Value>, now: i64) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("uuid".to_string(), Value::String(Uuid::new_v4().to_string()));
    if let Some(datetime) = format_datetime(now, false) {
        body.insert("datetime".to_string(), Value::String(datetime));
    }
    if let Some(localdatetime) = format_datetime(now, true) {
        body.insert("localdatetime".to_string(), Value::String(localdatetime));
    }
    body.insert("callbackTimestamp".to_string(), Value::from(now));
    for (key, value) in received {
        body.insert(key.clone(), value.clone());
    }
    body
}

/// Resolves the device from the body, then the query string.
fn resolve_device(body: &Map<String, Value>, query: &Map<String, Value>) -> Option<DeviceId> {
    body.get("device")
        .and_then(Value::as_str)
        .filter(|device| !device.is_empty())
        .or_else(|| query.get("device").and_then(Value::as_str).filter(|device| !device.is_empty()))
        .map(DeviceId::new)
}

/// Returns true when the raw `ack` field asks for no downlink.
fn ack_declined(body: &Map<String, Value>) -> bool {
    match body.get("ack") {
        Some(Value::Bool(flag)) => !flag,
        Some(Value::String(text)) => text == "false",
        _ => false,
    }
}

// ============================================================================
// SECTION: Ingestor
// ============================================================================

/// Sigfox callback ingestion service.
pub struct CallbackIngestor {
    /// Queue transport for fan-out.
    publisher: Arc<dyn Publisher>,
    /// First-hop stamper.
    history: HistoryTracker,
    /// Event sink.
    events: Arc<dyn EventSink>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Configured downlink payload.
    downlink_data: Option<DownlinkData>,
    /// Maximum accepted base-station age.
    max_message_age: Option<Duration>,
    /// Upper bound on the event flush.
    flush_timeout: Duration,
}

impl CallbackIngestor {
    /// Creates an ingestor with no downlink data and no expiry.
    #[must_use]
    pub fn new(publisher: Arc<dyn Publisher>, events: Arc<dyn EventSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            publisher,
            history: HistoryTracker::new(Arc::clone(&clock), DEFAULT_CALLBACK_FUNCTION),
            events,
            clock,
            downlink_data: None,
            max_message_age: None,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    /// Overrides the function name recorded on the first hop.
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.history = HistoryTracker::new(Arc::clone(&self.clock), function);
        self
    }

    /// Sets the downlink payload returned when the device asks for one.
    #[must_use]
    pub fn with_downlink_data(mut self, data: DownlinkData) -> Self {
        self.downlink_data = Some(data);
        self
    }

    /// Rejects messages whose base-station time is older than `max_age`.
    #[must_use]
    pub const fn with_max_message_age(mut self, max_age: Duration) -> Self {
        self.max_message_age = Some(max_age);
        self
    }

    /// Sets the flush timeout.
    #[must_use]
    pub const fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    /// Ingests one callback.
    pub async fn ingest(&self, request: CallbackRequest) -> CallbackResult {
        let ctx = RequestContext::new(
            self.history.function(),
            Uuid::new_v4().to_string(),
            Arc::clone(&self.events),
            Arc::clone(&self.clock),
        );
        let mut ctx = ctx.with_source(request.path.clone());
        let now = ctx.started_at();

        let raw_body = merge_callback_body(&request.body, now);
        let device = resolve_device(&raw_body, &request.query);
        let step = request.query.get("type").and_then(Value::as_str).map(StepName::new);

        let mut envelope = Envelope::new(device.clone(), parse_sigfox_body(&raw_body));
        envelope.step.clone_from(&step);
        envelope.root_trace_id = Some(TraceId::new(Uuid::new_v4().simple().to_string()));
        envelope.extra.insert("query".to_string(), Value::Object(request.query));
        ctx.bind(&envelope);
        ctx.log(EVENT_START, json!({ "body": envelope.body, "type": envelope.step }));

        let mut published = Vec::new();
        let mut errors = Vec::new();
        let rejected = self.is_expired(&ctx, &envelope, now);
        if !rejected {
            let mut stamped = self.history.record_hop(&envelope, now, request.path.as_deref());
            let mut topics = vec![TopicName::all()];
            if let Some(step) = &step {
                topics.push(TopicName::for_type(step));
            }
            if let Some(device) = &device {
                topics.push(TopicName::for_device(device));
            }
            match encode_published_payload(&stamped, false) {
                Ok(payload) => {
                    for topic in topics {
                        match self.publisher.publish(&topic, &payload).await {
                            Ok(receipt) => {
                                ctx.log(
                                    EVENT_CALLBACK_PUBLISH,
                                    json!({ "topic": topic.as_str(), "message_id": receipt.message_id }),
                                );
                                published.push(receipt);
                            }
                            Err(err) => {
                                ctx.log(
                                    EVENT_CALLBACK_PUBLISH_ERROR,
                                    json!({ "topic": topic.as_str(), "error": err.to_string() }),
                                );
                                errors.push(PipelineError::Publish(err));
                            }
                        }
                    }
                }
                Err(err) => {
                    ctx.log(EVENT_CALLBACK_PUBLISH_ERROR, json!({ "error": err.to_string() }));
                    errors.push(PipelineError::Publish(err));
                }
            }
            stamped.is_dispatched = true;
            envelope = stamped;
        }

        let response = DownlinkResponse {
            device: device.as_ref().map_or_else(|| MISSING_DEVICE.to_string(), ToString::to_string),
            downlink_data: if ack_declined(&raw_body) {
                None
            } else {
                self.downlink_data.as_ref().map(|data| data.as_str().to_string())
            },
        };
        ctx.log(
            EVENT_RESULT,
            json!({
                "rejected": rejected,
                "published": published.len(),
                "errors": errors.len(),
                "response": response.to_json(),
            }),
        );

        let flush = finish_context(ctx, self.flush_timeout).await;
        CallbackResult {
            envelope,
            response,
            published,
            errors,
            rejected,
            flush,
        }
    }

    /// Returns true (and logs) when the message is older than the configured age.
    fn is_expired(&self, ctx: &RequestContext, envelope: &Envelope, now: i64) -> bool {
        let Some(max_age) = self.max_message_age else {
            return false;
        };
        let Some(base_station_time) = envelope.body.get("baseStationTime").and_then(Value::as_i64)
        else {
            return false;
        };
        let age_ms = now.saturating_sub(base_station_time.saturating_mul(1000));
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        if age_ms <= max_age_ms {
            return false;
        }
        ctx.log(
            EVENT_CALLBACK_REJECTED,
            json!({
                "age_ms": age_ms,
                "max_age_ms": max_age_ms,
                "baseStationTime": base_station_time,
                "seqNumber": envelope.body.get("seqNumber"),
            }),
        );
        true
    }
}

impl std::fmt::Debug for CallbackIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackIngestor")
            .field("history", &self.history)
            .field("downlink_data", &self.downlink_data)
            .field("max_message_age", &self.max_message_age)
            .finish_non_exhaustive()
    }
}
