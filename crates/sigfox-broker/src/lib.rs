// crates/sigfox-broker/src/lib.rs
// ============================================================================
// Module: Sigfox Pipeline Broker Library
// Description: Queue transports, trigger decoders, route sources, and sinks.
// Purpose: Connect pipeline steps to the platform they run on.
// Dependencies: sigfox-core, reqwest, tokio, url
// ============================================================================

//! ## Overview
//! Sigfox Pipeline Broker provides ready-made implementations of the
//! collaborator traits declared in `sigfox-core`: queue [`publisher`]s,
//! [`trigger`] decoders for queue and HTTP invocations, remote route
//! [`source`]s, and JSON-line event sinks in [`telemetry`].
//! Invariants:
//! - Publishers return receipts only on successful delivery.
//! - Triggers are capped at [`MAX_TRIGGER_BYTES`].
//! - HTTP clients never follow redirects.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod publisher;
pub mod source;
pub mod telemetry;
pub mod trigger;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use publisher::CallbackPublisher;
pub use publisher::ChannelPublisher;
pub use publisher::LogPublisher;
pub use publisher::PubSubConfig;
pub use publisher::PubSubPublisher;
pub use publisher::PublishedMessage;
pub use source::DEFAULT_METADATA_ENDPOINT;
pub use source::DEFAULT_ROUTE_KEY;
pub use source::MetadataRouteSource;
pub use telemetry::JsonLinesEventSink;
pub use telemetry::StderrEventSink;
pub use trigger::HttpTriggerDecoder;
pub use trigger::MAX_TRIGGER_BYTES;
pub use trigger::QueueTriggerDecoder;
