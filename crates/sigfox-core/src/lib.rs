// crates/sigfox-core/src/lib.rs
// ============================================================================
// Module: Sigfox Pipeline Core Library
// Description: Public API surface for the Sigfox pipeline core.
// Purpose: Expose the envelope model, collaborator interfaces, and hop helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Sigfox pipeline core defines the message envelope carried between
//! independently deployed processing steps, the collaborator contracts a step
//! depends on (queue publisher, trigger decoder, routing table, dedup store,
//! event sink), and the pure helpers used on every hop. It performs no I/O;
//! transports live in `sigfox-broker` and wiring in `sigfox-runtime`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::DecodeError;
pub use interfaces::DedupCheck;
pub use interfaces::DedupError;
pub use interfaces::EventSink;
pub use interfaces::EventSinkError;
pub use interfaces::NeverProcessed;
pub use interfaces::PipelineError;
pub use interfaces::PublishError;
pub use interfaces::PublishReceipt;
pub use interfaces::Publisher;
pub use interfaces::RouteLookup;
pub use interfaces::RouteLookupError;
pub use interfaces::RouteSource;
pub use interfaces::SeenMessageStore;
pub use interfaces::StepTask;
pub use interfaces::TaskError;
pub use interfaces::Trigger;
pub use interfaces::TriggerDecoder;
pub use runtime::CacheRead;
pub use runtime::DEFAULT_CACHE_CAPACITY;
pub use runtime::ExpiringCache;
pub use runtime::HistoryTracker;
pub use runtime::MemoryEventSink;
pub use runtime::NoopEventSink;
pub use runtime::Outcome;
pub use runtime::RequestContext;
pub use runtime::encode_published_payload;
