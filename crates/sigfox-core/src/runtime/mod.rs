// crates/sigfox-core/src/runtime/mod.rs
// ============================================================================
// Module: Sigfox Core Runtime Helpers
// Description: History stamping, caching, request context, and outcomes.
// Purpose: Provide the transport-agnostic building blocks of a pipeline hop.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Building blocks shared by the dispatcher, task runner, and entry point in
//! `sigfox-runtime`. None of these helpers perform I/O on their own.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cache;
pub mod context;
pub mod history;
pub mod outcome;
pub mod payload;
pub mod sink;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::CacheRead;
pub use cache::DEFAULT_CACHE_CAPACITY;
pub use cache::ExpiringCache;
pub use context::RequestContext;
pub use history::HistoryTracker;
pub use outcome::Outcome;
pub use payload::encode_published_payload;
pub use sink::MemoryEventSink;
pub use sink::NoopEventSink;
