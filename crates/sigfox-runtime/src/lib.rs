// crates/sigfox-runtime/src/lib.rs
// ============================================================================
// Module: Sigfox Pipeline Runtime Library
// Description: Step entry point, task runner, dispatcher, and callback intake.
// Purpose: Execute one pipeline hop end to end over injected collaborators.
// Dependencies: sigfox-core, time, tokio, uuid
// ============================================================================

//! ## Overview
//! Sigfox Pipeline Runtime wires the collaborator traits from `sigfox-core`
//! into the per-hop control flow. [`StepHandler`] is the infallible entry
//! point of a step, [`TaskRunner`] isolates step failures, and [`Dispatcher`]
//! moves the envelope to the next queue of its route. [`CallbackIngestor`]
//! is the pipeline's front door for Sigfox backend callbacks.
//! Invariants:
//! - No entry point returns an error; failures are logged and reported.
//! - Each dispatch publishes at most once.
//! - Route caches and seen-message stores are explicit values, never globals.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod dedup;
pub mod dispatcher;
pub mod handler;
pub mod ingest;
pub mod routing;
pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dedup::InMemorySeenStore;
pub use dedup::RecentMessageFilter;
pub use dispatcher::Dispatcher;
pub use handler::DEFAULT_FLUSH_TIMEOUT;
pub use handler::FlushStatus;
pub use handler::HandlerError;
pub use handler::InvocationReport;
pub use handler::InvocationState;
pub use handler::StepHandler;
pub use handler::StepHandlerBuilder;
pub use ingest::CallbackError;
pub use ingest::CallbackIngestor;
pub use ingest::CallbackRequest;
pub use ingest::CallbackResult;
pub use ingest::DownlinkData;
pub use ingest::DownlinkResponse;
pub use ingest::parse_sigfox_body;
pub use routing::CachedRouteLookup;
pub use routing::StaticRouteTable;
pub use routing::parse_route_list;
pub use runner::TaskRunner;
