// crates/sigfox-core/src/core/mod.rs
// ============================================================================
// Module: Sigfox Core Types
// Description: Envelope, identifiers, topics, time, and event types.
// Purpose: Group the wire-level data model shared by all pipeline crates.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Data model modules. Nothing in here performs I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod envelope;
pub mod events;
pub mod identifiers;
pub mod time;
pub mod topics;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use envelope::Envelope;
pub use envelope::HopRecord;
pub use envelope::Route;
pub use envelope::parse_route_list;
pub use events::PipelineEvent;
pub use identifiers::DeviceId;
pub use identifiers::StepName;
pub use identifiers::TraceId;
pub use time::Clock;
pub use time::ManualClock;
pub use time::SystemClock;
pub use time::tenths_of_seconds;
pub use topics::TopicName;
