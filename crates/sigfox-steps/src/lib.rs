// crates/sigfox-steps/src/lib.rs
// ============================================================================
// Module: Sigfox Pipeline Steps Library
// Description: Bundled step tasks and the structured payload codec.
// Purpose: Provide the business logic run by the standard pipeline steps.
// Dependencies: sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! Sigfox Pipeline Steps ships the step tasks deployed by default:
//! [`DecodeStructuredMessage`] expands compact sensor payloads,
//! [`RouteMessage`] assigns a device's route, and [`PassThrough`] forwards
//! messages unchanged. [`BuiltinStep`] selects among them by name.
//! Invariants:
//! - Every task is safe to run more than once for the same message.
//! - Tasks only change `body` and, for routing, `route`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builtin;
pub mod decode;
pub mod route;
pub mod structured;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builtin::BuiltinStep;
pub use builtin::PassThrough;
pub use builtin::StepDependencies;
pub use builtin::StepError;
pub use decode::DecodeStructuredMessage;
pub use route::RouteMessage;
pub use structured::PayloadError;
pub use structured::decode_message;
pub use structured::decode_text;
