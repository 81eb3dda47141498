// crates/sigfox-cli/src/lib.rs
// ============================================================================
// Module: Sigfox Pipeline CLI Library
// Description: Shared helpers for the sigfox-pipeline command-line interface.
// Purpose: Keep wiring and input handling testable outside the binary.
// Dependencies: sigfox-broker, sigfox-config, sigfox-runtime, sigfox-steps
// ============================================================================

//! ## Overview
//! This library houses the CLI's message catalog, bounded input readers, and
//! the wiring that turns a [`sigfox_config::PipelineConfig`] into a step
//! handler or callback ingestor. The binary entry point (`src/main.rs`)
//! imports these helpers so all user-facing output stays consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod input;
/// Message catalog and the `t!` formatting macro.
pub mod messages;
pub mod wiring;
