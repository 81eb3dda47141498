// crates/sigfox-config/src/lib.rs
// ============================================================================
// Module: Sigfox Pipeline Config Library
// Description: Configuration model and validation for pipeline processes.
// Purpose: Single source of truth for sigfox-pipeline.toml semantics.
// Dependencies: sigfox-core, serde, toml
// ============================================================================

//! ## Overview
//! `sigfox-config` defines the `sigfox-pipeline.toml` model used to wire a
//! step handler or callback ingestor. Loading is strict and fails closed;
//! every section has defaults so an empty file is a valid configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
