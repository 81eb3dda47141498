// crates/sigfox-broker/src/source/mod.rs
// ============================================================================
// Module: Sigfox Route Sources
// Description: Remote origins of routing tables.
// Purpose: Fetch routes from outside the process.
// Dependencies: sigfox-core
// ============================================================================

//! ## Overview
//! Route sources implement [`sigfox_core::RouteSource`]. They are uncached;
//! callers wrap them in a cached lookup.

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod metadata;

pub use metadata::DEFAULT_METADATA_ENDPOINT;
pub use metadata::DEFAULT_ROUTE_KEY;
pub use metadata::MetadataRouteSource;
