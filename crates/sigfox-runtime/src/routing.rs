// crates/sigfox-runtime/src/routing.rs
// ============================================================================
// Module: Sigfox Route Lookup
// Description: Static route tables and cached remote route lookup.
// Purpose: Resolve the step route a device's messages should follow.
// Dependencies: sigfox-core, serde, serde_json
// ============================================================================

//! ## Overview
//! [`StaticRouteTable`] resolves routes from configuration: ordered entries
//! keyed by device id, with a default route. [`CachedRouteLookup`] wraps a
//! remote [`RouteSource`] in an [`ExpiringCache`], reusing the last route when
//! a refresh fails.
//! Invariants:
//! - Device matching is case-insensitive; ids are normalised to uppercase.
//! - Every lookup returns a fresh [`Route`] value.
//! - Device-scoped sources are cached per device; project-wide sources share
//!   the single `None` entry, so a stale route serves every device.
//! - The cache is capacity-bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sigfox_core::CacheRead;
use sigfox_core::Clock;
use sigfox_core::DEFAULT_CACHE_CAPACITY;
use sigfox_core::DeviceId;
use sigfox_core::ExpiringCache;
use sigfox_core::Route;
use sigfox_core::RouteLookup;
use sigfox_core::RouteLookupError;
use sigfox_core::RouteSource;

pub use sigfox_core::parse_route_list;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default time a fetched route stays fresh.
pub const DEFAULT_ROUTE_TTL: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Static Route Table
// ============================================================================

/// One static routing entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteEntry {
    /// Devices this entry applies to.
    pub devices: Vec<DeviceId>,
    /// Route assigned to those devices.
    pub route: Route,
}

/// Route table loaded from configuration.
///
/// # Invariants
/// - Entries are consulted in insertion order; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRouteTable {
    /// Ordered device entries.
    entries: Vec<RouteEntry>,
    /// Route for devices no entry names.
    default_route: Option<Route>,
}

impl StaticRouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default route.
    #[must_use]
    pub fn with_default(mut self, route: Route) -> Self {
        self.default_route = Some(route);
        self
    }

    /// Appends an entry routing `devices` through `route`.
    #[must_use]
    pub fn with_entry(mut self, devices: impl IntoIterator<Item = DeviceId>, route: Route) -> Self {
        self.entries.push(RouteEntry {
            devices: devices.into_iter().collect(),
            route,
        });
        self
    }

    /// Returns the route for `device` without going through the trait.
    ///
    /// # Errors
    ///
    /// Returns [`RouteLookupError::NotFound`] when no entry matches and no
    /// default route is configured.
    pub fn resolve(&self, device: Option<&DeviceId>) -> Result<Route, RouteLookupError> {
        if let Some(device) = device
            && let Some(entry) = self.entries.iter().find(|entry| entry.devices.contains(device))
        {
            return Ok(entry.route.clone());
        }
        self.default_route.clone().ok_or_else(|| {
            RouteLookupError::NotFound(device.map_or_else(
                || "no default route".to_string(),
                |device| format!("no route for device {device}"),
            ))
        })
    }
}

#[async_trait]
impl RouteLookup for StaticRouteTable {
    async fn lookup_route(&self, device: Option<&DeviceId>) -> Result<Route, RouteLookupError> {
        self.resolve(device)
    }
}

#[async_trait]
impl RouteSource for StaticRouteTable {
    async fn fetch_route(&self, device: Option<&DeviceId>) -> Result<Route, RouteLookupError> {
        self.resolve(device)
    }
}

// ============================================================================
// SECTION: Cached Route Lookup
// ============================================================================

/// Result of a cached lookup, including how the value was obtained.
pub type RouteRead = CacheRead<Route, RouteLookupError>;

/// Route lookup backed by a remote source and an expiring cache.
pub struct CachedRouteLookup<S> {
    /// Remote route source.
    source: S,
    /// Route cache keyed by device, or `None` for project-wide sources.
    cache: ExpiringCache<Option<DeviceId>, Route>,
    /// Freshness window for fetched routes.
    ttl: Duration,
}

impl<S: RouteSource> CachedRouteLookup<S> {
    /// Creates a lookup with the default TTL.
    #[must_use]
    pub fn new(source: S, clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: ExpiringCache::new(clock).with_capacity(DEFAULT_CACHE_CAPACITY),
            ttl: DEFAULT_ROUTE_TTL,
        }
    }

    /// Overrides the number of cached device routes.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.cache = self.cache.with_capacity(capacity);
        self
    }

    /// Overrides the freshness window.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the wrapped source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Looks up a route, reporting whether it was a hit, refresh, or stale reuse.
    ///
    /// # Errors
    ///
    /// Returns the source error when the fetch fails and no previous route is
    /// cached under the lookup key.
    pub async fn read_route(&self, device: Option<&DeviceId>) -> Result<RouteRead, RouteLookupError> {
        let key = if self.source.is_device_scoped() { device.cloned() } else { None };
        self.cache.get_or_refresh(key, self.ttl, || self.source.fetch_route(device)).await
    }

    /// Returns the number of cached routes.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached route.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

#[async_trait]
impl<S: RouteSource> RouteLookup for CachedRouteLookup<S> {
    async fn lookup_route(&self, device: Option<&DeviceId>) -> Result<Route, RouteLookupError> {
        self.read_route(device).await.map(CacheRead::into_value)
    }
}

impl<S> std::fmt::Debug for CachedRouteLookup<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRouteLookup").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}
