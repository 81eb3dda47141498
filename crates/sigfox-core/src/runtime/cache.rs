// crates/sigfox-core/src/runtime/cache.rs
// ============================================================================
// Module: Sigfox Expiring Cache
// Description: Process-local cache with per-entry expiry and stale fallback.
// Purpose: Memoize slow lookups (routes) without module-level globals.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`ExpiringCache`] stores values with an absolute `expires_at`. A read of an
//! expired or missing key runs the caller's refresh future. If the refresh
//! fails and an expired value is still held, the stale value is returned
//! together with the refresh error.
//!
//! The lock is never held across the refresh await, so concurrent misses on
//! the same key may refresh twice; the last writer wins.
//!
//! The cache holds at most `capacity` entries. Storing a new key into a full
//! cache evicts the entry that expires first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::core::Clock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum number of cached entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Cached value with its absolute expiry.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// Cached value.
    value: V,
    /// Expiry time in unix epoch milliseconds.
    expires_at: i64,
}

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRead<V, E> {
    /// Unexpired cached value.
    Hit(V),
    /// Value freshly produced by the refresh future.
    Refreshed(V),
    /// Expired value reused because the refresh failed.
    Stale {
        /// Expired value.
        value: V,
        /// Refresh failure.
        error: E,
    },
}

impl<V, E> CacheRead<V, E> {
    /// Returns the value regardless of freshness.
    #[must_use]
    pub fn into_value(self) -> V {
        match self {
            Self::Hit(value) | Self::Refreshed(value) | Self::Stale { value, .. } => value,
        }
    }

    /// Returns a reference to the value.
    #[must_use]
    pub const fn value(&self) -> &V {
        match self {
            Self::Hit(value) | Self::Refreshed(value) | Self::Stale { value, .. } => value,
        }
    }
}

// ============================================================================
// SECTION: Expiring Cache
// ============================================================================

/// Keyed cache whose entries expire after a caller-chosen TTL.
pub struct ExpiringCache<K, V> {
    /// Entries keyed by cache key.
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    /// Time source for expiry checks.
    clock: Arc<dyn Clock>,
    /// Maximum number of entries held.
    capacity: usize,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Overrides the capacity; a zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Returns the number of entries held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |guard| guard.len())
    }

    /// Returns true when no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached value for `key`, refreshing it when missing or expired.
    ///
    /// # Errors
    ///
    /// Returns the refresh error when the refresh fails and no previous value
    /// exists for `key`.
    pub async fn get_or_refresh<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        refresh: F,
    ) -> Result<CacheRead<V, E>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let now = self.clock.now_millis();
        let previous = self.peek(&key);
        if let Some(entry) = &previous
            && entry.expires_at > now
        {
            return Ok(CacheRead::Hit(entry.value.clone()));
        }

        match refresh().await {
            Ok(value) => {
                let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
                let expires_at = self.clock.now_millis().saturating_add(ttl_millis);
                self.store(key, CacheEntry {
                    value: value.clone(),
                    expires_at,
                });
                Ok(CacheRead::Refreshed(value))
            }
            Err(error) => match previous {
                Some(entry) => Ok(CacheRead::Stale {
                    value: entry.value,
                    error,
                }),
                None => Err(error),
            },
        }
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }

    /// Returns a copy of the entry for `key`, expired or not.
    fn peek(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.lock().ok().and_then(|guard| guard.get(key).cloned())
    }

    /// Stores an entry, evicting the soonest-expiring entry when full.
    fn store(&self, key: K, entry: CacheEntry<V>) {
        let Ok(mut guard) = self.entries.lock() else {
            return;
        };
        while !guard.contains_key(&key) && guard.len() >= self.capacity {
            let oldest = guard
                .iter()
                .min_by_key(|(_, held)| held.expires_at)
                .map(|(held_key, _)| held_key.clone());
            match oldest {
                Some(oldest) => {
                    guard.remove(&oldest);
                }
                None => break,
            }
        }
        guard.insert(key, entry);
    }
}

impl<K, V> std::fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache").field("capacity", &self.capacity).finish_non_exhaustive()
    }
}
