// crates/sigfox-runtime/src/dedup.rs
// ============================================================================
// Module: Sigfox Duplicate Filter
// Description: Recent-message duplicate check over a seen-message store.
// Purpose: Skip redelivered messages a step already processed.
// Dependencies: sigfox-core
// ============================================================================

//! ## Overview
//! [`RecentMessageFilter`] implements [`DedupCheck`] by keying each message
//! as `<message id>:<function>` in a [`SeenMessageStore`].
//! [`InMemorySeenStore`] is a TTL-bounded store with a capacity cap.
//! Invariants:
//! - Envelopes with neither `body.uuid` nor `rootTraceId` are never duplicates.
//! - Expired keys are treated as unseen.
//! - When full, the oldest key is evicted first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sigfox_core::Clock;
use sigfox_core::DedupCheck;
use sigfox_core::DedupError;
use sigfox_core::Envelope;
use sigfox_core::RequestContext;
use sigfox_core::SeenMessageStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default time a processed message stays remembered.
pub const DEFAULT_SEEN_TTL: Duration = Duration::from_secs(600);
/// Default maximum number of remembered messages.
pub const DEFAULT_SEEN_CAPACITY: usize = 10_000;

// ============================================================================
// SECTION: Recent Message Filter
// ============================================================================

/// Duplicate check backed by a [`SeenMessageStore`].
#[derive(Debug, Clone)]
pub struct RecentMessageFilter<S> {
    /// Seen-message store.
    store: S,
}

impl<S: SeenMessageStore> RecentMessageFilter<S> {
    /// Wraps `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Returns the wrapped store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

/// Builds the dedup key for `envelope` in `function`, when the message has an id.
#[must_use]
pub fn message_key(function: &str, envelope: &Envelope) -> Option<String> {
    envelope.message_id().map(|id| format!("{id}:{function}"))
}

#[async_trait]
impl<S: SeenMessageStore> DedupCheck for RecentMessageFilter<S> {
    async fn is_processed_message(
        &self,
        ctx: &RequestContext,
        envelope: &Envelope,
    ) -> Result<bool, DedupError> {
        match message_key(ctx.function(), envelope) {
            Some(key) => self.store.seen(&key),
            None => Ok(false),
        }
    }

    async fn mark_processed(
        &self,
        ctx: &RequestContext,
        envelope: &Envelope,
    ) -> Result<(), DedupError> {
        match message_key(ctx.function(), envelope) {
            Some(key) => self.store.mark_seen(&key),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: In-Memory Seen Store
// ============================================================================

/// Mutable state of the in-memory store.
#[derive(Debug, Default)]
struct SeenState {
    /// Expiry time per key (unix epoch milliseconds).
    expires: HashMap<String, i64>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

/// TTL-bounded, capacity-capped seen-message store.
pub struct InMemorySeenStore {
    /// Guarded store state.
    state: Mutex<SeenState>,
    /// Time source for expiry.
    clock: Arc<dyn Clock>,
    /// Retention per key.
    ttl: Duration,
    /// Maximum number of keys held.
    capacity: usize,
}

impl InMemorySeenStore {
    /// Creates a store with the default TTL and capacity.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(SeenState::default()),
            clock,
            ttl: DEFAULT_SEEN_TTL,
            capacity: DEFAULT_SEEN_CAPACITY,
        }
    }

    /// Overrides the retention window.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the capacity; a zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Returns the number of keys currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().map_or(0, |state| state.expires.len())
    }

    /// Returns true when no keys are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locks the store state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SeenState>, DedupError> {
        self.state.lock().map_err(|_| DedupError::Store("seen store mutex poisoned".to_string()))
    }
}

impl SeenMessageStore for InMemorySeenStore {
    fn seen(&self, id: &str) -> Result<bool, DedupError> {
        let now = self.clock.now_millis();
        let mut state = self.lock()?;
        match state.expires.get(id).copied() {
            Some(expires_at) if expires_at > now => Ok(true),
            Some(_) => {
                state.expires.remove(id);
                state.order.retain(|key| key != id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn mark_seen(&self, id: &str) -> Result<(), DedupError> {
        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = self.clock.now_millis().saturating_add(ttl_millis);
        let mut state = self.lock()?;
        if state.expires.insert(id.to_string(), expires_at).is_some() {
            state.order.retain(|key| key != id);
        }
        state.order.push_back(id.to_string());
        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.expires.remove(&oldest);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemorySeenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySeenStore")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
