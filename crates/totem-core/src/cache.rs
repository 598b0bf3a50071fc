//! # Time-Boxed Read Cache
//!
//! Catalog reads are cached for a few seconds and the cache is dropped on
//! every write that could change them. Entries are never refreshed in place:
//! a read either sees a live entry or misses and repopulates.
//!
//! A read that misses takes a [`Generation`] before going to storage and
//! hands it back on insert. If the cache was invalidated in between, the
//! insert is dropped, so a slow read can never re-cache data a write has
//! already superseded.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Invalidation epoch observed by a reader before it loads from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe, cloneable key-value cache with a fixed time-to-live.
///
/// Clones share the same entries. Values are cloned out on every hit so
/// callers can never mutate what is cached. A zero TTL disables caching.
///
/// The lock is `parking_lot` and is never held across `.await`.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    generation: Arc<AtomicU64>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Live value for `key` as seen at `now`.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Cache `value` under `key` for one TTL.
    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Current invalidation epoch. Take it before loading from storage.
    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::Acquire))
    }

    /// Cache `value` unless the cache was invalidated since `seen` was taken.
    ///
    /// Returns whether the value was stored.
    pub fn insert_if_current(&self, key: K, value: V, seen: Generation) -> bool {
        self.insert_if_current_at(key, value, seen, Instant::now())
    }

    pub fn insert_if_current_at(&self, key: K, value: V, seen: Generation, now: Instant) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        let mut entries = self.entries.write();
        // Invalidations bump the epoch under this same lock.
        if self.generation.load(Ordering::Acquire) != seen.0 {
            return false;
        }
        Self::store(&mut entries, key, value, now, self.ttl);
        true
    }

    /// Cache `value` under `key` for one TTL starting at `now`.
    pub fn insert_at(&self, key: K, value: V, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write();
        Self::store(&mut entries, key, value, now, self.ttl);
    }

    fn store(entries: &mut HashMap<K, Entry<V>>, key: K, value: V, now: Instant, ttl: Duration) {
        // Expired entries are only reclaimed here, on the write path.
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    /// Drop the entry for `key`.
    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    /// Number of stored entries, live or expired.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
