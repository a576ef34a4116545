//! Popularity leaderboard: concurrency-safe counters keyed by item identity.
//!
//! The backing store sits behind [`CounterStore`] so an in-memory map and
//! an external atomic key-value store are interchangeable. The in-memory
//! implementation serializes every mutation under one coarse lock; an
//! external implementation is expected to lean on that store's native
//! atomic-increment primitive instead of read-modify-write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{Category, Item, LeaderboardEntry};

/// Case-folded, trimmed name - the only merge key for leaderboard entries.
/// Differently-cased or differently-spaced mentions of the same product
/// collapse to one entry.
pub fn identity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Minimal key-value counter abstraction backing the leaderboard.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<LeaderboardEntry>, StoreError>;

    /// Upserts display fields for `key`. On an existing entry only the
    /// mutable display fields (category, last-seen) change: the display
    /// name keeps its first-seen casing, `first_seen` is sticky, and the
    /// count is never overwritten - [`CounterStore::increment`] is the only
    /// operation that moves a count.
    async fn set(&self, key: &str, entry: LeaderboardEntry) -> Result<(), StoreError>;

    /// Atomically adds `delta` to the counter, creating it at zero first if
    /// the key is absent (the same contract a KV store's native increment
    /// gives). Returns the new count.
    async fn increment(&self, key: &str, delta: u64) -> Result<u64, StoreError>;

    /// Every entry, in first-seen insertion order.
    async fn list_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Slot>,
    next_seq: u64,
}

struct Slot {
    seq: u64,
    entry: LeaderboardEntry,
}

/// In-memory [`CounterStore`]. One coarse async lock serializes every
/// mutation, so N concurrent increments to the same key always land as N.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: drops every entry and resets insertion ordering. The
    /// normal lifecycle constructs the store once at process start and
    /// never resets it.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.next_seq = 0;
    }
}

#[async_trait]
impl CounterStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<LeaderboardEntry>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.entries.get(key).map(|slot| slot.entry.clone()))
    }

    async fn set(&self, key: &str, entry: LeaderboardEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(slot) = inner.entries.get_mut(key) {
            slot.entry.category = entry.category;
            slot.entry.last_seen = entry.last_seen;
            if slot.entry.name.is_empty() {
                // Fills a counter that was created by an increment racing
                // ahead of its display upsert.
                slot.entry.name = entry.name;
                slot.entry.first_seen = entry.first_seen;
            }
            return Ok(());
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(key.to_string(), Slot { seq, entry });
        Ok(())
    }

    async fn increment(&self, key: &str, delta: u64) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(slot) = inner.entries.get_mut(key) {
            slot.entry.count += delta;
            slot.entry.last_seen = Utc::now();
            return Ok(slot.entry.count);
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let mut entry = LeaderboardEntry::new("", Category::Other);
        entry.count = delta;
        inner.entries.insert(key.to_string(), Slot { seq, entry });
        Ok(delta)
    }

    async fn list_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let inner = self.inner.lock().await;
        let mut slots: Vec<(u64, LeaderboardEntry)> = inner
            .entries
            .values()
            .map(|slot| (slot.seq, slot.entry.clone()))
            .collect();
        slots.sort_by_key(|(seq, _)| *seq);
        Ok(slots.into_iter().map(|(_, entry)| entry).collect())
    }
}

/// Aggregator owning leaderboard state behind an injected store.
#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn CounterStore>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Records one occurrence per item by identity key. Items whose name
    /// trims to empty are skipped - they can be neither displayed nor
    /// merged.
    pub async fn record(&self, items: &[Item]) -> Result<(), StoreError> {
        for item in items {
            let key = identity_key(&item.name);
            if key.is_empty() {
                continue;
            }
            self.store
                .set(&key, LeaderboardEntry::new(item.name.trim(), item.category))
                .await?;
            self.store.increment(&key, 1).await?;
        }
        Ok(())
    }

    /// Up to `k` entries sorted by count descending. The sort is stable
    /// over the store's insertion-ordered listing, so ties keep first-seen
    /// order.
    pub async fn top(&self, k: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries = self.store.list_all().await?;
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(k);
        Ok(entries)
    }
}
