//! Time-limited cache of filter results.
//!
//! Each entry is stored as `{"value": ..., "expiry": <epoch ms>}` and is
//! visible only while `now < expiry`. Expired and corrupt entries are
//! deleted when read, so the cache heals itself without ever surfacing an
//! error to the filter workflow.

pub mod store;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::utils::clock::SharedClock;
use store::KeyValueStore;

/// Key prefix shared by every cached filter result.
pub const CACHE_PREFIX: &str = "filter_";

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Cache key for a date range, built from the literal input strings.
pub fn filter_key(start: &str, end: &str) -> String {
    format!("{CACHE_PREFIX}{start}_{end}")
}

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    value: T,
    expiry: i64,
}

/// Generic TTL cache over a [`KeyValueStore`].
pub struct ExpiringCache {
    store: Box<dyn KeyValueStore>,
    clock: SharedClock,
    ttl: Duration,
    evictions: usize,
}

impl ExpiringCache {
    pub fn new(store: Box<dyn KeyValueStore>, clock: SharedClock, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            evictions: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of expired or corrupt entries removed since construction.
    pub fn evictions(&self) -> usize {
        self.evictions
    }

    /// Store `value` under `key`, replacing any prior entry. The entry
    /// expires one TTL from now.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry {
            value,
            expiry: self.now_ms() + self.ttl.as_millis() as i64,
        };
        let json = serde_json::to_string(&entry)
            .with_context(|| format!("failed to serialize cache entry {key}"))?;
        self.store.set(key, json);
        Ok(())
    }

    /// Fetch a live entry. Expired or unreadable entries are removed and
    /// reported as absent.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) if self.now_ms() < entry.expiry => Some(entry.value),
            _ => {
                self.evict(key);
                None
            }
        }
    }

    /// Remove every entry whose key starts with `prefix`. Returns the number
    /// removed.
    pub fn clear_matching_prefix(&mut self, prefix: &str) -> usize {
        let keys: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        for key in &keys {
            self.store.remove(key);
        }
        keys.len()
    }

    /// Remove expired or corrupt entries under `prefix`, keeping live ones.
    /// Returns the number removed.
    pub fn sweep_expired(&mut self, prefix: &str) -> usize {
        let now = self.now_ms();
        let stale: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .filter(|k| match self.store.get(k) {
                Some(raw) => !is_live(&raw, now),
                None => false,
            })
            .collect();
        for key in &stale {
            self.evict(key);
        }
        stale.len()
    }

    /// Keys under `prefix` that are still live.
    pub fn live_keys(&self, prefix: &str) -> Vec<String> {
        let now = self.now_ms();
        self.store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .filter(|k| self.store.get(k).is_some_and(|raw| is_live(&raw, now)))
            .collect()
    }

    fn evict(&mut self, key: &str) {
        self.store.remove(key);
        self.evictions += 1;
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }
}

fn is_live(raw: &str, now_ms: i64) -> bool {
    serde_json::from_str::<CacheEntry<serde_json::Value>>(raw).is_ok_and(|e| now_ms < e.expiry)
}
