//! Time-bounded memo for fetched scripts.
//!
//! An entry is served for `ttl` after it was stored. Expired entries are dropped on
//! the next write; nothing else bounds the map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedScript {
    text: String,
    stored_at: Instant,
}

impl CachedScript {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Shared TTL cache keyed by script location. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct CacheStore {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CachedScript>>>,
}

impl CacheStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub const fn is_disabled(&self) -> bool {
        self.ttl.is_zero()
    }

    /// The cached text for `key`, unless it is missing or stale.
    pub async fn get(&self, key: &str) -> Option<String> {
        if self.is_disabled() {
            return None;
        }
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| entry.text.clone())
    }

    /// Store `text` under `key`, pruning stale entries first. No-op when disabled.
    pub async fn put(&self, key: impl Into<String>, text: impl Into<String>) {
        if self.is_disabled() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_fresh(self.ttl, now));
        entries.insert(
            key.into(),
            CachedScript {
                text: text.into(),
                stored_at: now,
            },
        );
    }

    /// Stored entries, stale ones included until the next write prunes them.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
