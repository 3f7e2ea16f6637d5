//! In-process cache backed by `DashMap`

use super::Cache;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Lazily expiring in-memory cache
///
/// Expired entries are dropped when read; [`Cache::purge_expired`]
/// sweeps the rest (run periodically by a background task).
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }
        // expired: the read guard above is released before removing
        self.entries.remove_if(key, |_, e| e.expires_at <= now);
        None
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn remove_by_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !k.starts_with(prefix));
        before.saturating_sub(self.entries.len())
    }

    async fn clear_all(&self) {
        self.entries.clear();
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = MemoryCache::new();
        cache.set("a", "1".into(), Duration::from_millis(0)).await;
        cache.set("b", "2".into(), Duration::from_secs(60)).await;
        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.get("b").await.as_deref(), Some("2"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_by_prefix() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("orders_1_20", "x".into(), ttl).await;
        cache.set("orders_2_20", "x".into(), ttl).await;
        cache.set("order_7", "x".into(), ttl).await;
        assert_eq!(cache.remove_by_prefix("orders_").await, 2);
        assert_eq!(cache.get("order_7").await.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let cache = MemoryCache::new();
        cache.set("old", "x".into(), Duration::from_millis(0)).await;
        cache.set("new", "x".into(), Duration::from_secs(60)).await;
        assert_eq!(cache.purge_expired(), 1);
        cache.clear_all().await;
        assert!(cache.is_empty());
    }
}
