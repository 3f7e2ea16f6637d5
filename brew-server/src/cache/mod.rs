//! Read-through cache
//!
//! [`Cache`] is the storage seam (string values, per-entry TTL);
//! [`CacheService`] layers JSON (de)serialization and the key scheme used by
//! the services on top of it. Entries are invalidated after every write and
//! never consulted inside a ledger transaction.

mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Default entry lifetime (30 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Key/value cache with TTL and prefix invalidation
#[async_trait]
pub trait Cache: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: String, ttl: Duration);

    async fn remove(&self, key: &str);

    /// Remove every key starting with `prefix`, returning how many were removed
    async fn remove_by_prefix(&self, prefix: &str) -> usize;

    async fn clear_all(&self);

    /// Drop expired entries eagerly; backends with native expiry return 0
    fn purge_expired(&self) -> usize {
        0
    }
}

/// Cache key scheme
pub mod keys {
    pub const ORDERS_PREFIX: &str = "orders_";
    pub const CATEGORIES_PREFIX: &str = "categories_";
    pub const DRINKS_PREFIX: &str = "drinks_";
    /// Single-drink entries (`drink_{id}`); does not match listings
    pub const DRINK_PREFIX: &str = "drink_";
    pub const INGREDIENTS_PREFIX: &str = "ingredients_";

    pub fn order(id: i64) -> String {
        format!("order_{id}")
    }

    pub fn orders(
        page: u32,
        limit: u32,
        user_id: Option<&str>,
        start: Option<i64>,
        end: Option<i64>,
    ) -> String {
        format!(
            "{ORDERS_PREFIX}{page}_{limit}_{}_{}_{}",
            user_id.unwrap_or(""),
            start.map(|v| v.to_string()).unwrap_or_default(),
            end.map(|v| v.to_string()).unwrap_or_default()
        )
    }

    pub fn category(id: i64) -> String {
        format!("category_{id}")
    }

    pub fn categories(page: u32, limit: u32) -> String {
        format!("{CATEGORIES_PREFIX}{page}_{limit}")
    }

    pub fn drink(id: i64) -> String {
        format!("drink_{id}")
    }

    pub fn drinks(kind: &str, page: u32, limit: u32, name: Option<&str>, category: Option<&str>) -> String {
        format!(
            "{DRINKS_PREFIX}{kind}_{page}_{limit}_{}_{}",
            name.unwrap_or(""),
            category.unwrap_or("")
        )
    }

    pub fn ingredient(id: i64) -> String {
        format!("ingredient_{id}")
    }

    pub fn ingredients(page: u32, limit: u32, name: Option<&str>) -> String {
        format!("{INGREDIENTS_PREFIX}{page}_{limit}_{}", name.unwrap_or(""))
    }
}

/// Typed facade over a [`Cache`]
#[derive(Debug, Clone)]
pub struct CacheService {
    inner: Arc<dyn Cache>,
    ttl: Duration,
}

impl CacheService {
    pub fn new(inner: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { inner, ttl }
    }

    /// In-process cache with the given TTL
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryCache::new()), ttl)
    }

    pub fn backend(&self) -> &Arc<dyn Cache> {
        &self.inner
    }

    /// Cached value, or `None` on a miss or an undecodable entry
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.inner.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping undecodable cache entry");
                self.inner.remove(key).await;
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.inner.set(key, raw, self.ttl).await,
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to encode cache entry"),
        }
    }

    pub async fn remove(&self, key: &str) {
        self.inner.remove(key).await;
    }

    pub async fn remove_by_prefix(&self, prefix: &str) {
        let removed = self.inner.remove_by_prefix(prefix).await;
        tracing::debug!(prefix = %prefix, removed, "Cache prefix invalidated");
    }

    pub async fn clear_all(&self) {
        self.inner.clear_all().await;
        tracing::debug!("Cache cleared");
    }

    /// Periodic sweep run by the cache sweeper task
    pub fn purge_expired(&self) -> usize {
        let purged = self.inner.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, "Expired cache entries purged");
        }
        purged
    }

    /// Drop an order entry and every order listing
    pub async fn invalidate_order(&self, order_id: i64) {
        self.remove(&keys::order(order_id)).await;
        self.remove_by_prefix(keys::ORDERS_PREFIX).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_list_key_layout() {
        assert_eq!(keys::orders(1, 20, None, None, None), "orders_1_20___");
        assert_eq!(
            keys::orders(2, 10, Some("u1"), Some(5), Some(9)),
            "orders_2_10_u1_5_9"
        );
        assert!(!keys::order(3).starts_with(keys::ORDERS_PREFIX));
        assert!(!keys::drinks("all", 1, 20, None, None).starts_with(keys::DRINK_PREFIX));
    }

    #[tokio::test]
    async fn test_json_round_trip_and_order_invalidation() {
        let cache = CacheService::in_memory(DEFAULT_TTL);
        cache.set_json(&keys::order(1), &vec![1, 2, 3]).await;
        cache.set_json(&keys::orders(1, 20, None, None, None), &"page").await;
        cache.set_json(&keys::drink(1), &"espresso").await;

        assert_eq!(cache.get_json::<Vec<i32>>(&keys::order(1)).await, Some(vec![1, 2, 3]));

        cache.invalidate_order(1).await;
        assert!(cache.get_json::<Vec<i32>>(&keys::order(1)).await.is_none());
        assert!(
            cache
                .get_json::<String>(&keys::orders(1, 20, None, None, None))
                .await
                .is_none()
        );
        assert_eq!(
            cache.get_json::<String>(&keys::drink(1)).await.as_deref(),
            Some("espresso")
        );
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = CacheService::in_memory(DEFAULT_TTL);
        cache.backend().set("k", "not json".into(), DEFAULT_TTL).await;
        assert!(cache.get_json::<Vec<i32>>("k").await.is_none());
        assert!(cache.backend().get("k").await.is_none());
    }
}
