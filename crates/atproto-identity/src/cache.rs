//! Key/value store with per-entry TTL used to memoize resolution results

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use crate::types::DidDocument;

/// A memoized resolution output
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Document(Arc<DidDocument>),
    Did(String),
    PdsEndpoint(String),
}

/// Cache backend consumed by [`IdentityResolver`](crate::IdentityResolver)
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<CachedValue>;

    /// Store `value` for `ttl`. A zero TTL stores nothing and drops any previous entry.
    async fn put(&self, key: &str, value: CachedValue, ttl: Duration);

    async fn has(&self, key: &str) -> bool;

    async fn forget(&self, key: &str);

    /// Remove every entry
    async fn flush(&self);
}

#[derive(Clone)]
struct Entry {
    value: CachedValue,
    ttl: Duration,
}

struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process [`CacheStore`] on a moka async cache
pub struct MokaCacheStore {
    cache: Cache<String, Entry>,
}

impl MokaCacheStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();

        Self { cache }
    }
}

impl Default for MokaCacheStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> Option<CachedValue> {
        self.cache.get(key).await.map(|entry| entry.value)
    }

    async fn put(&self, key: &str, value: CachedValue, ttl: Duration) {
        if ttl.is_zero() {
            self.cache.invalidate(key).await;
            return;
        }
        self.cache.insert(key.to_string(), Entry { value, ttl }).await;
    }

    async fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    async fn forget(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    async fn flush(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MokaCacheStore::default();
        store
            .put("handle:alice.test", CachedValue::Did("did:plc:abc".into()), HOUR)
            .await;

        assert!(store.has("handle:alice.test").await);
        assert_eq!(
            store.get("handle:alice.test").await,
            Some(CachedValue::Did("did:plc:abc".into()))
        );
    }

    #[tokio::test]
    async fn test_miss() {
        let store = MokaCacheStore::default();
        assert!(!store.has("did:did:plc:nothing").await);
        assert!(store.get("did:did:plc:nothing").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_whole_value() {
        let store = MokaCacheStore::default();
        store
            .put("pds:alice.test", CachedValue::PdsEndpoint("https://a.example".into()), HOUR)
            .await;
        store
            .put("pds:alice.test", CachedValue::PdsEndpoint("https://b.example".into()), HOUR)
            .await;

        assert_eq!(
            store.get("pds:alice.test").await,
            Some(CachedValue::PdsEndpoint("https://b.example".into()))
        );
    }

    #[tokio::test]
    async fn test_zero_ttl_drops_entry() {
        let store = MokaCacheStore::default();
        store
            .put("handle:alice.test", CachedValue::Did("did:plc:abc".into()), HOUR)
            .await;
        store
            .put("handle:alice.test", CachedValue::Did("did:plc:xyz".into()), Duration::ZERO)
            .await;

        assert!(store.get("handle:alice.test").await.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let store = MokaCacheStore::default();
        store
            .put("handle:alice.test", CachedValue::Did("did:plc:abc".into()), Duration::from_millis(50))
            .await;
        assert!(store.get("handle:alice.test").await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.get("handle:alice.test").await.is_none());
    }

    #[tokio::test]
    async fn test_forget_and_flush() {
        let store = MokaCacheStore::default();
        store.put("handle:a.test", CachedValue::Did("did:plc:a".into()), HOUR).await;
        store.put("handle:b.test", CachedValue::Did("did:plc:b".into()), HOUR).await;
        store.put("pds:b.test", CachedValue::PdsEndpoint("https://pds".into()), HOUR).await;

        store.forget("handle:a.test").await;
        assert!(!store.has("handle:a.test").await);
        assert!(store.has("handle:b.test").await);

        store.flush().await;
        assert!(store.get("handle:b.test").await.is_none());
        assert!(store.get("pds:b.test").await.is_none());
    }
}
