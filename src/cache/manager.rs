//! In-memory read-through cache for user queries
//!
//! Stores fetched values under string keys with an expiry. Expired entries are
//! treated as absent and removed when a lookup finds them.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::data::UserRecord;
use crate::error::Result;

/// Time-to-live used when a caller passes a zero TTL
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Deadline used when `now + ttl` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Values the cache knows how to hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    /// A single user
    User(UserRecord),
    /// The full user list
    Users(Vec<UserRecord>),
}

/// Conversion between a concrete type and its cached representation
pub trait Cacheable: Sized {
    fn into_cached(self) -> CachedValue;

    /// Returns `None` when the stored variant is a different type
    fn from_cached(value: &CachedValue) -> Option<Self>;
}

impl Cacheable for UserRecord {
    fn into_cached(self) -> CachedValue {
        CachedValue::User(self)
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::User(user) => Some(user.clone()),
            CachedValue::Users(_) => None,
        }
    }
}

impl Cacheable for Vec<UserRecord> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Users(self)
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::Users(users) => Some(users.clone()),
            CachedValue::User(_) => None,
        }
    }
}

/// A stored value with its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached data
    value: CachedValue,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A live cache entry and when it was stored
#[derive(Debug, Clone)]
pub struct CachedData {
    /// The cached data
    pub value: CachedValue,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
}

/// Cache key for a single user
pub fn user_key(id: u32) -> String {
    format!("user:{}", id)
}

/// Cache key for the full user list
pub const ALL_USERS_KEY: &str = "all-users";

/// Read-through cache shared by concurrent callers.
///
/// The lock is never held while a fetch is in flight, so two callers missing
/// the same key may both fetch; the later write wins.
#[derive(Debug, Default)]
pub struct ReadThroughCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ReadThroughCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value for `key`, or fetches and stores it.
    ///
    /// A zero `ttl` is replaced by [`DEFAULT_TTL`]. A failed fetch stores
    /// nothing and leaves any existing state unchanged.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Cacheable + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.lookup::<T>(key).await {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        debug!(key, "Cache miss");
        let value = fetch().await?;
        self.insert(key, value.clone(), ttl).await;
        Ok(value)
    }

    /// Stores `value` under `key` for `ttl`
    pub async fn insert<T: Cacheable>(&self, key: &str, value: T, ttl: Duration) {
        let ttl = effective_ttl(ttl);
        let entry = CacheEntry {
            value: value.into_cached(),
            cached_at: Utc::now(),
            expires_at: expiry_after(ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        info!(key, ttl_secs = ttl.as_secs(), "Cache populated");
    }

    /// Whether a live entry exists for `key`
    pub async fn is_fresh(&self, key: &str) -> bool {
        self.peek(key).await.is_some()
    }

    /// Returns the live entry for `key` without fetching
    pub async fn peek(&self, key: &str) -> Option<CachedData> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| CachedData {
                value: entry.value.clone(),
                cached_at: entry.cached_at,
            })
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Reads a live value of type `T`, evicting the entry if it has expired
    async fn lookup<T: Cacheable>(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return T::from_cached(&entry.value),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Another caller may have refreshed the entry since the read lock was dropped.
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            debug!(key, "Evicted expired entry");
        }
        None
    }
}

/// Replaces a zero TTL with the default
fn expiry_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl).unwrap_or(now + FAR_FUTURE)
}

fn effective_ttl(ttl: Duration) -> Duration {
    if ttl.is_zero() {
        DEFAULT_TTL
    } else {
        ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiFailure;
    use crate::testing::user;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_miss_fetches_and_stores() {
        let cache = ReadThroughCache::new();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let value = cache
            .get_or_fetch(&user_key(1), TTL, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(user(1))
            })
            .await
            .unwrap();

        assert_eq!(value, user(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_fresh("user:1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_ttl_stays_fresh() {
        let cache = ReadThroughCache::new();
        cache.insert(&user_key(1), user(1), Duration::MAX).await;

        tokio::time::advance(Duration::from_secs(86400 * 365)).await;

        assert!(cache.is_fresh("user:1").await);
        let cached = cache.peek("user:1").await.unwrap();
        assert_eq!(cached.value, CachedValue::User(user(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_does_not_call_fetch() {
        let cache = ReadThroughCache::new();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        cache.insert(&user_key(1), user(1), TTL).await;

        let value = cache
            .get_or_fetch(&user_key(1), TTL, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(user(99))
            })
            .await
            .unwrap();

        assert_eq!(value.id, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched() {
        let cache = ReadThroughCache::new();
        cache.insert(ALL_USERS_KEY, vec![user(1)], TTL).await;

        tokio::time::advance(TTL).await;

        assert!(!cache.is_fresh(ALL_USERS_KEY).await);
        let value = cache
            .get_or_fetch(ALL_USERS_KEY, TTL, || async { Ok(vec![user(1), user(2)]) })
            .await
            .unwrap();
        assert_eq!(value.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_is_live_just_before_expiry() {
        let cache = ReadThroughCache::new();
        cache.insert(&user_key(3), user(3), TTL).await;

        tokio::time::advance(TTL - Duration::from_millis(1)).await;

        assert!(cache.is_fresh(&user_key(3)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_falls_back_to_default() {
        let cache = ReadThroughCache::new();
        cache.insert(&user_key(1), user(1), Duration::ZERO).await;

        // Not expired immediately...
        assert!(cache.is_fresh(&user_key(1)).await);

        // ...and not cached forever.
        tokio::time::advance(DEFAULT_TTL).await;
        assert!(!cache.is_fresh(&user_key(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_not_cached() {
        let cache = ReadThroughCache::new();

        let result: Result<UserRecord> = cache
            .get_or_fetch(&user_key(9), TTL, || async { Err(ApiFailure::Timeout) })
            .await;

        assert_eq!(result.unwrap_err(), ApiFailure::Timeout);
        assert!(cache.is_empty().await);

        let value = cache
            .get_or_fetch(&user_key(9), TTL, || async { Ok(user(9)) })
            .await
            .unwrap();
        assert_eq!(value.id, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_keeps_existing_state() {
        let cache = ReadThroughCache::new();
        cache.insert(&user_key(2), user(2), TTL).await;

        let _: Result<UserRecord> = cache
            .get_or_fetch(&user_key(5), TTL, || async { Err(ApiFailure::Timeout) })
            .await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.is_fresh(&user_key(2)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let cache = ReadThroughCache::new();

        cache.insert(&user_key(1), user(1), TTL).await;
        assert!(!cache.is_fresh(ALL_USERS_KEY).await);

        let other = ReadThroughCache::new();
        other.insert(ALL_USERS_KEY, vec![user(1)], TTL).await;
        assert!(!other.is_fresh(&user_key(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_variant_is_a_miss() {
        let cache = ReadThroughCache::new();
        cache.insert("shared", vec![user(1)], TTL).await;

        let value = cache
            .get_or_fetch("shared", TTL, || async { Ok(user(7)) })
            .await
            .unwrap();

        assert_eq!(value.id, 7);
        assert_eq!(
            cache.peek("shared").await.map(|data| data.value),
            Some(CachedValue::User(user(7)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek_reports_cached_at() {
        let cache = ReadThroughCache::new();
        let before = Utc::now();
        cache.insert(&user_key(4), user(4), TTL).await;
        let after = Utc::now();

        let data = cache.peek(&user_key(4)).await.expect("entry should be live");

        assert!(data.cached_at >= before);
        assert!(data.cached_at <= after);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_everything() {
        let cache = ReadThroughCache::new();
        cache.insert(&user_key(1), user(1), TTL).await;
        cache.insert(ALL_USERS_KEY, vec![user(1)], TTL).await;

        cache.clear().await;

        assert!(cache.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_independent_keys() {
        let cache = Arc::new(ReadThroughCache::new());

        let tasks = (1..=20u32).map(|id| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&user_key(id), TTL, || async move { Ok(user(id)) })
                    .await
            })
        });
        let results = futures::future::join_all(tasks).await;

        for (index, result) in results.into_iter().enumerate() {
            let user = result.expect("task panicked").unwrap();
            assert_eq!(user.id as usize, index + 1);
        }
        assert_eq!(cache.len().await, 20);
    }

    #[test]
    fn test_user_key_format() {
        assert_eq!(user_key(42), "user:42");
        assert_eq!(ALL_USERS_KEY, "all-users");
    }
}
