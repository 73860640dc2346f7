//! In-memory read-through cache with absolute-expiry entries and
//! single-flight deduplication of concurrent misses.

use crate::error::FetchError;
use dashmap::DashMap;
use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

type SharedLoad<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

/// Injected time source so expiry can be tested without sleeping.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Maps validated endpoint keys to transformed values plus an absolute
/// expiry instant. Entries past expiry are treated as absent on read; the
/// periodic sweep only reclaims their memory.
pub struct FreshnessCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    inflight: DashMap<String, SharedLoad<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> FreshnessCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> FreshnessCache<V> {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> FreshnessCache<V> {
        FreshnessCache {
            entries: DashMap::new(),
            inflight: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key` when present and fresh; otherwise
    /// runs `load` (joining an already inflight load for the same key) and
    /// stores the result with a fresh expiry. A failed load stores nothing,
    /// so the next call retries.
    ///
    /// The inner maps are locked only around single reads and writes; the
    /// load itself runs without any cache lock held.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, FetchError>> + Send + 'static,
    {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > self.clock.now() {
                return Ok(entry.value.clone());
            }
        }

        match self.inflight.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                let shared = entry.get().clone();
                drop(entry);
                shared.await
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                tracing::info!("loading fresh data for '{key}'");
                let shared = load().boxed().shared();
                entry.insert(shared.clone());

                let result = shared.await;
                if let Ok(value) = result.as_ref() {
                    self.entries.insert(
                        key.to_string(),
                        CacheEntry {
                            value: value.clone(),
                            expires_at: self.clock.now() + self.ttl,
                        },
                    );
                }
                self.inflight.remove(key);
                result
            }
        }
    }

    /// Time until the entry for `key` expires, for the Cache-Control
    /// max-age hint. `None` when the entry is absent or already stale.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .and_then(|entry| entry.expires_at.checked_duration_since(self.clock.now()))
    }

    /// Drops every entry past its expiry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    struct TestClock {
        now: Mutex<Instant>,
    }

    impl TestClock {
        fn new() -> TestClock {
            TestClock {
                now: Mutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    const TTL: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn first_call_loads_second_call_hits() {
        let cache: FreshnessCache<String> = FreshnessCache::new(TTL);
        let calls = AtomicUsize::new(0);

        let loader = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("value".to_string()) }
        };
        assert_eq!("value", cache.get_or_load("k", loader).await.unwrap());

        let loader = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("other".to_string()) }
        };
        assert_eq!("value", cache.get_or_load("k", loader).await.unwrap());
        assert_eq!(1, calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn expired_entry_is_reloaded() {
        let clock = Arc::new(TestClock::new());
        let cache: FreshnessCache<String> = FreshnessCache::with_clock(TTL, clock.clone());

        cache
            .get_or_load("k", || async { Ok("old".to_string()) })
            .await
            .unwrap();
        clock.advance(TTL + Duration::from_secs(1));

        let value = cache
            .get_or_load("k", || async { Ok("new".to_string()) })
            .await
            .unwrap();
        assert_eq!("new", value);
    }

    #[tokio::test]
    async fn failed_load_does_not_poison_the_cache() {
        let cache: FreshnessCache<String> = FreshnessCache::new(TTL);

        let err = cache
            .get_or_load("k", || async {
                Err::<String, _>(FetchError::Request("connection refused".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
        assert!(cache.is_empty());

        let value = cache
            .get_or_load("k", || async { Ok("recovered".to_string()) })
            .await
            .unwrap();
        assert_eq!("recovered", value);
    }

    #[tokio::test]
    async fn concurrent_misses_collapse_into_one_load() {
        let cache: Arc<FreshnessCache<String>> = Arc::new(FreshnessCache::new(TTL));
        let calls = Arc::new(AtomicUsize::new(0));

        let load = |calls: Arc<AtomicUsize>| {
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok("value".to_string())
                }
            }
        };

        let (first, second) = tokio::join!(
            cache.get_or_load("k", load(calls.clone())),
            cache.get_or_load("k", load(calls.clone())),
        );
        assert_eq!("value", first.unwrap());
        assert_eq!("value", second.unwrap());
        assert_eq!(1, calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let clock = Arc::new(TestClock::new());
        let cache: FreshnessCache<String> = FreshnessCache::with_clock(TTL, clock.clone());

        cache
            .get_or_load("old", || async { Ok("old".to_string()) })
            .await
            .unwrap();
        clock.advance(TTL + Duration::from_secs(1));
        cache
            .get_or_load("fresh", || async { Ok("fresh".to_string()) })
            .await
            .unwrap();

        assert_eq!(1, cache.purge_expired());
        assert_eq!(1, cache.len());
        assert!(cache.remaining_ttl("fresh").is_some());
        assert!(cache.remaining_ttl("old").is_none());
    }

    #[tokio::test]
    async fn purge_on_empty_cache_is_a_noop() {
        let cache: FreshnessCache<String> = FreshnessCache::new(TTL);
        assert_eq!(0, cache.purge_expired());
    }
}
