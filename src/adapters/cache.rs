//! Expiring caches shared by the spreadsheet adapters.
//!
//! Both caches read time through `tokio::time::Instant`, so tests can drive
//! expiry with a paused clock.

use std::{collections::HashMap, future::Future, hash::Hash, time::Duration};

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// A single lazily built value that is rebuilt once it is older than `ttl`.
///
/// Initialization holds the lock, so concurrent first users wait for one build
/// instead of racing to build several.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // -- MUTEX LOCK --
        let mut guard = self.slot.lock().await;
        if let Some((built_at, value)) = guard.as_ref() {
            if built_at.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }

        let value = init().await?;
        *guard = Some((Instant::now(), value.clone()));
        Ok(value)
        // -- END MUTEX LOCK --
    }

    /// The cached value if still fresh.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }
}

/// Keyed values with a per-entry expiry.
#[derive(Debug)]
pub struct TtlMap<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let guard = self.entries.read().await;
        guard
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries
            .write()
            .await
            .insert(key, (Instant::now(), value));
    }

    pub async fn remove<Q>(&self, key: &Q)
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ttl_cache_rebuilds_after_expiry() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        let counter = AtomicUsize::new(0);
        let builds = &counter;
        let build = move || async move { Ok::<_, ()>(builds.fetch_add(1, Ordering::SeqCst) + 1) };

        assert_eq!(cache.get_or_try_init(build).await, Ok(1));
        assert_eq!(cache.get_or_try_init(build).await, Ok(1));

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert_eq!(cache.get_or_try_init(build).await, Ok(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_or_try_init(build).await, Ok(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ttl_cache_failed_build_is_not_cached() {
        let cache = TtlCache::<u32>::new(Duration::from_secs(60));
        assert_eq!(cache.get_or_try_init(|| async { Err("down") }).await, Err("down"));
        assert_eq!(cache.get_or_try_init(|| async { Ok::<_, &str>(7) }).await, Ok(7));
        assert_eq!(cache.get_or_try_init(|| async { Ok::<_, &str>(8) }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_ttl_cache_invalidate() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.get_or_try_init(|| async { Ok::<_, ()>(1) }).await.unwrap();
        cache.invalidate().await;
        assert_eq!(cache.get_or_try_init(|| async { Ok::<_, ()>(2) }).await, Ok(2));
    }

    #[tokio::test]
    async fn test_ttl_cache_concurrent_first_use_builds_once() {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let builds = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            let builds = Arc::clone(&builds);
            tokio::spawn(async move {
                cache
                    .get_or_try_init(|| async move {
                        builds.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, ()>(42)
                    })
                    .await
            })
        });

        for result in futures::future::join_all(tasks).await {
            assert_eq!(result.unwrap(), Ok(42));
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_map_entries_expire() {
        let map = TtlMap::new(Duration::from_secs(300));
        map.insert("Hoja 1".to_string(), 1).await;
        assert_eq!(map.get("Hoja 1").await, Some(1));

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(map.get("Hoja 1").await, None);
    }

    #[tokio::test]
    async fn test_ttl_map_remove_and_clear() {
        let map = TtlMap::new(Duration::from_secs(300));
        map.insert("a".to_string(), 1).await;
        map.insert("b".to_string(), 2).await;
        map.remove("a").await;
        assert_eq!(map.get("a").await, None);
        assert_eq!(map.get("b").await, Some(2));
        map.clear().await;
        assert_eq!(map.get("b").await, None);
    }
}
