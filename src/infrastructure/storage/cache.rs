// Short-lived result cache with single-flight request coalescing, on DashMap
use crate::domain::error::RinthError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

type Pending<V> = Shared<BoxFuture<'static, Result<V, Arc<RinthError>>>>;

struct CacheEntry<V> {
    stored_at: Instant,
    value: V,
}

/// Keyed cache in front of a read operation.
///
/// A fresh entry (younger than the TTL) is returned without touching the
/// network. Otherwise at most one fetch per key runs at a time and every
/// concurrent caller awaits that same fetch. Failures are handed to all
/// waiters and never stored.
pub struct SingleFlightCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    in_flight: Arc<DashMap<String, Pending<V>>>,
}

impl<V> SingleFlightCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Cached value for `key` if it is still fresh.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        (entry.stored_at.elapsed() < self.ttl).then(|| entry.value.clone())
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the fresh value for `key`, or join/start the single fetch for it.
    ///
    /// `fetch` is only invoked when this call starts a new request. The
    /// request runs on its own task, so it completes and unregisters itself
    /// even if every caller stops waiting.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<V, RinthError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, RinthError>> + Send + 'static,
    {
        if let Some(value) = self.get(key) {
            debug!(cache = self.name, key, "cache hit");
            return Ok(value);
        }

        // The entry guard holds the shard lock from the lookup to the insert,
        // so two callers cannot both see an empty slot. It is released before
        // any await.
        let pending = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(slot) => {
                debug!(cache = self.name, key, "joining in-flight request");
                slot.get().clone()
            }
            Entry::Vacant(slot) => {
                // a request may have finished between the freshness check and the lock
                if let Some(value) = self.get(key) {
                    return Ok(value);
                }
                debug!(cache = self.name, key, "cache miss, fetching");
                let pending = self.spawn_fetch(key.to_string(), fetch());
                slot.insert(pending.clone());
                pending
            }
        };

        pending.await.map_err(RinthError::from_shared)
    }

    fn spawn_fetch<Fut>(&self, key: String, fetch: Fut) -> Pending<V>
    where
        Fut: Future<Output = Result<V, RinthError>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        let guard = InFlightGuard {
            map: Arc::clone(&self.in_flight),
            key: key.clone(),
        };

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let result = fetch.await;
            if let Ok(value) = &result {
                entries.insert(
                    key,
                    CacheEntry {
                        stored_at: Instant::now(),
                        value: value.clone(),
                    },
                );
            }
            result
        });

        async move {
            match handle.await {
                Ok(result) => result.map_err(Arc::new),
                Err(join_err) => Err(Arc::new(RinthError::Task(join_err.to_string()))),
            }
        }
        .boxed()
        .shared()
    }
}

/// Clears the in-flight marker when the fetch task ends, panics included.
struct InFlightGuard<V> {
    map: Arc<DashMap<String, Pending<V>>>,
    key: String,
}

impl<V> Drop for InFlightGuard<V> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}
