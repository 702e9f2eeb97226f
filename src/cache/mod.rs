//! Server-state query cache.
//!
//! Results are keyed by an ordered tuple of resource name and parameters.
//! Concurrent requests for the same key share one in-flight fetch, the last
//! successful result is kept, and a mutation invalidates every key of the
//! resources it touched so dependent views refetch. Failures are never cached.
//!
//! The cache is bounded: entries older than the TTL count as misses, and once
//! the capacity is exceeded the least recently read entry is evicted.
//!
//! Each resource carries a generation counter that invalidation bumps. A fetch
//! that started under an older generation still answers its own callers but
//! does not populate the cache, so a slow response can never overwrite the
//! result of a refetch issued after a mutation.

mod live;

pub use live::LiveQuery;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::debug;

use crate::api::ClientError;
use crate::config::CacheConfig;

/// Cache key: resource name followed by its parameters, in a fixed order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: String,
    params: Vec<String>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: Vec::new(),
        }
    }

    /// Append one parameter
    pub fn with(mut self, param: impl ToString) -> Self {
        self.params.push(param.to_string());
        self
    }

    /// Append several parameters
    pub fn with_all<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.params.extend(params.into_iter().map(|p| p.to_string()));
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.resource)?;
        for param in &self.params {
            write!(f, "/{}", param)?;
        }
        Ok(())
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, ClientError>>>;

struct CacheEntry {
    value: CachedValue,
    fetched_at: Instant,
    last_read: Instant,
}

struct InFlight {
    fetch: SharedFetch,
    generation: u64,
}

/// Counts for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
}

pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    in_flight: DashMap<QueryKey, InFlight>,
    generations: DashMap<String, u64>,
    watchers: DashMap<String, watch::Sender<u64>>,
    capacity: usize,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            generations: DashMap::new(),
            watchers: DashMap::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.ttl())
    }

    fn generation(&self, resource: &str) -> u64 {
        self.generations.get(resource).map(|g| *g).unwrap_or(0)
    }

    /// Fresh cached value for `key`, if any
    pub fn peek<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut entry = self.entries.get_mut(key)?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        entry.last_read = Instant::now();
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Return the cached value for `key` or run `fetch`, sharing one
    /// in-flight request between concurrent callers.
    ///
    /// `fetch` only builds the future; it must not touch this cache.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ClientError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        if let Some(value) = self.peek::<T>(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(value);
        }

        let (shared, generation) = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(e) => {
                debug!(key = %key, "Joining in-flight fetch");
                (e.get().fetch.clone(), e.get().generation)
            }
            Entry::Vacant(v) => {
                debug!(key = %key, "Cache miss, fetching");
                let generation = self.generation(key.resource());
                let shared = fetch()
                    .map(|r| r.map(|value| Arc::new(value) as CachedValue))
                    .boxed()
                    .shared();
                v.insert(InFlight {
                    fetch: shared.clone(),
                    generation,
                });
                (shared, generation)
            }
        };

        let result = shared.clone().await;
        self.settle(&key, &shared, generation, &result);

        let value = result?;
        value.downcast_ref::<T>().cloned().ok_or_else(|| {
            ClientError::request_failed(format!("Cached value for {} has a different type", key))
        })
    }

    /// Retire a finished fetch and store its result if still current.
    ///
    /// Every awaiting caller runs this, so it works even if the caller that
    /// started the fetch was dropped.
    fn settle(
        &self,
        key: &QueryKey,
        fetch: &SharedFetch,
        generation: u64,
        result: &Result<CachedValue, ClientError>,
    ) {
        let removed = self
            .in_flight
            .remove_if(key, |_, f| f.fetch.ptr_eq(fetch))
            .is_some();
        if !removed {
            return;
        }

        let Ok(value) = result else {
            return;
        };

        // Held across the insert so `invalidate` cannot slip in between
        let current = self
            .generations
            .entry(key.resource().to_string())
            .or_insert(0);
        if generation != *current {
            debug!(key = %key, "Discarding result fetched before invalidation");
            return;
        }

        let now = Instant::now();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                value: value.clone(),
                fetched_at: now,
                last_read: now,
            },
        );
        drop(current);
        self.evict_over_capacity();
    }

    fn evict_over_capacity(&self) {
        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().last_read)
                .map(|e| e.key().clone());
            match oldest {
                Some(key) => {
                    debug!(key = %key, "Evicting least recently used entry");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Drop every entry of `resource` and wake its live queries.
    ///
    /// Returns the number of cached entries removed.
    pub fn invalidate(&self, resource: &str) -> usize {
        let generation = {
            let mut g = self.generations.entry(resource.to_string()).or_insert(0);
            *g += 1;
            *g
        };

        let before = self.entries.len();
        self.entries.retain(|k, _| k.resource() != resource);
        let removed = before.saturating_sub(self.entries.len());
        self.in_flight.retain(|k, _| k.resource() != resource);

        if let Some(tx) = self.watchers.get(resource) {
            tx.send_replace(generation);
        }

        debug!(resource, removed, generation, "Invalidated resource");
        removed
    }

    /// Run a mutation and invalidate `resources` if it succeeds
    pub async fn mutate<T, Fut>(&self, resources: &[&str], mutation: Fut) -> Result<T, ClientError>
    where
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let output = mutation.await?;
        for resource in resources {
            self.invalidate(resource);
        }
        Ok(output)
    }

    /// Drop entries past their TTL
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.fetched_at.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    /// Drop everything, including fetches still in flight, and wake every
    /// live query so it refetches under the new session
    pub fn clear(&self) {
        self.entries.clear();
        self.in_flight.clear();

        let watched: Vec<String> = self.watchers.iter().map(|w| w.key().clone()).collect();
        for resource in watched {
            self.invalidate(&resource);
        }
    }

    /// Invalidation notifications for `resource`
    pub fn subscribe(&self, resource: &str) -> watch::Receiver<u64> {
        let generation = self.generation(resource);
        self.watchers
            .entry(resource.to_string())
            .or_insert_with(|| watch::channel(generation).0)
            .subscribe()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            in_flight: self.in_flight.len(),
        }
    }
}
