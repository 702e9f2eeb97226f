//! Active queries that refetch when their resource is invalidated.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::{QueryCache, QueryKey};
use crate::api::ClientError;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync>;

/// A query a view keeps open.
///
/// It holds the last result it loaded and a subscription to its resource's
/// invalidations; after a mutation it refetches through the cache, so the
/// view reflects the server's new state.
pub struct LiveQuery<T> {
    cache: Arc<QueryCache>,
    key: QueryKey,
    fetcher: Fetcher<T>,
    invalidations: watch::Receiver<u64>,
    current: Option<T>,
}

impl<T> LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(cache: Arc<QueryCache>, key: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let invalidations = cache.subscribe(key.resource());
        let fetcher: Fetcher<T> = Arc::new(move || Box::pin(fetch()));
        Self {
            cache,
            key,
            fetcher,
            invalidations,
            current: None,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Last loaded value, without touching the network
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Whether the resource was invalidated since the last load
    pub fn is_stale(&self) -> bool {
        self.invalidations.has_changed().unwrap_or(false)
    }

    /// Load through the cache and remember the result
    pub async fn load(&mut self) -> Result<T, ClientError> {
        self.invalidations.borrow_and_update();
        let fetcher = self.fetcher.clone();
        let value = self.cache.query(self.key.clone(), move || fetcher()).await?;
        self.current = Some(value.clone());
        Ok(value)
    }

    /// Reload only if an invalidation arrived since the last load
    pub async fn refresh(&mut self) -> Result<T, ClientError> {
        match (&self.current, self.is_stale()) {
            (Some(value), false) => Ok(value.clone()),
            _ => self.load().await,
        }
    }

    /// Wait for the next invalidation of this resource, then refetch
    pub async fn changed(&mut self) -> Result<T, ClientError> {
        if self.invalidations.changed().await.is_err() {
            return Err(ClientError::request_failed("Query cache was dropped"));
        }
        debug!(key = %self.key, "Resource invalidated, refetching");
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_refresh_after_invalidation() {
        let cache = Arc::new(QueryCache::new(16, Duration::from_secs(60)));
        let store = Arc::new(Mutex::new(vec!["p1", "p2"]));

        let source = store.clone();
        let mut live = LiveQuery::new(cache.clone(), QueryKey::new("products"), move || {
            let items: Vec<String> = source.lock().iter().map(|s| s.to_string()).collect();
            async move { Ok(items) }
        });

        assert_eq!(live.load().await.unwrap().len(), 2);
        assert!(!live.is_stale());

        store.lock().retain(|p| *p != "p1");
        // still served from cache until something invalidates it
        assert_eq!(live.refresh().await.unwrap().len(), 2);

        cache.invalidate("products");
        assert!(live.is_stale());
        assert_eq!(live.refresh().await.unwrap(), vec!["p2".to_string()]);
        assert!(!live.is_stale());
    }

    #[tokio::test]
    async fn test_other_resources_do_not_wake() {
        let cache = Arc::new(QueryCache::new(16, Duration::from_secs(60)));
        let mut live = LiveQuery::new(cache.clone(), QueryKey::new("orders"), || async { Ok(1) });
        live.load().await.unwrap();

        cache.invalidate("products");
        assert!(!live.is_stale());

        let waiter = tokio::time::timeout(Duration::from_millis(30), live.changed()).await;
        assert!(waiter.is_err());
    }

    #[tokio::test]
    async fn test_changed_refetches() {
        let cache = Arc::new(QueryCache::new(16, Duration::from_secs(60)));
        let counter = Arc::new(Mutex::new(0));
        let source = counter.clone();
        let mut live = LiveQuery::new(cache.clone(), QueryKey::new("users"), move || {
            let n = {
                let mut c = source.lock();
                *c += 1;
                *c
            };
            async move { Ok(n) }
        });
        assert_eq!(live.load().await.unwrap(), 1);

        let invalidator = cache.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            invalidator.invalidate("users");
        });

        assert_eq!(live.changed().await.unwrap(), 2);
        assert_eq!(live.current(), Some(&2));
    }
}
