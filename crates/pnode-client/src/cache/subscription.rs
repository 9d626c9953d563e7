use tokio::sync::watch;

use super::{QueryCache, QueryKey, QueryState};

/// A live interest in one query.
///
/// While at least one subscription for a key exists the cache refreshes it
/// every `refetch_interval`. Dropping the last one stops the poller.
pub struct Subscription<T: Clone + Send + Sync + 'static> {
    cache: QueryCache<T>,
    key: QueryKey,
    rx: watch::Receiver<QueryState<T>>,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    pub(super) fn new(
        cache: QueryCache<T>,
        key: QueryKey,
        rx: watch::Receiver<QueryState<T>>,
    ) -> Self {
        Self { cache, key, rx }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest published state.
    pub fn state(&self) -> QueryState<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change. Returns `None` once the cache is gone.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cache.unsubscribe(&self.key);
    }
}
