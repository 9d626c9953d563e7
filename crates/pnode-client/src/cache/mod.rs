//! Keyed query cache with request coalescing and background refresh.
//!
//! Each [`QueryKey`] owns one entry holding the last good payload, the last
//! error, and at most one in-flight fetch. Callers asking for a key that is
//! already being fetched await the same shared future, so concurrent readers
//! never issue duplicate requests.
//!
//! Fresh data (younger than `stale_time`) is returned without touching the
//! transport. Stale data is returned immediately while a single background
//! refresh runs. Keys with live [`Subscription`]s are additionally refreshed
//! every `refetch_interval` until the last subscription is dropped.
//!
//! Fetch results are applied in sequence order: a completion that started
//! before the currently applied one, or before an [`QueryCache::invalidate`],
//! is discarded.
//!
//! Entries are never evicted; the key space grows with every distinct query
//! for the lifetime of the cache.

mod clock;
mod key;
mod subscription;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::QueryKey;
pub use subscription::Subscription;

use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pnode_shared::constants::{
    DEFAULT_REFETCH_SECS, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_STALE_SECS,
    DEFAULT_TIMEOUT_SECS, MAX_RETRY_DELAY_MS,
};
use pnode_shared::{QueryError, TransportError};

pub type FetchFuture<T> = BoxFuture<'static, Result<T, QueryError>>;

/// Produces a new fetch of a query's payload each time it is called.
pub type Fetcher<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

type SharedFetch<T> = Shared<FetchFuture<T>>;

/// Wrap an async closure as a [`Fetcher`].
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

// ---------------------------------------------------------------------------
// Policy and observable state
// ---------------------------------------------------------------------------

/// Freshness, polling and retry settings of one query family.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPolicy {
    pub stale_time: Duration,
    /// `None` disables polling even while subscribed.
    pub refetch_interval: Option<Duration>,
    /// Extra attempts after a transport failure.
    pub retries: u32,
    /// Delay before the first retry, doubled per attempt.
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl QueryPolicy {
    fn delay_before_retry(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_delay
            .saturating_mul(factor)
            .min(Duration::from_millis(MAX_RETRY_DELAY_MS))
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
            refetch_interval: Some(Duration::from_secs(DEFAULT_REFETCH_SECS)),
            retries: DEFAULT_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Snapshot of a query as seen by consumers.
///
/// `data` survives failed refreshes; `error` describes the most recent
/// failure and is cleared by the next success.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<QueryError>,
    pub updated_at: Option<Instant>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            is_fetching: false,
            is_stale: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

struct InFlight<T> {
    seq: u64,
    future: SharedFetch<T>,
}

struct Poller {
    token: CancellationToken,
    period: Duration,
}

struct Entry<T> {
    data: Option<T>,
    error: Option<QueryError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    policy: QueryPolicy,
    fetcher: Fetcher<T>,
    in_flight: Option<InFlight<T>>,
    /// Sequence number handed to the most recently started fetch.
    next_seq: u64,
    /// Sequence number of the fetch whose payload is in `data`.
    applied_seq: u64,
    /// Fetches numbered at or below this were detached by `invalidate`.
    superseded_through: u64,
    subscribers: usize,
    poller: Option<Poller>,
    tx: watch::Sender<QueryState<T>>,
}

impl<T: Clone> Entry<T> {
    fn new(policy: QueryPolicy, fetcher: Fetcher<T>) -> Self {
        let (tx, _rx) = watch::channel(QueryState::default());
        Self {
            data: None,
            error: None,
            updated_at: None,
            invalidated: false,
            policy,
            fetcher,
            in_flight: None,
            next_seq: 0,
            applied_seq: 0,
            superseded_through: 0,
            subscribers: 0,
            poller: None,
            tx,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        if self.invalidated {
            return true;
        }
        match self.updated_at {
            Some(at) => now.saturating_duration_since(at) >= self.policy.stale_time,
            None => true,
        }
    }

    fn snapshot(&self, now: Instant) -> QueryState<T> {
        QueryState {
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
            is_fetching: self.in_flight.is_some(),
            is_stale: self.is_stale(now),
        }
    }

    fn publish(&self, now: Instant) {
        self.tx.send_replace(self.snapshot(now));
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

struct Inner<T> {
    entries: Mutex<HashMap<QueryKey, Entry<T>>>,
    clock: Arc<dyn Clock>,
}

/// Shared, cheaply cloneable query cache for payloads of type `T`.
///
/// Spawns onto the ambient Tokio runtime; every method that may start a
/// fetch must be called from within one.
pub struct QueryCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl<T: Clone + Send + Sync + 'static> QueryCache<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                clock,
            }),
        }
    }

    /// Return the payload for `key`, fetching only when needed.
    ///
    /// - fresh data is returned as-is;
    /// - stale data is returned immediately and one background refresh starts;
    /// - without data the call waits for the (possibly shared) fetch.
    ///
    /// `policy` and `fetcher` replace the ones stored for the key.
    pub async fn fetch(
        &self,
        key: QueryKey,
        policy: QueryPolicy,
        fetcher: Fetcher<T>,
    ) -> Result<T, QueryError> {
        let pending = {
            let now = self.now();
            let mut entries = self.entries();
            let entry = register(&mut entries, &key, policy, fetcher);
            let stale = entry.is_stale(now);

            if let Some(data) = entry.data.clone() {
                if stale {
                    debug!(key = %key, "Serving stale data, refreshing in background");
                    let _ = self.start_fetch(&key, entry, now);
                } else {
                    debug!(key = %key, "Served from cache");
                }
                return Ok(data);
            }

            self.start_fetch(&key, entry, now)
        };

        pending.await
    }

    /// Force a fetch of a known key, joining one already in flight.
    ///
    /// On failure the previous payload stays available through [`Self::state`].
    pub async fn refetch(&self, key: &QueryKey) -> Result<T, QueryError> {
        let pending = {
            let now = self.now();
            let mut entries = self.entries();
            let Some(entry) = entries.get_mut(key) else {
                return Err(QueryError::Invalid(format!("unknown query: {key}")));
            };
            self.start_fetch(key, entry, now)
        };

        pending.await
    }

    /// Mark `key` stale and detach its in-flight fetch.
    ///
    /// The next read starts a new fetch; the detached one still runs to
    /// completion but its result is dropped.
    pub fn invalidate(&self, key: &QueryKey) {
        let now = self.now();
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(key) {
            entry.invalidated = true;
            entry.superseded_through = entry.next_seq;
            if entry.in_flight.take().is_some() {
                debug!(key = %key, "Detached in-flight fetch");
            }
            entry.publish(now);
        }
    }

    pub fn state(&self, key: &QueryKey) -> Option<QueryState<T>> {
        let now = self.now();
        self.entries().get(key).map(|entry| entry.snapshot(now))
    }

    /// Register interest in `key`.
    ///
    /// Starts a fetch when the key has no fresh data and, for the first
    /// subscriber, a poller refreshing it every `refetch_interval`. A later
    /// subscriber with a different interval restarts the poller on its period.
    pub fn subscribe(
        &self,
        key: QueryKey,
        policy: QueryPolicy,
        fetcher: Fetcher<T>,
    ) -> Subscription<T> {
        let now = self.now();
        let mut entries = self.entries();
        let entry = register(&mut entries, &key, policy, fetcher);

        entry.subscribers += 1;
        let period = entry.policy.refetch_interval;
        if entry.poller.as_ref().map(|p| p.period) != period {
            if let Some(old) = entry.poller.take() {
                old.token.cancel();
                debug!(key = %key, "Refresh interval changed");
            }
            entry.poller = period.map(|period| Poller {
                token: self.spawn_poller(key.clone(), period),
                period,
            });
        }

        if entry.is_stale(now) {
            let _ = self.start_fetch(&key, entry, now);
        }

        let rx = entry.tx.subscribe();
        drop(entries);

        Subscription::new(self.clone(), key, rx)
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.entries().get(key).map_or(0, |entry| entry.subscribers)
    }

    pub fn is_polling(&self, key: &QueryKey) -> bool {
        self.entries()
            .get(key)
            .is_some_and(|entry| entry.poller.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- internals ----------------------------------------------------------

    fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<T>>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Join the in-flight fetch for `entry` or start a new one.
    ///
    /// The fetch is driven by its own task, so it completes and updates the
    /// cache even if every awaiting caller goes away.
    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry<T>, now: Instant) -> SharedFetch<T> {
        if let Some(in_flight) = &entry.in_flight {
            return in_flight.future.clone();
        }

        entry.next_seq += 1;
        let seq = entry.next_seq;
        let fetcher = Arc::clone(&entry.fetcher);
        let policy = entry.policy.clone();
        let cache = self.clone();
        let task_key = key.clone();

        let future = async move {
            let result = run_with_retry(&task_key, &fetcher, &policy).await;
            cache.complete(&task_key, seq, &result);
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            seq,
            future: future.clone(),
        });
        entry.publish(now);

        debug!(key = %key, seq, "Fetch started");
        tokio::spawn(future.clone());

        future
    }

    fn complete(&self, key: &QueryKey, seq: u64, result: &Result<T, QueryError>) {
        let now = self.now();
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        if entry.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            entry.in_flight = None;
        }

        if seq <= entry.applied_seq || seq <= entry.superseded_through {
            debug!(
                key = %key,
                seq,
                applied = entry.applied_seq,
                "Discarding superseded fetch result"
            );
            entry.publish(now);
            return;
        }

        match result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.error = None;
                entry.updated_at = Some(now);
                entry.invalidated = false;
                entry.applied_seq = seq;
            }
            Err(e) => {
                warn!(
                    key = %key,
                    error = %e,
                    has_data = entry.data.is_some(),
                    "Query failed"
                );
                entry.error = Some(e.clone());
            }
        }

        entry.publish(now);
    }

    fn refresh_in_background(&self, key: &QueryKey) {
        let now = self.now();
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(key) {
            if entry.subscribers > 0 {
                let _ = self.start_fetch(key, entry, now);
            }
        }
    }

    fn spawn_poller(&self, key: QueryKey, period: Duration) -> CancellationToken {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let cache = self.clone();

        info!(key = %key, period_secs = period.as_secs(), "Started background refresh");

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => cache.refresh_in_background(&key),
                }
            }

            debug!(key = %key, "Background refresh task exited");
        });

        token
    }

    pub(crate) fn unsubscribe(&self, key: &QueryKey) {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                if let Some(poller) = entry.poller.take() {
                    poller.token.cancel();
                    info!(key = %key, "Stopped background refresh");
                }
            }
        }
    }
}

fn register<'a, T: Clone>(
    entries: &'a mut HashMap<QueryKey, Entry<T>>,
    key: &QueryKey,
    policy: QueryPolicy,
    fetcher: Fetcher<T>,
) -> &'a mut Entry<T> {
    match entries.entry(key.clone()) {
        MapEntry::Occupied(occupied) => {
            let entry = occupied.into_mut();
            entry.policy = policy;
            entry.fetcher = fetcher;
            entry
        }
        MapEntry::Vacant(vacant) => vacant.insert(Entry::new(policy, fetcher)),
    }
}

/// Run one logical fetch: every attempt is bounded by the policy timeout and
/// transport failures are retried up to `policy.retries` times.
async fn run_with_retry<T>(
    key: &QueryKey,
    fetcher: &Fetcher<T>,
    policy: &QueryPolicy,
) -> Result<T, QueryError> {
    let mut attempt = 0u32;
    loop {
        let result = match tokio::time::timeout(policy.timeout, fetcher()).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(policy.timeout).into()),
        };

        match result {
            Ok(data) => return Ok(data),
            Err(e) if e.is_retryable() && attempt < policy.retries => {
                let delay = policy.delay_before_retry(attempt);
                attempt += 1;
                warn!(
                    key = %key,
                    attempt,
                    max = policy.retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
