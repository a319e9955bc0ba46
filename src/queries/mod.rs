//! Data-access layer: cached, deduplicated queries over the gateway.
//!
//! Each query is identified by a [`QueryKey`]. At most one fetch per key is in
//! flight; concurrent callers await the same result. Successful results are
//! served from cache until they go stale (by age or by invalidation after a
//! write). Transient failures are retried with backoff before surfacing.
//!
//! Invalidation bumps a per-owner generation. A fetch that started before the
//! bump still answers the callers already waiting on it, but its result is
//! stored as stale, and callers arriving after the bump start a new fetch.

mod retry;

use std::{
    collections::HashMap,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, OnceCell};
use tracing::debug;
use uuid::Uuid;

pub use retry::{with_backoff, RetryPolicy};

use crate::domain::{WorkoutSession, WorkoutType};
use crate::error::AppError;

/// Cached results kept per cache before the oldest are evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub owner_id: Uuid,
    pub scope: String,
}

impl QueryKey {
    pub fn new(owner_id: Uuid, scope: impl Into<String>) -> Self {
        Self {
            owner_id,
            scope: scope.into(),
        }
    }
}

/// What a consumer sees for a key without triggering a fetch.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Ready { data: Arc<T>, stale: bool },
    Failed(AppError),
}

enum Entry<T> {
    Ready {
        data: Arc<T>,
        fetched_at: Instant,
        generation: u64,
    },
    Failed(AppError),
}

struct Entries<T> {
    results: HashMap<QueryKey, Entry<T>>,
    generations: HashMap<Uuid, u64>,
}

impl<T> Entries<T> {
    fn generation(&self, owner_id: Uuid) -> u64 {
        self.generations.get(&owner_id).copied().unwrap_or(0)
    }

    fn is_stale(&self, key: &QueryKey, entry: &Entry<T>, stale_after: Duration) -> bool {
        match entry {
            Entry::Ready {
                fetched_at,
                generation,
                ..
            } => *generation < self.generation(key.owner_id) || fetched_at.elapsed() >= stale_after,
            Entry::Failed(_) => true,
        }
    }

    /// Drops stale entries first, then the oldest ones, until `max` remain.
    fn shrink_to(&mut self, max: usize, stale_after: Duration) {
        if self.results.len() <= max {
            return;
        }
        let stale: Vec<QueryKey> = self
            .results
            .iter()
            .filter(|(key, entry)| self.is_stale(key, entry, stale_after))
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            if self.results.len() <= max {
                return;
            }
            self.results.remove(&key);
        }

        let mut by_age: Vec<(Instant, QueryKey)> = self
            .results
            .iter()
            .filter_map(|(key, entry)| match entry {
                Entry::Ready { fetched_at, .. } => Some((*fetched_at, key.clone())),
                Entry::Failed(_) => None,
            })
            .collect();
        by_age.sort_by_key(|(fetched_at, _)| *fetched_at);
        let excess = self.results.len().saturating_sub(max);
        for (_, key) in by_age.into_iter().take(excess) {
            self.results.remove(&key);
        }
    }
}

type Flight<T> = Arc<OnceCell<Result<Arc<T>, AppError>>>;

pub struct QueryCache<T> {
    entries: Mutex<Entries<T>>,
    in_flight: Mutex<HashMap<QueryKey, Flight<T>>>,
    stale_after: Duration,
    retry: RetryPolicy,
    max_entries: usize,
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(stale_after: Duration, retry: RetryPolicy) -> Self {
        Self::with_capacity(stale_after, retry, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(stale_after: Duration, retry: RetryPolicy, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                results: HashMap::new(),
                generations: HashMap::new(),
            }),
            in_flight: Mutex::new(HashMap::new()),
            stale_after,
            retry,
            max_entries: max_entries.max(1),
        }
    }

    async fn fresh(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.entries.lock().await;
        match entries.results.get(key) {
            Some(entry @ Entry::Ready { data, .. })
                if !entries.is_stale(key, entry, self.stale_after) =>
            {
                Some(data.clone())
            }
            _ => None,
        }
    }

    async fn store(&self, key: &QueryKey, generation: u64, result: &Result<Arc<T>, AppError>) {
        let mut entries = self.entries.lock().await;
        // a newer fetch may already have landed for this key
        if let Some(Entry::Ready { generation: newer, .. }) = entries.results.get(key) {
            if *newer > generation {
                return;
            }
        }
        let entry = match result {
            Ok(data) => Entry::Ready {
                data: data.clone(),
                fetched_at: Instant::now(),
                generation,
            },
            Err(e) => Entry::Failed(e.clone()),
        };
        entries.results.insert(key.clone(), entry);
        entries.shrink_to(self.max_entries, self.stale_after);
    }

    /// Cached value if fresh, otherwise joins or starts the single fetch for `key`.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, AppError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(data) = self.fresh(&key).await {
            debug!(scope = %key.scope, "query cache hit");
            return Ok(data);
        }

        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = flight
            .get_or_init(|| async {
                let generation = self.entries.lock().await.generation(key.owner_id);
                debug!(scope = %key.scope, generation, "query fetch started");
                let result = with_backoff(&self.retry, &fetcher).await.map(Arc::new);
                self.store(&key, generation, &result).await;
                result
            })
            .await
            .clone();

        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &flight))
        {
            in_flight.remove(&key);
        }
        result
    }

    pub async fn state(&self, key: &QueryKey) -> QueryState<T> {
        if self.in_flight.lock().await.contains_key(key) {
            return QueryState::Loading;
        }
        let entries = self.entries.lock().await;
        match entries.results.get(key) {
            None => QueryState::Idle,
            Some(Entry::Failed(e)) => QueryState::Failed(e.clone()),
            Some(entry @ Entry::Ready { data, .. }) => QueryState::Ready {
                data: data.clone(),
                stale: entries.is_stale(key, entry, self.stale_after),
            },
        }
    }

    /// Marks every cached query of `owner_id` stale; the next fetch goes to the store.
    /// Entries that were already stale are dropped, and fetches still in flight are
    /// detached so later callers do not join a read that predates the write.
    pub async fn invalidate_owner(&self, owner_id: Uuid) {
        {
            let mut entries = self.entries.lock().await;
            let stale: Vec<QueryKey> = entries
                .results
                .iter()
                .filter(|(key, entry)| {
                    key.owner_id == owner_id && entries.is_stale(key, entry, self.stale_after)
                })
                .map(|(key, _)| key.clone())
                .collect();
            for key in stale {
                entries.results.remove(&key);
            }
            *entries.generations.entry(owner_id).or_insert(0) += 1;
        }
        self.in_flight
            .lock()
            .await
            .retain(|key, _| key.owner_id != owner_id);
    }

    /// Number of cached results, fresh or stale.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.results.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Caches for the two collections the API reads repeatedly.
pub struct Queries {
    pub workout_types: QueryCache<Vec<WorkoutType>>,
    pub sessions: QueryCache<Vec<WorkoutSession>>,
}

impl Queries {
    pub fn new(stale_after: Duration, retry: RetryPolicy) -> Self {
        Self {
            workout_types: QueryCache::new(stale_after, retry),
            sessions: QueryCache::new(stale_after, retry),
        }
    }

    /// Called after every write by `owner_id`.
    pub async fn invalidate_owner(&self, owner_id: Uuid) {
        self.workout_types.invalidate_owner(owner_id).await;
        self.sessions.invalidate_owner(owner_id).await;
    }
}
