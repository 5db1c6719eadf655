use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use serde_json::Value;
use tracing::{debug, error};

use crate::fetch::{Fetch, FetchError};
use crate::source::{RegionKey, SourceConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    Fetch { key: String, source: FetchError },
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Fetch { key, source } => write!(f, "failed to load {key}: {source}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Fetch { source, .. } => Some(source),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    data: Rc<Value>,
    last_used_tick: u64,
}

type LoadResult = Result<Rc<Value>, CacheError>;

/// A GET that other loads of the same key wait on instead of repeating.
#[derive(Debug, Default)]
struct InFlight {
    outcome: RefCell<Option<LoadResult>>,
    abandoned: Cell<bool>,
    waiters: RefCell<Vec<Waker>>,
}

/// Resolves with the leader's outcome, or `None` if the leader was dropped
/// before its GET finished.
struct JoinInFlight(Rc<InFlight>);

impl Future for JoinInFlight {
    type Output = Option<LoadResult>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let flight = &self.0;
        if let Some(outcome) = flight.outcome.borrow().as_ref() {
            return Poll::Ready(Some(outcome.clone()));
        }
        if flight.abandoned.get() {
            return Poll::Ready(None);
        }
        flight.waiters.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}

/// Unregisters the in-flight entry and wakes waiters however the leader ends.
struct LeaderGuard<'c> {
    pending: &'c RefCell<BTreeMap<String, Rc<InFlight>>>,
    key: String,
    flight: Rc<InFlight>,
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        self.pending.borrow_mut().remove(&self.key);
        if self.flight.outcome.borrow().is_none() {
            self.flight.abandoned.set(true);
        }
        for waker in self.flight.waiters.borrow_mut().drain(..) {
            waker.wake();
        }
    }
}

/// Lazily populated GeoJSON cache keyed by region.
///
/// The first `load` of a key performs one GET and stores the parsed body;
/// later loads return the stored value without touching the network. Failed
/// loads store nothing, so the next call retries. Loads of a key that is
/// already being fetched share that GET and its outcome.
///
/// Without a capacity the cache never evicts. With one, the least recently
/// used entry goes first (ties broken by key order).
#[derive(Debug)]
pub struct BoundaryCache<F> {
    fetcher: F,
    sources: SourceConfig,
    capacity: Option<usize>,
    tick: Cell<u64>,
    entries: RefCell<BTreeMap<String, CacheEntry>>,
    pending: RefCell<BTreeMap<String, Rc<InFlight>>>,
}

impl<F: Fetch> BoundaryCache<F> {
    pub fn new(fetcher: F, sources: SourceConfig) -> Self {
        Self {
            fetcher,
            sources,
            capacity: None,
            tick: Cell::new(0),
            entries: RefCell::new(BTreeMap::new()),
            pending: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity.max(1));
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn sources(&self) -> &SourceConfig {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, key: &RegionKey) -> bool {
        self.entries.borrow().contains_key(&key.cache_key())
    }

    /// Cached value for `key`, if present. Never fetches.
    pub fn get(&self, key: &RegionKey) -> Option<Rc<Value>> {
        let tick = self.bump();
        let mut entries = self.entries.borrow_mut();
        let entry = entries.get_mut(&key.cache_key())?;
        entry.last_used_tick = tick;
        Some(entry.data.clone())
    }

    pub async fn load(&self, key: &RegionKey) -> Result<Rc<Value>, CacheError> {
        loop {
            if let Some(hit) = self.get(key) {
                debug!(%key, "boundary cache hit");
                return Ok(hit);
            }

            let flight = self.pending.borrow().get(&key.cache_key()).cloned();
            let Some(flight) = flight else {
                return self.fetch_and_store(key).await;
            };
            debug!(%key, "joining in-flight boundary load");
            if let Some(outcome) = JoinInFlight(flight).await {
                return outcome;
            }
        }
    }

    /// Number of keys with a GET currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }

    async fn fetch_and_store(&self, key: &RegionKey) -> LoadResult {
        let cache_key = key.cache_key();
        let flight = Rc::new(InFlight::default());
        self.pending
            .borrow_mut()
            .insert(cache_key.clone(), flight.clone());
        let _guard = LeaderGuard {
            pending: &self.pending,
            key: cache_key.clone(),
            flight: flight.clone(),
        };

        let url = key.url(&self.sources);
        let outcome = match self.fetcher.get_json(&url).await {
            Ok(v) => {
                let data = Rc::new(v);
                self.insert(cache_key, data.clone());
                Ok(data)
            }
            Err(source) => {
                error!(%key, "error loading {key}: {source}");
                Err(CacheError::Fetch { key: cache_key, source })
            }
        };
        *flight.outcome.borrow_mut() = Some(outcome.clone());
        outcome
    }

    fn bump(&self) -> u64 {
        let t = self.tick.get() + 1;
        self.tick.set(t);
        t
    }

    fn insert(&self, key: String, data: Rc<Value>) {
        let tick = self.bump();
        let mut entries = self.entries.borrow_mut();
        entries.insert(
            key.clone(),
            CacheEntry {
                data,
                last_used_tick: tick,
            },
        );

        let Some(capacity) = self.capacity else {
            return;
        };
        while entries.len() > capacity {
            let victim = entries
                .iter()
                .filter(|(k, _)| **k != key)
                .min_by(|(ka, ea), (kb, eb)| {
                    ea.last_used_tick
                        .cmp(&eb.last_used_tick)
                        .then_with(|| ka.cmp(kb))
                })
                .map(|(k, _)| k.clone());
            let Some(victim) = victim else {
                break;
            };
            debug!(key = %victim, "boundary cache eviction");
            entries.remove(&victim);
        }
    }
}
