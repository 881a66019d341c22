use crate::cache::{
    background,
    config::{CacheError, CacheStoreConfig},
    fetch_guard::{CleanupRequest, FetchGuard, InflightFetch},
};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::{
    sync::{broadcast, mpsc},
    time::{Duration, Instant},
};
use tracing::{debug, trace};

/// Deferred computation of a value to cache. Only polled on a miss.
pub type CacheFactory<'a> = BoxFuture<'a, Result<Value, CacheError>>;

/// Shared key-value cache with get-or-set population.
///
/// Implementations must guarantee that concurrent calls for the same key run at most one
/// factory at a time, and must never store a value when the factory fails.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_or_set<'a>(
        &'a self,
        key: &'a str,
        ttl: Duration,
        factory: CacheFactory<'a>,
    ) -> Result<Value, CacheError>;
}

/// One cached value with its absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub ttl: Duration,
    pub expires_at: Instant,
}

impl CacheEntry {
    #[must_use]
    pub fn new(value: Value, ttl: Duration, now: Instant) -> Self {
        Self { value, ttl, expires_at: now + ttl }
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    populates: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time view of store activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub inflight: usize,
    pub hits: u64,
    pub misses: u64,
    /// Misses answered by a value another task populated while this one waited
    pub coalesced: u64,
    pub populates: u64,
    pub failures: u64,
}

/// In-process [`CacheStore`] backed by `DashMap`, with per-key single-flight population.
///
/// Entries expire lazily on read and are swept in the background. Failed populates leave
/// the key unset, so the next call retries.
///
/// # Cloning
///
/// Clones share the same maps and counters.
#[derive(Clone)]
pub struct MemoryCacheStore {
    entries: Arc<DashMap<String, CacheEntry>>,
    inflight: Arc<DashMap<String, InflightFetch>>,
    counters: Arc<CacheCounters>,
    config: CacheStoreConfig,
    cleanup_tx: mpsc::UnboundedSender<CleanupRequest>,
    /// Taken once by `start_background_tasks`.
    cleanup_rx: Arc<std::sync::Mutex<Option<mpsc::UnboundedReceiver<CleanupRequest>>>>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new(config: CacheStoreConfig) -> Self {
        let (cleanup_tx, cleanup_rx) = mpsc::unbounded_channel();
        Self {
            entries: Arc::new(DashMap::new()),
            inflight: Arc::new(DashMap::new()),
            counters: Arc::new(CacheCounters::default()),
            config,
            cleanup_tx,
            cleanup_rx: Arc::new(std::sync::Mutex::new(Some(cleanup_rx))),
        }
    }

    /// Starts the guard cleanup worker, the stale inflight reclaim and the expired sweep.
    ///
    /// Calling it more than once only starts the worker the first time.
    pub fn start_background_tasks(&self, shutdown_tx: &broadcast::Sender<()>) {
        let cleanup_rx = match self.cleanup_rx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(cleanup_rx) = cleanup_rx {
            tokio::spawn(background::run_cleanup_worker(
                cleanup_rx,
                Arc::clone(&self.inflight),
                shutdown_tx.subscribe(),
            ));
        } else {
            debug!("cache cleanup worker already started");
        }

        tokio::spawn(background::run_inflight_cleanup(
            Arc::clone(&self.inflight),
            Duration::from_secs(self.config.stale_inflight_seconds),
            shutdown_tx.subscribe(),
        ));

        tokio::spawn(background::run_expired_sweep(
            Arc::clone(&self.entries),
            Duration::from_secs(self.config.sweep_interval_seconds),
            self.config.max_entries,
            shutdown_tx.subscribe(),
        ));

        debug!("cache store background tasks started");
    }

    /// Returns the live value for `key`, dropping it if it has expired.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        // Shard read guard is released above; removing under it would deadlock
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    fn insert(&self, key: &str, value: Value, ttl: Duration) {
        self.entries.insert(key.to_string(), CacheEntry::new(value, ttl, Instant::now()));
    }

    /// Number of entries, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            inflight: self.inflight.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            populates: self.counters.populates.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Drains pending guard cleanups synchronously. Normally the background worker does this.
    #[doc(hidden)]
    pub fn flush_pending_cleanups(&self) {
        let Ok(mut slot) = self.cleanup_rx.lock() else {
            return;
        };
        if let Some(rx) = slot.as_mut() {
            let mut batch = Vec::new();
            while let Ok(req) = rx.try_recv() {
                batch.push(req);
            }
            background::process_cleanup_batch(&self.inflight, &mut batch);
        }
    }

    /// Runs one stale populate-lock reclaim pass now.
    #[cfg(test)]
    pub(crate) fn reclaim_stale_inflight(&self) {
        background::reclaim_inflight(
            &self.inflight,
            Duration::from_secs(self.config.stale_inflight_seconds),
            Instant::now(),
        );
    }

    /// Removes expired entries now. Returns how many were dropped.
    #[doc(hidden)]
    pub fn sweep_expired(&self) -> usize {
        background::sweep_expired(&self.entries, Instant::now())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get_or_set<'a>(
        &'a self,
        key: &'a str,
        ttl: Duration,
        factory: CacheFactory<'a>,
    ) -> Result<Value, CacheError> {
        if let Some(value) = self.peek(key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            trace!(cache_key = key, "cache hit");
            return Ok(value);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        // Clone the lock and let the shard lock go before awaiting anything
        let inflight =
            self.inflight.entry(key.to_string()).or_insert_with(InflightFetch::new).clone();
        let permit =
            inflight.acquire().await.map_err(|_| CacheError::LockClosed(key.to_string()))?;
        drop(inflight);
        let _guard = FetchGuard::new(self.cleanup_tx.clone(), Arc::from(key), permit);

        // Another task may have populated the key while we waited for the permit
        if let Some(value) = self.peek(key) {
            self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
            trace!(cache_key = key, "populate coalesced");
            return Ok(value);
        }

        match factory.await {
            Ok(value) => {
                self.insert(key, value.clone(), ttl);
                self.counters.populates.fetch_add(1, Ordering::Relaxed);
                debug!(cache_key = key, ttl_secs = ttl.as_secs(), "cache populated");
                Ok(value)
            }
            Err(err) => {
                if !err.is_absent() {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                }
                Err(err)
            }
        }
    }
}
