//! Background maintenance for [`MemoryCacheStore`](super::MemoryCacheStore).
//!
//! - `FetchGuard` cleanup worker (processes drop requests via channel)
//! - Stale inflight cleanup (reclaims populate locks that outlived their populate)
//! - Expired-entry sweep (the store also expires lazily on read)
//!
//! Every task runs until the broadcast shutdown signal fires.

use crate::cache::{
    fetch_guard::{CleanupRequest, InflightFetch},
    store::CacheEntry,
};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc},
    time::{Duration, Instant},
};
use tracing::{debug, info, trace, warn};

const CLEANUP_BATCH: usize = 64;

/// Processes `FetchGuard` drop requests in batches until shutdown or channel close.
pub(crate) async fn run_cleanup_worker(
    mut cleanup_rx: mpsc::UnboundedReceiver<CleanupRequest>,
    inflight: Arc<DashMap<String, InflightFetch>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut batch = Vec::with_capacity(CLEANUP_BATCH);

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                debug!("cleanup worker received shutdown signal");
                break;
            }

            maybe_req = cleanup_rx.recv() => {
                let Some(req) = maybe_req else {
                    debug!("cleanup channel closed, worker exiting");
                    break;
                };
                batch.push(req);
                while batch.len() < CLEANUP_BATCH {
                    match cleanup_rx.try_recv() {
                        Ok(req) => batch.push(req),
                        Err(_) => break,
                    }
                }
                process_cleanup_batch(&inflight, &mut batch);
            }
        }
    }

    while let Ok(req) = cleanup_rx.try_recv() {
        batch.push(req);
    }
    if !batch.is_empty() {
        debug!(count = batch.len(), "processing remaining cleanup requests on shutdown");
        process_cleanup_batch(&inflight, &mut batch);
    }

    info!("fetch guard cleanup worker shutdown complete");
}

/// Forgets inflight entries that nobody holds or waits on any more.
///
/// An entry still referenced by a waiter is kept; that waiter's own guard sends another
/// request when it finishes.
pub(crate) fn process_cleanup_batch(
    inflight: &DashMap<String, InflightFetch>,
    batch: &mut Vec<CleanupRequest>,
) {
    for req in batch.drain(..) {
        let removed = inflight.remove_if(&*req.key, |_, fetch| fetch.is_idle()).is_some();
        trace!(key = %req.key, removed, "cleanup processed");
    }
}

/// Periodically reclaims populate locks that are idle or older than `stale_after`.
pub(crate) async fn run_inflight_cleanup(
    inflight: Arc<DashMap<String, InflightFetch>>,
    stale_after: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(stale_after.max(Duration::from_secs(1)) / 2);

    loop {
        tokio::select! {
            _ = interval.tick() => reclaim_inflight(&inflight, stale_after, Instant::now()),
            _ = shutdown_rx.recv() => {
                debug!("inflight cleanup task shutting down");
                break;
            }
        }
    }
}

pub(crate) fn reclaim_inflight(
    inflight: &DashMap<String, InflightFetch>,
    stale_after: Duration,
    now: Instant,
) {
    inflight.retain(|key, fetch| {
        if fetch.is_idle() {
            return false;
        }
        let age = fetch.held_for(now);
        if age > stale_after {
            warn!(cache_key = %key, age_secs = age.as_secs(), "removing stale inflight populate");
            return false;
        }
        true
    });
}

/// Periodically drops expired entries and reports when the store is over its soft cap.
pub(crate) async fn run_expired_sweep(
    entries: Arc<DashMap<String, CacheEntry>>,
    interval: Duration,
    max_entries: usize,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    if interval.is_zero() {
        info!("expired entry sweep disabled");
        return;
    }

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = sweep_expired(&entries, Instant::now());
                let remaining = entries.len();
                debug!(removed, remaining, "expired entry sweep finished");
                if remaining > max_entries {
                    warn!(remaining, max_entries, "cache store above configured entry cap");
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("expired entry sweep shutting down");
                break;
            }
        }
    }
}

pub(crate) fn sweep_expired(entries: &DashMap<String, CacheEntry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before.saturating_sub(entries.len())
}
