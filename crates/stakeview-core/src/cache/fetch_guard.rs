//! `FetchGuard` RAII type for coordinating concurrent populates of one cache key.
//!
//! The guard is created by `MemoryCacheStore::get_or_set` once it holds the key's
//! populate permit. Dropping it releases the permit and asks the cleanup worker to
//! forget the key's inflight entry.
//!
//! The Drop implementation sends through an unbounded channel instead of touching the
//! inflight map directly: a drop may run while a `DashMap` shard lock is held elsewhere
//! on the same thread, and the send never blocks or allocates.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::{
    sync::{mpsc, AcquireError, OwnedSemaphorePermit, Semaphore},
    time::{Duration, Instant},
};

/// Cleanup request sent from `FetchGuard::drop` to the cleanup worker.
#[derive(Debug, Clone)]
pub(crate) struct CleanupRequest {
    /// Cache key whose inflight entry may be released
    pub key: Arc<str>,
}

/// Per-key populate lock: a single-permit semaphore plus the instant its current holder
/// took the permit, used to detect abandoned populates.
///
/// The permit passes from one waiter to the next without the entry being recreated,
/// so the age is reset on every acquisition rather than fixed at creation.
#[derive(Clone)]
pub struct InflightFetch {
    pub semaphore: Arc<Semaphore>,
    held_since: Arc<Mutex<Instant>>,
}

impl InflightFetch {
    #[must_use]
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            held_since: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Waits for the populate permit and records when it was granted.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError`] if the semaphore was closed.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        *self.held_since.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        Ok(permit)
    }

    /// Time since the current holder acquired the permit, or since creation if no task
    /// has acquired it yet.
    #[must_use]
    pub fn held_for(&self, now: Instant) -> Duration {
        let held_since = *self.held_since.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(held_since)
    }

    /// Returns `true` when only the inflight map references the semaphore, i.e. no task
    /// holds or waits for the permit.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        Arc::strong_count(&self.semaphore) == 1
    }
}

impl Default for InflightFetch {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard held for the duration of one populate.
///
/// ```text
/// get_or_set(key)
///   │
///   ├─ entry live? ──────────────► return cached value
///   │
///   ├─ clone key's lock (shard lock released immediately)
///   ├─ await permit, stamp holder ─► FetchGuard
///   │
///   ├─ entry live now? ──────────► return value populated by the previous holder
///   │
///   └─ run factory, store on success
///        │
///        └─ drop(FetchGuard): release permit, send CleanupRequest
/// ```
pub struct FetchGuard {
    cleanup_tx: mpsc::UnboundedSender<CleanupRequest>,
    key: Arc<str>,
    permit: Option<OwnedSemaphorePermit>,
}

impl FetchGuard {
    pub(crate) fn new(
        cleanup_tx: mpsc::UnboundedSender<CleanupRequest>,
        key: Arc<str>,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        Self { cleanup_tx, key, permit: Some(permit) }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        // Permit goes first so the worker can observe the semaphore as idle
        drop(self.permit.take());
        // A closed channel means shutdown; the stale sweep reclaims leftovers
        let _ = self.cleanup_tx.send(CleanupRequest { key: Arc::clone(&self.key) });
    }
}
