//! Tests for the in-memory cache store.
//!
//! Organized by functionality area: TTL behaviour, populate coalescing, failure handling
//! and background cleanup.

use crate::{
    cache::{
        store::{CacheEntry, CacheStore, MemoryCacheStore},
        CacheError, CacheStoreConfig, CleanupRequest, InflightFetch,
    },
    chain::ChainError,
};
use dashmap::DashMap;
use futures::FutureExt;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{
    sync::{broadcast, mpsc},
    time::{Duration, Instant},
};

// ============================================================================
// Shared Test Helpers
// ============================================================================

pub(crate) fn create_test_store() -> MemoryCacheStore {
    MemoryCacheStore::new(CacheStoreConfig::default())
}

/// Runs `get_or_set` with a factory that bumps `calls` and returns `value`.
pub(crate) async fn populate_counting(
    store: &MemoryCacheStore,
    key: &str,
    ttl: Duration,
    calls: &AtomicUsize,
    value: Value,
) -> Result<Value, CacheError> {
    store
        .get_or_set(
            key,
            ttl,
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
            .boxed(),
        )
        .await
}

// ============================================================================
// Test Submodules
// ============================================================================
