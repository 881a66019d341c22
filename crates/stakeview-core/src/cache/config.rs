//! Configuration and error types for the cache store.

use crate::chain::ChainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by [`CacheStore::get_or_set`](super::CacheStore::get_or_set).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The factory failed while populating the entry. Nothing was stored.
    #[error("populate failed: {0}")]
    Fetch(#[from] ChainError),

    /// A value could not be converted to or from its cached JSON form.
    #[error("cached value could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The factory found nothing worth caching. Not a fault; nothing was stored.
    #[error("no value to cache")]
    Absent,

    /// The per-key populate lock was closed while waiting on it.
    #[error("populate lock closed for key {0}")]
    LockClosed(String),
}

impl CacheError {
    /// Returns `true` for the non-fault [`CacheError::Absent`] marker.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Configuration for the in-memory cache store and its background maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStoreConfig {
    /// Interval between expired-entry sweeps in seconds (default: 60)
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
    /// Age after which a populate lock is considered abandoned (default: 120)
    #[serde(default = "default_stale_inflight_seconds")]
    pub stale_inflight_seconds: u64,
    /// Soft cap on live entries; exceeding it after a sweep is logged (default: 100 000)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

fn default_stale_inflight_seconds() -> u64 {
    120
}

fn default_max_entries() -> usize {
    100_000
}

impl Default for CacheStoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_interval_seconds(),
            stale_inflight_seconds: default_stale_inflight_seconds(),
            max_entries: default_max_entries(),
        }
    }
}
