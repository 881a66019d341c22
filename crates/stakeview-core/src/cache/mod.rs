//! Shared key-value cache with time-to-live entries and single-flight population.
//!
//! - `store`: the [`CacheStore`] trait and the in-memory [`MemoryCacheStore`]
//! - `background`: maintenance tasks (guard cleanup, expired sweep, stale lock reclaim)
//! - `config`: configuration and error types
//! - `fetch_guard`: RAII guard for populate coordination

pub mod background;
pub mod config;
pub mod fetch_guard;
pub mod store;

pub use config::{CacheError, CacheStoreConfig};
pub(crate) use fetch_guard::CleanupRequest;
pub use fetch_guard::{FetchGuard, InflightFetch};
pub use store::{CacheEntry, CacheFactory, CacheStats, CacheStore, MemoryCacheStore};

#[cfg(test)]
mod tests;
