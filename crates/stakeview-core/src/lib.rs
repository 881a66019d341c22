//! # Stakeview Core
//!
//! Caching read gateway over on-chain staking farm contracts, plus account-level
//! aggregation of tokens, farm positions, and locked assets.
//!
//! This crate provides:
//!
//! - **[`chain`]**: Bech32 addresses, the VM value codec, and the HTTP client for the
//!   gateway's `vm-values/query` endpoint.
//!
//! - **[`cache`]**: Keyed cache-aside store with per-entry TTL and single-flight
//!   population, swept by background workers.
//!
//! - **[`staking`]**: Typed contract queries for router and farm contracts, and the
//!   cached getters built on them.
//!
//! - **[`accounts`]**: Account views composed from the staking getters and the
//!   account data API.
//!
//! - **[`config`]**: Layered configuration loading and validation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       AccountsService                       │
//! │  ┌──────────────────────────────┐  ┌─────────────────────┐  │
//! │  │        StakingGetter         │  │ AccountDataProvider │  │
//! │  │  ┌────────────┐ ┌──────────┐ │  │     (ApiClient)     │  │
//! │  │  │ CacheStore │ │StakingAbi│ │  └──────────┬──────────┘  │
//! │  │  └────────────┘ └────┬─────┘ │             │             │
//! │  └──────────────────────┼───────┘             │             │
//! │                ┌────────▼────────┐   ┌────────▼────────┐    │
//! │                │  GatewayClient  │   │  /accounts API  │    │
//! │                │ /vm-values/query│   │  /tokens  /stats│    │
//! │                └─────────────────┘   └─────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read Flow
//!
//! ```text
//! Getter call
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Cache Check │ ─── Hit ──► Cached Value
//! └──────┬──────┘
//!        │ Miss
//!        ▼
//! ┌─────────────┐
//! │ Fetch Lock  │ ─── Populated while waiting ──► Cached Value
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ StakingAbi  │ ─── Error ──► Logged, propagated, nothing cached
//! │   query     │
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ Cache Insert│ (per-getter TTL)
//! └──────┬──────┘
//!        │
//!        ▼
//!    Decoded value
//! ```

pub mod accounts;
pub mod cache;
pub mod chain;
pub mod config;
pub mod staking;

#[cfg(test)]
pub(crate) mod test_support;
