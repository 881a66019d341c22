//! Staking contract access: the query adapter and its cached getters.
//!
//! - `abi`: one typed method per contract endpoint, uncached
//! - `getter`: cache-aside wrappers with per-getter keys and lifetimes
//! - `cache_info`: key and lifetime catalogue
//! - `models`: staking groups, child contracts and farm summaries

pub mod abi;
pub mod cache_info;
pub mod errors;
pub mod getter;
pub mod models;

pub use abi::StakingAbi;
pub use cache_info::{CacheInfo, Getter, DEFAULT_TTL};
pub use errors::StakingError;
pub use getter::StakingGetter;
pub use models::{ChildContract, FarmSummary, StakingGroup};
