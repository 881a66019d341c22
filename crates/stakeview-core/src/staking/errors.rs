use crate::{cache::CacheError, chain::ChainError};
use thiserror::Error;

/// Errors returned by the cached getters and the aggregations built on them.
#[derive(Error, Debug)]
pub enum StakingError {
    /// A cached getter could not produce its value. The cache key was left unset.
    #[error("{getter} failed for {key}: {source}")]
    Getter {
        getter: &'static str,
        key: String,
        #[source]
        source: CacheError,
    },

    /// An uncached chain call or account lookup failed.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl StakingError {
    /// Name of the cached getter that failed, if the failure came from one.
    #[must_use]
    pub fn getter(&self) -> Option<&'static str> {
        match self {
            Self::Getter { getter, .. } => Some(getter),
            Self::Chain(_) => None,
        }
    }
}
