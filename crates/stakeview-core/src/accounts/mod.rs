//! Account-level views composed from the cached staking getters.
//!
//! Every operation is a single read-then-compose pass over the staking group hierarchy:
//! groups are fetched (leaf getters cached), the identifiers they reference are
//! deduplicated, and the account's holdings are filtered or enriched against them.

pub mod attributes;
pub mod models;
pub mod provider;
pub mod unlock;

pub use attributes::LockedAssetAttributes;
pub use models::{
    AccountDetails, EsdtToken, LockedToken, LockedTokenCollection, MetaEsdt, NetworkStats,
    NftCollection, StakeToken, TokenAssets, UnlockMilestone,
};
pub use provider::{AccountDataProvider, ApiClient};
pub use unlock::{calc_unlock_date, remaining_epochs, UnlockDate};

use crate::{
    chain::{codec::is_zero_amount, Address},
    staking::{StakingError, StakingGetter, StakingGroup},
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, warn};

const COMPONENT: &str = "AccountsService";

pub struct AccountsService {
    getter: Arc<StakingGetter>,
    provider: Arc<dyn AccountDataProvider>,
}

impl AccountsService {
    #[must_use]
    pub fn new(getter: Arc<StakingGetter>, provider: Arc<dyn AccountDataProvider>) -> Self {
        Self { getter, provider }
    }

    pub async fn account_details(&self, address: &Address) -> Result<AccountDetails, StakingError> {
        let egld_balance = self.egld_balance(address).await?;
        Ok(AccountDetails { address: address.to_bech32(), egld_balance })
    }

    pub async fn egld_balance(&self, address: &Address) -> Result<String, StakingError> {
        Ok(self.provider.account_balance(address).await?)
    }

    /// Tokens held by `address` that some staking farm uses as farming or reward token.
    ///
    /// The result keeps the order of the account's own token list.
    pub async fn esdt_tokens(&self, address: &Address) -> Result<Vec<EsdtToken>, StakingError> {
        let (tokens, groups) = tokio::try_join!(
            async { Ok::<_, StakingError>(self.provider.esdt_tokens(address).await?) },
            self.getter.farm_staking_groups(),
        )?;

        let staked_ids: HashSet<&str> = groups
            .iter()
            .flat_map(|group| &group.child_contracts)
            .flat_map(|child| [child.farming_token_id.as_str(), child.reward_token_id.as_str()])
            .collect();

        let mut seen = HashSet::new();
        let held = tokens
            .into_iter()
            .filter(|token| staked_ids.contains(token.identifier.as_str()))
            .filter(|token| seen.insert(token.identifier.clone()))
            .collect();
        Ok(held)
    }

    /// Locked tokens held by `address`, grouped by collection, with unlock dates.
    pub async fn locked_tokens(
        &self,
        address: &Address,
    ) -> Result<Vec<LockedTokenCollection>, StakingError> {
        self.locked_tokens_at(address, Utc::now()).await
    }

    /// [`Self::locked_tokens`] with unlock dates computed relative to `now`.
    pub async fn locked_tokens_at(
        &self,
        address: &Address,
        now: DateTime<Utc>,
    ) -> Result<Vec<LockedTokenCollection>, StakingError> {
        let groups = self.getter.farm_staking_groups().await?;
        let token_ids = self.locked_token_ids(&groups).await;
        if token_ids.is_empty() {
            debug!(component = COMPONENT, %address, "no locked asset tokens configured");
            return Ok(Vec::new());
        }

        let metas = self.provider.meta_esdts(address, &token_ids).await?;

        let mut stats = None;
        let mut collections: Vec<LockedTokenCollection> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for meta in metas {
            let attributes =
                meta.attributes.as_deref().and_then(LockedAssetAttributes::from_base64);
            let Some(attributes) = attributes else {
                continue;
            };
            if is_zero_amount(meta.balance.as_deref()) {
                continue;
            }

            // Fetched once per aggregation so every milestone shares one epoch
            let stats = match stats {
                Some(stats) => stats,
                None => *stats.insert(self.getter.stats().await?),
            };

            let mut unlock_schedule = attributes.unlock_schedule;
            for milestone in &mut unlock_schedule {
                let remaining = remaining_epochs(milestone.epoch, stats.epoch);
                milestone.unlock_date = Some(calc_unlock_date(remaining, &stats, now).display());
            }

            let token = LockedToken {
                identifier: meta.identifier,
                collection: meta.collection.clone(),
                ticker: meta.ticker,
                name: meta.name,
                nonce: meta.nonce,
                balance: meta.balance.unwrap_or_default(),
                decimals: meta.decimals,
                assets: meta.assets,
                unlock_schedule,
            };

            match index.get(&meta.collection) {
                Some(&position) => collections[position].tokens.push(token),
                None => {
                    index.insert(meta.collection.clone(), collections.len());
                    collections.push(LockedTokenCollection {
                        collection: meta.collection,
                        tokens: vec![token],
                    });
                }
            }
        }

        Ok(collections)
    }

    /// Resolves every group's locked asset token id concurrently.
    ///
    /// A group whose lookup fails contributes nothing. Ids come back deduplicated in
    /// group order.
    async fn locked_token_ids(&self, groups: &[StakingGroup]) -> Vec<String> {
        let lookups = groups.iter().map(|group| async move {
            match self.getter.locked_asset_token_id(&group.group_id).await {
                Ok(token_id) => Some(token_id),
                Err(e) => {
                    warn!(
                        component = COMPONENT,
                        group_id = %group.group_id,
                        error = %e,
                        "skipping group without locked asset token"
                    );
                    None
                }
            }
        });

        dedup(join_all(lookups).await.into_iter().flatten().filter(|id| !id.is_empty()))
    }

    /// Farm token positions held by `address` across every staking farm.
    pub async fn farm_tokens(&self, address: &Address) -> Result<Vec<MetaEsdt>, StakingError> {
        let groups = self.getter.farm_staking_groups().await?;
        let farm_token_ids = dedup(
            groups
                .iter()
                .flat_map(|group| &group.child_contracts)
                .map(|child| child.farm_token_id.clone()),
        );
        if farm_token_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self.provider.meta_esdts(address, &farm_token_ids).await?)
    }
}

/// Keeps the first occurrence of every id.
fn dedup(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
