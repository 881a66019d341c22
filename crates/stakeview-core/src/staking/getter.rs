//! Cached getters over the chain query adapter and the account data provider.

use crate::{
    accounts::{models::NetworkStats, provider::AccountDataProvider, StakeToken},
    cache::{CacheError, CacheFactory, CacheStore},
    chain::{Address, ChainError, FarmState},
    staking::{
        abi::StakingAbi,
        cache_info::{CacheInfo, Getter},
        errors::StakingError,
        models::{ChildContract, FarmSummary, StakingGroup},
    },
};
use futures::{future::try_join_all, FutureExt};
use serde::{de::DeserializeOwned, Serialize};
use std::{future::Future, sync::Arc};
use tracing::{debug, error, warn};

const COMPONENT: &str = "StakingGetter";

/// Cache-aside access to every staking getter.
///
/// Each getter computes its cache key from its name and parameter, asks the shared
/// [`CacheStore`] for the value, and only queries the chain on a miss. Failures are
/// logged and returned; nothing is cached for a failed fetch.
#[derive(Clone)]
pub struct StakingGetter {
    abi: Arc<StakingAbi>,
    cache: Arc<dyn CacheStore>,
    provider: Arc<dyn AccountDataProvider>,
}

impl StakingGetter {
    #[must_use]
    pub fn new(
        abi: Arc<StakingAbi>,
        cache: Arc<dyn CacheStore>,
        provider: Arc<dyn AccountDataProvider>,
    ) -> Self {
        Self { abi, cache, provider }
    }

    async fn get_data<T, Fut>(
        &self,
        getter: Getter,
        info: CacheInfo,
        fetch: Fut,
    ) -> Result<T, StakingError>
    where
        T: Serialize + DeserializeOwned + Send,
        Fut: Future<Output = Result<T, ChainError>> + Send,
    {
        let factory: CacheFactory<'_> = async move {
            let value = fetch.await?;
            Ok(serde_json::to_value(value)?)
        }
        .boxed();

        let result = match self.cache.get_or_set(&info.key, info.ttl, factory).await {
            Ok(value) => serde_json::from_value(value).map_err(CacheError::from),
            Err(e) => Err(e),
        };

        result.map_err(|source| {
            error!(
                component = COMPONENT,
                getter = getter.name(),
                cache_key = %info.key,
                error = %source,
                "cached getter failed"
            );
            StakingError::Getter { getter: getter.name(), key: info.key, source }
        })
    }

    async fn farm_data<T, Fut>(
        &self,
        getter: Getter,
        farm: Address,
        fetch: Fut,
    ) -> Result<T, StakingError>
    where
        T: Serialize + DeserializeOwned + Send,
        Fut: Future<Output = Result<T, ChainError>> + Send,
    {
        self.get_data(getter, getter.scoped(farm), fetch).await
    }

    /// Rewards for a specific position. Never cached: the answer depends on the position
    /// and on the block it is asked at.
    pub async fn calculate_rewards_for_given_position(
        &self,
        farm: Address,
        amount: &str,
        attributes: &str,
    ) -> Result<String, StakingError> {
        Ok(self.abi.calculate_rewards_for_given_position(farm, amount, attributes).await?)
    }

    pub async fn contract_state(&self, farm: Address) -> Result<FarmState, StakingError> {
        self.farm_data(Getter::ContractState, farm, self.abi.contract_state(farm)).await
    }

    pub async fn farm_token_supply(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::FarmTokenSupply, farm, self.abi.farm_token_supply(farm)).await
    }

    pub async fn annual_percentage_rewards(&self, farm: Address) -> Result<String, StakingError> {
        let fetch = self.abi.annual_percentage_rewards(farm);
        self.farm_data(Getter::AnnualPercentageRewards, farm, fetch).await
    }

    pub async fn per_block_reward_amount(&self, farm: Address) -> Result<String, StakingError> {
        let fetch = self.abi.per_block_reward_amount(farm);
        self.farm_data(Getter::PerBlockRewardAmount, farm, fetch).await
    }

    pub async fn rewards_per_block(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::RewardsPerBlock, farm, self.abi.rewards_per_block(farm)).await
    }

    pub async fn last_reward_block_nonce(&self, farm: Address) -> Result<u64, StakingError> {
        let fetch = self.abi.last_reward_block_nonce(farm);
        self.farm_data(Getter::LastRewardBlockNonce, farm, fetch).await
    }

    pub async fn undistributed_fees(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::UndistributedFees, farm, self.abi.undistributed_fees(farm)).await
    }

    pub async fn current_block_fee(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::CurrentBlockFee, farm, self.abi.current_block_fee(farm)).await
    }

    pub async fn division_safety_constant(&self, farm: Address) -> Result<String, StakingError> {
        let fetch = self.abi.division_safety_constant(farm);
        self.farm_data(Getter::DivisionSafetyConstant, farm, fetch).await
    }

    pub async fn produce_rewards_enabled(&self, farm: Address) -> Result<bool, StakingError> {
        let fetch = self.abi.produce_rewards_enabled(farm);
        self.farm_data(Getter::ProduceRewardsEnabled, farm, fetch).await
    }

    pub async fn reward_per_share(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::RewardPerShare, farm, self.abi.reward_per_share(farm)).await
    }

    pub async fn rewards_left(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::RewardsLeft, farm, self.abi.rewards_left(farm)).await
    }

    pub async fn farm_token_id(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::FarmTokenId, farm, self.abi.farm_token_id(farm)).await
    }

    pub async fn farming_token_id(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::FarmingTokenId, farm, self.abi.farming_token_id(farm)).await
    }

    pub async fn reward_token_id(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::RewardTokenId, farm, self.abi.reward_token_id(farm)).await
    }

    pub async fn rewards_locked(&self, farm: Address) -> Result<bool, StakingError> {
        self.farm_data(Getter::RewardsLocked, farm, self.abi.rewards_locked(farm)).await
    }

    pub async fn vesting_sc_address(&self, farm: Address) -> Result<String, StakingError> {
        self.farm_data(Getter::VestingScAddress, farm, self.abi.vesting_sc_address(farm)).await
    }

    pub async fn farm_state(&self, farm: Address) -> Result<FarmState, StakingError> {
        self.farm_data(Getter::FarmState, farm, self.abi.farm_state(farm)).await
    }

    pub async fn group_identifiers(&self) -> Result<Vec<String>, StakingError> {
        let getter = Getter::GroupIdentifiers;
        self.get_data(getter, getter.global(), self.abi.group_identifiers()).await
    }

    pub async fn addresses_by_group_id(&self, group_id: &str) -> Result<Vec<Address>, StakingError> {
        let getter = Getter::AddressesByGroupId;
        self.get_data(getter, getter.scoped(group_id), self.abi.addresses_by_group_id(group_id))
            .await
    }

    pub async fn group_by_owner(&self, owner: Address) -> Result<Option<String>, StakingError> {
        let getter = Getter::GroupByOwner;
        self.get_data(getter, getter.scoped(owner), self.abi.group_by_owner(owner)).await
    }

    pub async fn vesting_address_by_group_id(
        &self,
        group_id: &str,
    ) -> Result<Address, StakingError> {
        let getter = Getter::VestingAddressByGroupId;
        let fetch = self.abi.vesting_address_by_group_id(group_id);
        self.get_data(getter, getter.scoped(group_id), fetch).await
    }

    pub async fn reward_token_id_by_group_id(
        &self,
        group_id: &str,
    ) -> Result<String, StakingError> {
        let getter = Getter::RewardTokenIdByGroupId;
        let fetch = self.abi.reward_token_id_by_group_id(group_id);
        self.get_data(getter, getter.scoped(group_id), fetch).await
    }

    /// Locked asset token id of a group: the group's vesting address comes from the cache,
    /// the vesting contract itself is queried on every call.
    pub async fn locked_asset_token_id(&self, group_id: &str) -> Result<String, StakingError> {
        let vesting = self.vesting_address_by_group_id(group_id).await?;
        Ok(self.abi.locked_asset_token_id(vesting).await?)
    }

    pub async fn stats(&self) -> Result<NetworkStats, StakingError> {
        let getter = Getter::Stats;
        self.get_data(getter, getter.global(), self.provider.stats()).await
    }

    pub async fn current_epoch(&self) -> Result<u64, StakingError> {
        let getter = Getter::CurrentEpoch;
        let fetch = async { Ok::<_, ChainError>(self.provider.stats().await?.epoch) };
        self.get_data(getter, getter.global(), fetch).await
    }

    pub async fn shard_current_block_nonce(&self, shard: u32) -> Result<u64, StakingError> {
        let getter = Getter::ShardCurrentBlockNonce;
        self.get_data(getter, getter.scoped(shard), self.provider.current_block_nonce(shard)).await
    }

    /// Looks `identifier` up as a fungible token, then as a collection.
    ///
    /// Not finding it is a normal outcome, so lookup failures are logged and reported as
    /// `None` rather than returned.
    pub async fn token(&self, identifier: &str) -> Option<StakeToken> {
        if identifier.is_empty() {
            return None;
        }

        let info = Getter::StakeToken.scoped(identifier);
        let provider = Arc::clone(&self.provider);
        let factory: CacheFactory<'_> = async move {
            if let Some(token) = provider.esdt_token(identifier).await? {
                return Ok(serde_json::to_value(StakeToken::Esdt(token))?);
            }
            match provider.nft_collection(identifier).await? {
                Some(collection) => Ok(serde_json::to_value(StakeToken::Collection(collection))?),
                None => Err(CacheError::Absent),
            }
        }
        .boxed();

        let lookup = match self.cache.get_or_set(&info.key, info.ttl, factory).await {
            Ok(value) => serde_json::from_value(value).map_err(CacheError::from),
            Err(e) => Err(e),
        };

        match lookup {
            Ok(token) => Some(token),
            Err(e) if e.is_absent() => {
                debug!(component = COMPONENT, cache_key = %info.key, "token not found");
                None
            }
            Err(e) => {
                warn!(
                    component = COMPONENT,
                    getter = Getter::StakeToken.name(),
                    cache_key = %info.key,
                    error = %e,
                    "token lookup failed"
                );
                None
            }
        }
    }

    /// Every staking group with its farms and their token ids.
    ///
    /// Groups and their farms are resolved concurrently. The assembly itself is not cached;
    /// each leaf getter is.
    pub async fn farm_staking_groups(&self) -> Result<Vec<StakingGroup>, StakingError> {
        let group_ids = self.group_identifiers().await?;
        try_join_all(group_ids.into_iter().map(|group_id| self.staking_group(group_id))).await
    }

    async fn staking_group(&self, group_id: String) -> Result<StakingGroup, StakingError> {
        let addresses = self.addresses_by_group_id(&group_id).await?;
        let child_contracts =
            try_join_all(addresses.into_iter().map(|address| self.child_contract(address)))
                .await?;
        Ok(StakingGroup { group_id, child_contracts })
    }

    async fn child_contract(&self, address: Address) -> Result<ChildContract, StakingError> {
        let (farm_token_id, farming_token_id, reward_token_id) = tokio::try_join!(
            self.farm_token_id(address),
            self.farming_token_id(address),
            self.reward_token_id(address),
        )?;
        Ok(ChildContract { address, farming_token_id, reward_token_id, farm_token_id })
    }

    /// Configuration and reward accounting of one farm, every field from its cached getter.
    pub async fn farm_summary(&self, farm: Address) -> Result<FarmSummary, StakingError> {
        let (state, farm_token_id, farming_token_id, reward_token_id) = tokio::try_join!(
            self.contract_state(farm),
            self.farm_token_id(farm),
            self.farming_token_id(farm),
            self.reward_token_id(farm),
        )?;
        let (
            farm_token_supply,
            annual_percentage_rewards,
            per_block_reward_amount,
            last_reward_block_nonce,
            undistributed_fees,
            current_block_fee,
        ) = tokio::try_join!(
            self.farm_token_supply(farm),
            self.annual_percentage_rewards(farm),
            self.per_block_reward_amount(farm),
            self.last_reward_block_nonce(farm),
            self.undistributed_fees(farm),
            self.current_block_fee(farm),
        )?;
        let (division_safety_constant, reward_per_share, produce_rewards_enabled, rewards_locked) =
            tokio::try_join!(
                self.division_safety_constant(farm),
                self.reward_per_share(farm),
                self.produce_rewards_enabled(farm),
                self.rewards_locked(farm),
            )?;

        Ok(FarmSummary {
            address: farm,
            state,
            farm_token_id,
            farming_token_id,
            reward_token_id,
            farm_token_supply,
            annual_percentage_rewards,
            per_block_reward_amount,
            last_reward_block_nonce,
            undistributed_fees,
            current_block_fee,
            division_safety_constant,
            reward_per_share,
            produce_rewards_enabled,
            rewards_locked,
        })
    }
}
