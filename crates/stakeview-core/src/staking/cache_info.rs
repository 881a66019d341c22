//! Cache keys and lifetimes for every cached getter.
//!
//! A key is the getter name, followed by `:<param>` for getters scoped to a contract,
//! group, shard or identifier. The lifetime belongs to the getter, never to the call.

use std::{fmt, time::Duration};

/// Lifetime used by getters that do not declare their own.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

const ONE_MINUTE: Duration = Duration::from_secs(60);
const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);
/// One round on the target network.
const ONE_ROUND: Duration = Duration::from_secs(6);

/// Logical name of a cached getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Getter {
    ContractState,
    FarmTokenSupply,
    AnnualPercentageRewards,
    PerBlockRewardAmount,
    RewardsPerBlock,
    LastRewardBlockNonce,
    UndistributedFees,
    CurrentBlockFee,
    DivisionSafetyConstant,
    ProduceRewardsEnabled,
    RewardPerShare,
    RewardsLeft,
    GroupIdentifiers,
    AddressesByGroupId,
    GroupByOwner,
    VestingAddressByGroupId,
    RewardTokenIdByGroupId,
    FarmTokenId,
    FarmingTokenId,
    RewardTokenId,
    RewardsLocked,
    VestingScAddress,
    FarmState,
    CurrentEpoch,
    Stats,
    ShardCurrentBlockNonce,
    StakeToken,
}

impl Getter {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ContractState => "contractState",
            Self::FarmTokenSupply => "farmTokenSupply",
            Self::AnnualPercentageRewards => "annualPercentageRewards",
            Self::PerBlockRewardAmount => "perBlockRewardAmount",
            Self::RewardsPerBlock => "rewardsPerBlock",
            Self::LastRewardBlockNonce => "lastRewardBlockNonce",
            Self::UndistributedFees => "undistributedFees",
            Self::CurrentBlockFee => "currentBlockFee",
            Self::DivisionSafetyConstant => "divisionSafetyConstant",
            Self::ProduceRewardsEnabled => "produceRewardsEnabled",
            Self::RewardPerShare => "rewardPerShare",
            Self::RewardsLeft => "rewardsLeft",
            Self::GroupIdentifiers => "groupIdentifiers",
            Self::AddressesByGroupId => "addressesByGroupId",
            Self::GroupByOwner => "groupByOwner",
            Self::VestingAddressByGroupId => "vestingAddressByGroupId",
            Self::RewardTokenIdByGroupId => "rewardTokenIdByGroupId",
            Self::FarmTokenId => "farmTokenId",
            Self::FarmingTokenId => "farmingTokenId",
            Self::RewardTokenId => "rewardTokenId",
            Self::RewardsLocked => "areRewardsLocked",
            Self::VestingScAddress => "vestingScAddress",
            Self::FarmState => "farmState",
            Self::CurrentEpoch => "currentEpoch",
            Self::Stats => "stats",
            Self::ShardCurrentBlockNonce => "shardCurrentBlockNonce",
            Self::StakeToken => "stakeToken",
        }
    }

    #[must_use]
    pub const fn ttl(self) -> Duration {
        match self {
            Self::ShardCurrentBlockNonce => ONE_ROUND,
            Self::FarmTokenSupply
            | Self::AnnualPercentageRewards
            | Self::PerBlockRewardAmount
            | Self::RewardsPerBlock
            | Self::LastRewardBlockNonce
            | Self::UndistributedFees
            | Self::CurrentBlockFee
            | Self::RewardPerShare
            | Self::RewardsLeft
            | Self::CurrentEpoch
            | Self::Stats => ONE_MINUTE,
            Self::ContractState | Self::ProduceRewardsEnabled | Self::FarmState => FIVE_MINUTES,
            Self::DivisionSafetyConstant
            | Self::GroupIdentifiers
            | Self::AddressesByGroupId
            | Self::GroupByOwner
            | Self::VestingAddressByGroupId
            | Self::RewardTokenIdByGroupId
            | Self::FarmTokenId
            | Self::FarmingTokenId
            | Self::RewardTokenId
            | Self::RewardsLocked
            | Self::VestingScAddress
            | Self::StakeToken => DEFAULT_TTL,
        }
    }

    /// Cache descriptor for a getter scoped to `param`.
    #[must_use]
    pub fn scoped(self, param: impl fmt::Display) -> CacheInfo {
        CacheInfo { key: format!("{}:{param}", self.name()), ttl: self.ttl() }
    }

    /// Cache descriptor for a global getter that takes no parameter.
    #[must_use]
    pub fn global(self) -> CacheInfo {
        CacheInfo { key: self.name().to_string(), ttl: self.ttl() }
    }
}

impl fmt::Display for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where one cached fact lives and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub key: String,
    pub ttl: Duration,
}
