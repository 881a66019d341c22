use crate::chain::{Address, FarmState};
use serde::{Deserialize, Serialize};

/// A staking group registered on the router, with its farms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingGroup {
    pub group_id: String,
    pub child_contracts: Vec<ChildContract>,
}

/// One farm contract inside a staking group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildContract {
    pub address: Address,
    pub farming_token_id: String,
    pub reward_token_id: String,
    pub farm_token_id: String,
}

/// Reward accounting and configuration of one farm, as read from its cached getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSummary {
    pub address: Address,
    pub state: FarmState,
    pub farm_token_id: String,
    pub farming_token_id: String,
    pub reward_token_id: String,
    pub farm_token_supply: String,
    pub annual_percentage_rewards: String,
    pub per_block_reward_amount: String,
    pub last_reward_block_nonce: u64,
    pub undistributed_fees: String,
    pub current_block_fee: String,
    pub division_safety_constant: String,
    pub reward_per_share: String,
    pub produce_rewards_enabled: bool,
    pub rewards_locked: bool,
}
