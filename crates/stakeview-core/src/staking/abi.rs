//! Chain query adapter for the farm, router and vesting contracts.
//!
//! Every method issues exactly one read-only query and decodes the first return slot.
//! Failures are logged here and returned unchanged; nothing in this module caches.

use crate::chain::{
    Address, ChainError, ContractQuery, ContractRole, DecodedValue, FarmState, QueryArg,
    QueryResponse, ScalarShape, SmartContractQuery, ValueShape,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;
use tracing::{error, trace};

const COMPONENT: &str = "StakingAbi";

pub struct StakingAbi {
    client: Arc<dyn SmartContractQuery>,
    router_address: Address,
}

impl StakingAbi {
    #[must_use]
    pub fn new(client: Arc<dyn SmartContractQuery>, router_address: Address) -> Self {
        Self { client, router_address }
    }

    /// Runs one query against the contract at `address` and decodes its first slot.
    ///
    /// Returns `Ok(None)` when the contract returned nothing.
    ///
    /// # Errors
    ///
    /// Returns the client's error for transport or VM failures and
    /// [`ChainError::Decode`] when the slot does not match `shape`.
    pub async fn invoke(
        &self,
        role: ContractRole,
        address: Address,
        endpoint: &str,
        args: Vec<QueryArg>,
        shape: ValueShape,
    ) -> Result<Option<DecodedValue>, ChainError> {
        self.run(role, address, endpoint, args, |response| {
            DecodedValue::decode(endpoint, shape, response)
        })
        .await
    }

    async fn run<T, F>(
        &self,
        role: ContractRole,
        address: Address,
        endpoint: &str,
        args: Vec<QueryArg>,
        decode: F,
    ) -> Result<T, ChainError>
    where
        F: FnOnce(&QueryResponse) -> Result<T, ChainError> + Send,
    {
        let query = ContractQuery { address, endpoint: endpoint.to_string(), args };
        trace!(component = COMPONENT, endpoint, role = role.as_str(), contract = %address, "invoking");

        let result = match self.client.query(&query).await {
            Ok(response) => decode(&response),
            Err(e) => Err(e),
        };
        result.inspect_err(|e| {
            error!(
                component = COMPONENT,
                endpoint,
                role = role.as_str(),
                contract = %address,
                error = %e,
                "contract query failed"
            );
        })
    }

    async fn farm<T, F>(&self, farm: Address, endpoint: &str, decode: F) -> Result<T, ChainError>
    where
        F: FnOnce(&str, &QueryResponse) -> Result<T, ChainError> + Send,
    {
        self.run(ContractRole::Farm, farm, endpoint, Vec::new(), |r| decode(endpoint, r)).await
    }

    async fn router<T, F>(
        &self,
        endpoint: &str,
        args: Vec<QueryArg>,
        decode: F,
    ) -> Result<T, ChainError>
    where
        F: FnOnce(&str, &QueryResponse) -> Result<T, ChainError> + Send,
    {
        self.run(ContractRole::Router, self.router_address, endpoint, args, |r| decode(endpoint, r))
            .await
    }

    /// Rewards a position of `amount` farm tokens with the given attributes would collect now.
    ///
    /// `attributes` is the base64 attribute blob of the position.
    pub async fn calculate_rewards_for_given_position(
        &self,
        farm: Address,
        amount: &str,
        attributes: &str,
    ) -> Result<String, ChainError> {
        const ENDPOINT: &str = "calculateRewardsForGivenPosition";
        let attributes = BASE64.decode(attributes).map_err(|e| {
            ChainError::InvalidArgument(format!("{ENDPOINT}: attributes are not base64: {e}"))
        })?;
        let args = vec![QueryArg::BigUint(amount.to_string()), QueryArg::Bytes(attributes)];
        self.run(ContractRole::Farm, farm, ENDPOINT, args, |r| numeric(ENDPOINT, r)).await
    }

    pub async fn contract_state(&self, farm: Address) -> Result<FarmState, ChainError> {
        self.farm(farm, "getState", farm_state).await
    }

    pub async fn farm_token_supply(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getFarmTokenSupply", numeric).await
    }

    pub async fn annual_percentage_rewards(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getAnnualPercentageRewards", numeric).await
    }

    pub async fn per_block_reward_amount(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getPerBlockRewardAmount", numeric).await
    }

    /// Same storage as [`Self::per_block_reward_amount`]; farms expose no separate endpoint.
    pub async fn rewards_per_block(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getPerBlockRewardAmount", numeric).await
    }

    pub async fn last_reward_block_nonce(&self, farm: Address) -> Result<u64, ChainError> {
        self.farm(farm, "getLastRewardBlockNonce", |endpoint, r| {
            match required(endpoint, DecodedValue::decode(endpoint, ValueShape::U64, r)?)? {
                DecodedValue::U64(nonce) => Ok(nonce),
                other => Err(mismatch(endpoint, "u64", &other)),
            }
        })
        .await
    }

    pub async fn undistributed_fees(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getUndistributedFees", numeric).await
    }

    /// Amount part of the farm's current block fee, `"0"` when the farm has none.
    pub async fn current_block_fee(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getCurrentBlockFee", |endpoint, r| {
            match DecodedValue::decode(endpoint, ValueShape::TokenAmountPair, r)? {
                None | Some(DecodedValue::TokenAmountPair(None)) => Ok("0".to_string()),
                Some(DecodedValue::TokenAmountPair(Some((_, amount)))) => Ok(amount),
                Some(other) => Err(mismatch(endpoint, "token amount pair", &other)),
            }
        })
        .await
    }

    pub async fn division_safety_constant(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getDivisionSafetyConstant", numeric).await
    }

    /// Whether the farm produces rewards. A farm that returns nothing counts as enabled.
    pub async fn produce_rewards_enabled(&self, farm: Address) -> Result<bool, ChainError> {
        self.farm(farm, "isProduceRewardsEnabled", |endpoint, r| {
            match DecodedValue::decode(endpoint, ValueShape::Bool, r)? {
                None => Ok(true),
                Some(DecodedValue::Bool(enabled)) => Ok(enabled),
                Some(other) => Err(mismatch(endpoint, "bool", &other)),
            }
        })
        .await
    }

    pub async fn reward_per_share(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getRewardPerShare", numeric).await
    }

    pub async fn rewards_left(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getRewardsLeft", numeric).await
    }

    pub async fn farm_token_id(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getFarmTokenIdentifier", text).await
    }

    pub async fn farming_token_id(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getFarmingTokenId", text).await
    }

    pub async fn reward_token_id(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "getRewardTokenId", text).await
    }

    pub async fn rewards_locked(&self, farm: Address) -> Result<bool, ChainError> {
        self.farm(farm, "areRewardsLocked", |endpoint, r| {
            match required(endpoint, DecodedValue::decode(endpoint, ValueShape::Bool, r)?)? {
                DecodedValue::Bool(locked) => Ok(locked),
                other => Err(mismatch(endpoint, "bool", &other)),
            }
        })
        .await
    }

    /// Bech32 address of the farm's vesting contract, or an empty string when unset.
    pub async fn vesting_sc_address(&self, farm: Address) -> Result<String, ChainError> {
        self.farm(farm, "vestingScAddress", |endpoint, r| match r.first() {
            None | Some([]) => Ok(String::new()),
            Some(_) => address(endpoint, r).map(|a| a.to_bech32()),
        })
        .await
    }

    pub async fn group_identifiers(&self) -> Result<Vec<String>, ChainError> {
        self.router("getGroupIdentifiers", Vec::new(), |endpoint, r| {
            list(endpoint, ScalarShape::Text, r)?
                .into_iter()
                .map(|item| match item {
                    DecodedValue::Text(id) => Ok(id),
                    other => Err(mismatch(endpoint, "text", &other)),
                })
                .collect()
        })
        .await
    }

    pub async fn addresses_by_group_id(&self, group_id: &str) -> Result<Vec<Address>, ChainError> {
        let args = vec![QueryArg::Bytes(group_id.as_bytes().to_vec())];
        self.router("getAddressesByGroupIdentifier", args, |endpoint, r| {
            list(endpoint, ScalarShape::Address, r)?
                .into_iter()
                .map(|item| match item {
                    DecodedValue::Address(address) => Ok(address),
                    other => Err(mismatch(endpoint, "address", &other)),
                })
                .collect()
        })
        .await
    }

    /// Group owned by `owner`, if any.
    pub async fn group_by_owner(&self, owner: Address) -> Result<Option<String>, ChainError> {
        self.router("getGroupByOwner", vec![QueryArg::Address(owner)], |endpoint, r| {
            match DecodedValue::decode(endpoint, ValueShape::Text, r)? {
                None => Ok(None),
                Some(DecodedValue::Text(group)) if group.is_empty() => Ok(None),
                Some(DecodedValue::Text(group)) => Ok(Some(group)),
                Some(other) => Err(mismatch(endpoint, "text", &other)),
            }
        })
        .await
    }

    pub async fn vesting_address_by_group_id(&self, group_id: &str) -> Result<Address, ChainError> {
        let args = vec![QueryArg::Bytes(group_id.as_bytes().to_vec())];
        self.router("getVestingAddressByGroupIdentifier", args, address).await
    }

    pub async fn reward_token_id_by_group_id(&self, group_id: &str) -> Result<String, ChainError> {
        let args = vec![QueryArg::Bytes(group_id.as_bytes().to_vec())];
        self.router("getRewardTokenIdByGroupIdentifier", args, text).await
    }

    /// Router-level state of the farm at `farm`.
    pub async fn farm_state(&self, farm: Address) -> Result<FarmState, ChainError> {
        self.router("getFarmState", vec![QueryArg::Address(farm)], farm_state).await
    }

    /// Token identifier of the locked assets the vesting contract at `vesting` issues.
    pub async fn locked_asset_token_id(&self, vesting: Address) -> Result<String, ChainError> {
        const ENDPOINT: &str = "getLockedAssetTokenId";
        self.run(ContractRole::Vesting, vesting, ENDPOINT, Vec::new(), |r| text(ENDPOINT, r)).await
    }
}

fn required(endpoint: &str, value: Option<DecodedValue>) -> Result<DecodedValue, ChainError> {
    value.ok_or_else(|| ChainError::MissingValue(endpoint.to_string()))
}

fn mismatch(endpoint: &str, expected: &str, got: &DecodedValue) -> ChainError {
    ChainError::Decode {
        endpoint: endpoint.to_string(),
        reason: format!("expected {expected}, got {}", got.kind()),
    }
}

fn numeric(endpoint: &str, response: &QueryResponse) -> Result<String, ChainError> {
    match required(endpoint, DecodedValue::decode(endpoint, ValueShape::Numeric, response)?)? {
        DecodedValue::Numeric(value) => Ok(value),
        other => Err(mismatch(endpoint, "numeric", &other)),
    }
}

fn text(endpoint: &str, response: &QueryResponse) -> Result<String, ChainError> {
    match required(endpoint, DecodedValue::decode(endpoint, ValueShape::Text, response)?)? {
        DecodedValue::Text(value) => Ok(value),
        other => Err(mismatch(endpoint, "text", &other)),
    }
}

fn address(endpoint: &str, response: &QueryResponse) -> Result<Address, ChainError> {
    match required(endpoint, DecodedValue::decode(endpoint, ValueShape::Address, response)?)? {
        DecodedValue::Address(value) => Ok(value),
        other => Err(mismatch(endpoint, "address", &other)),
    }
}

fn farm_state(endpoint: &str, response: &QueryResponse) -> Result<FarmState, ChainError> {
    match required(endpoint, DecodedValue::decode(endpoint, ValueShape::FarmState, response)?)? {
        DecodedValue::FarmState(state) => Ok(state),
        other => Err(mismatch(endpoint, "farm state", &other)),
    }
}

fn list(
    endpoint: &str,
    shape: ScalarShape,
    response: &QueryResponse,
) -> Result<Vec<DecodedValue>, ChainError> {
    match DecodedValue::decode_many(endpoint, shape, response)? {
        DecodedValue::List(items) => Ok(items),
        other => Err(mismatch(endpoint, "list", &other)),
    }
}
