//! Test Helper Functions and Utilities
//!
//! Encoders for contract return values, JSON fixtures for the account API, and wiring of
//! the full service stack against mock servers.

use crate::mock_infrastructure::GatewayMockBuilder;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use stakeview_core::{
    accounts::{AccountsService, ApiClient},
    cache::{CacheStoreConfig, MemoryCacheStore},
    chain::{codec::decimal_to_biguint, Address, GatewayClient, HttpClientConfig},
    staking::{StakingAbi, StakingGetter},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast;

/// Router contract address used by every integration test.
pub const ROUTER: Address = Address::new([0xaa; 32]);

/// A farm contract address derived from `seed`.
#[must_use]
pub fn farm_address(seed: u8) -> Address {
    let mut bytes = [seed; 32];
    bytes[..8].fill(0);
    Address::new(bytes)
}

/// An account address derived from `seed`.
#[must_use]
pub fn account_address(seed: u8) -> Address {
    Address::new([seed; 32])
}

#[must_use]
pub fn encode_text(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

/// Top-encodes a decimal integer.
#[must_use]
pub fn encode_biguint(value: &str) -> Vec<u8> {
    decimal_to_biguint(value).expect("valid decimal")
}

/// Top-encodes a `u64` with leading zero bytes stripped.
#[must_use]
pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_be_bytes().into_iter().skip_while(|&b| b == 0).collect()
}

#[must_use]
pub fn encode_bool(value: bool) -> Vec<u8> {
    if value {
        vec![1]
    } else {
        Vec::new()
    }
}

/// Hex argument for a byte-string argument.
#[must_use]
pub fn text_arg(value: &str) -> String {
    hex::encode(value.as_bytes())
}

/// Base64 attribute blob with an extended (u64 percent) unlock schedule.
#[must_use]
pub fn locked_attributes(milestones: &[(u64, u64)]) -> String {
    let mut bytes = u32::try_from(milestones.len()).expect("few milestones").to_be_bytes().to_vec();
    for (epoch, percent) in milestones {
        bytes.extend_from_slice(&epoch.to_be_bytes());
        bytes.extend_from_slice(&percent.to_be_bytes());
    }
    bytes.push(0);
    BASE64.encode(bytes)
}

/// Account token listing entry.
#[must_use]
pub fn token_json(identifier: &str, balance: &str) -> Value {
    let ticker = identifier.split('-').next().unwrap_or(identifier);
    json!({
        "identifier": identifier,
        "name": ticker,
        "ticker": ticker,
        "decimals": 18,
        "balance": balance
    })
}

/// Account meta-ESDT listing entry.
#[must_use]
pub fn meta_json(collection: &str, nonce: u64, balance: &str, attributes: &str) -> Value {
    let ticker = collection.split('-').next().unwrap_or(collection);
    json!({
        "identifier": format!("{collection}-{nonce:02x}"),
        "collection": collection,
        "nonce": nonce,
        "name": ticker,
        "ticker": ticker,
        "decimals": 18,
        "balance": balance,
        "attributes": attributes
    })
}

/// Registers the three token id endpoints of one farm.
pub fn mock_farm_tokens(
    gateway: &mut GatewayMockBuilder,
    farm: Address,
    farm_token: &str,
    farming_token: &str,
    reward_token: &str,
) {
    gateway
        .mock_query(farm, "getFarmTokenIdentifier", &[], &[encode_text(farm_token)])
        .mock_query(farm, "getFarmingTokenId", &[], &[encode_text(farming_token)])
        .mock_query(farm, "getRewardTokenId", &[], &[encode_text(reward_token)]);
}

/// Registers router group listing and the farms of each group.
pub fn mock_groups(gateway: &mut GatewayMockBuilder, groups: &[(&str, &[Address])]) {
    let ids: Vec<Vec<u8>> = groups.iter().map(|(id, _)| encode_text(id)).collect();
    gateway.mock_query(ROUTER, "getGroupIdentifiers", &[], &ids);
    for (group_id, farms) in groups {
        let farms: Vec<Vec<u8>> = farms.iter().map(|farm| farm.as_bytes().to_vec()).collect();
        gateway.mock_query(
            ROUTER,
            "getAddressesByGroupIdentifier",
            &[text_arg(group_id)],
            &farms,
        );
    }
}

/// Registers the vesting contract of a group and the locked token it issues.
pub fn mock_vesting(
    gateway: &mut GatewayMockBuilder,
    group_id: &str,
    vesting: Address,
    locked_token: &str,
) {
    gateway
        .mock_query(
            ROUTER,
            "getVestingAddressByGroupIdentifier",
            &[text_arg(group_id)],
            &[vesting.as_bytes().to_vec()],
        )
        .mock_query(vesting, "getLockedAssetTokenId", &[], &[encode_text(locked_token)]);
}

/// Service stack wired against mock servers.
pub struct TestServices {
    pub getter: Arc<StakingGetter>,
    pub accounts: AccountsService,
    pub cache: MemoryCacheStore,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl Drop for TestServices {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Builds gateway and API clients, a cache store with running workers, and the getter
/// and account layers.
#[must_use]
pub fn create_services(gateway_url: &str, api_url: &str) -> TestServices {
    let http_config = HttpClientConfig {
        request_timeout: Duration::from_secs(5),
        ..HttpClientConfig::default()
    };
    let gateway = Arc::new(
        GatewayClient::new(gateway_url, http_config.clone()).expect("gateway client builds"),
    );
    let api = Arc::new(ApiClient::new(api_url, http_config).expect("api client builds"));

    let (shutdown_tx, _) = broadcast::channel(1);
    let cache = MemoryCacheStore::new(CacheStoreConfig::default());
    cache.start_background_tasks(&shutdown_tx);

    let abi = Arc::new(StakingAbi::new(gateway, ROUTER));
    let getter = Arc::new(StakingGetter::new(abi, Arc::new(cache.clone()), api.clone()));
    let accounts = AccountsService::new(getter.clone(), api);

    TestServices { getter, accounts, cache, shutdown_tx }
}
