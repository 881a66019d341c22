//! Integration tests for cache-aside behavior of the staking getters.

use crate::mock_infrastructure::{
    create_services, encode_biguint, encode_bool, encode_text, encode_u64, farm_address,
    mock_farm_tokens, mock_groups, ApiMockBuilder, GatewayMockBuilder,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;
use stakeview_core::{
    accounts::StakeToken,
    cache::{CacheError, CacheStore},
    chain::FarmState,
    staking::{ChildContract, Getter},
};
use std::time::Duration;

#[tokio::test]
async fn test_repeated_reads_query_the_contract_once() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let farm = farm_address(1);
    let mock = gateway.expect_query(
        farm,
        "getFarmTokenSupply",
        &[],
        &[encode_biguint("500000000000000000000")],
        Some(1),
    );

    let services = create_services(&gateway.url(), &api.url());
    for _ in 0..3 {
        let supply = services.getter.farm_token_supply(farm).await.unwrap();
        assert_eq!(supply, "500000000000000000000");
    }

    mock.assert_async().await;
    let key = Getter::FarmTokenSupply.scoped(farm).key;
    assert_eq!(services.cache.peek(&key), Some(json!("500000000000000000000")));
    assert_eq!(services.cache.stats().hits, 2);
}

#[tokio::test]
async fn test_concurrent_cold_reads_coalesce() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let farm = farm_address(2);
    let mock =
        gateway.expect_query(farm, "getRewardsLeft", &[], &[encode_biguint("77")], Some(1));

    let services = create_services(&gateway.url(), &api.url());
    let getter = &services.getter;
    let (a, b, c) = tokio::join!(
        getter.rewards_left(farm),
        getter.rewards_left(farm),
        getter.rewards_left(farm),
    );

    assert_eq!(a.unwrap(), "77");
    assert_eq!(b.unwrap(), "77");
    assert_eq!(c.unwrap(), "77");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_distinct_farms_use_distinct_keys() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let (first, second) = (farm_address(3), farm_address(4));
    gateway
        .mock_query(first, "getFarmTokenIdentifier", &[], &[encode_text("FARMA-aaaaaa")])
        .mock_query(second, "getFarmTokenIdentifier", &[], &[encode_text("FARMB-bbbbbb")]);

    let services = create_services(&gateway.url(), &api.url());

    assert_eq!(services.getter.farm_token_id(first).await.unwrap(), "FARMA-aaaaaa");
    assert_eq!(services.getter.farm_token_id(second).await.unwrap(), "FARMB-bbbbbb");
    assert_eq!(services.cache.len(), 2);
}

#[tokio::test]
async fn test_failed_read_is_not_cached() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let farm = farm_address(5);
    gateway.mock_vm_error(farm, "getUndistributedFees", "user error", "unknown storage");

    let services = create_services(&gateway.url(), &api.url());
    let err = services.getter.undistributed_fees(farm).await.unwrap_err();

    assert_eq!(err.getter(), Some("undistributedFees"));
    assert!(err.to_string().contains(&Getter::UndistributedFees.scoped(farm).key));
    assert!(services.cache.is_empty());
    assert_eq!(services.cache.stats().failures, 1);
}

#[tokio::test]
async fn test_rewards_for_position_are_never_cached() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let farm = farm_address(6);
    let attributes = BASE64.encode([0u8, 0, 0, 1, 7]);
    let mock = gateway.expect_query(
        farm,
        "calculateRewardsForGivenPosition",
        &[hex::encode(encode_biguint("1000")), "0000000107".to_string()],
        &[encode_biguint("42")],
        Some(2),
    );

    let services = create_services(&gateway.url(), &api.url());
    for _ in 0..2 {
        let rewards = services
            .getter
            .calculate_rewards_for_given_position(farm, "1000", &attributes)
            .await
            .unwrap();
        assert_eq!(rewards, "42");
    }

    mock.assert_async().await;
    assert!(services.cache.is_empty());
}

#[tokio::test]
async fn test_farm_summary_reads_every_field() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let farm = farm_address(7);
    mock_farm_tokens(&mut gateway, farm, "STAKE-111111", "RIDE-222222", "RIDE-222222");
    gateway
        .mock_query(farm, "getState", &[], &[encode_u64(1)])
        .mock_query(farm, "getFarmTokenSupply", &[], &[encode_biguint("1000")])
        .mock_query(farm, "getAnnualPercentageRewards", &[], &[encode_biguint("2500")])
        .mock_query(farm, "getPerBlockRewardAmount", &[], &[encode_biguint("15")])
        .mock_query(farm, "getLastRewardBlockNonce", &[], &[encode_u64(9_000)])
        .mock_query(farm, "getUndistributedFees", &[], &[encode_biguint("0")])
        .mock_query(farm, "getCurrentBlockFee", &[], &[])
        .mock_query(farm, "getDivisionSafetyConstant", &[], &[encode_biguint("1000000000000")])
        .mock_query(farm, "getRewardPerShare", &[], &[encode_biguint("3")])
        .mock_query(farm, "isProduceRewardsEnabled", &[], &[encode_bool(true)])
        .mock_query(farm, "areRewardsLocked", &[], &[encode_bool(false)]);

    let services = create_services(&gateway.url(), &api.url());
    let summary = services.getter.farm_summary(farm).await.unwrap();

    assert_eq!(summary.address, farm);
    assert_eq!(summary.state, FarmState::Active);
    assert_eq!(summary.farm_token_id, "STAKE-111111");
    assert_eq!(summary.farm_token_supply, "1000");
    assert_eq!(summary.per_block_reward_amount, "15");
    assert_eq!(summary.last_reward_block_nonce, 9_000);
    assert_eq!(summary.undistributed_fees, "0");
    assert_eq!(summary.current_block_fee, "0");
    assert_eq!(summary.division_safety_constant, "1000000000000");
    assert!(summary.produce_rewards_enabled);
    assert!(!summary.rewards_locked);
}

#[tokio::test]
async fn test_rewards_per_block_and_per_block_amount_share_an_endpoint() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let farm = farm_address(8);
    let mock = gateway.expect_query(
        farm,
        "getPerBlockRewardAmount",
        &[],
        &[encode_biguint("15")],
        Some(2),
    );

    let services = create_services(&gateway.url(), &api.url());
    assert_eq!(services.getter.per_block_reward_amount(farm).await.unwrap(), "15");
    assert_eq!(services.getter.rewards_per_block(farm).await.unwrap(), "15");

    // Cached under separate keys
    assert_eq!(services.cache.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_farm_staking_groups_resolve_every_farm() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let (mex_a, mex_b, ride) = (farm_address(9), farm_address(10), farm_address(11));
    mock_groups(&mut gateway, &[("MEX", &[mex_a, mex_b][..]), ("RIDE", &[ride][..])]);
    mock_farm_tokens(&mut gateway, mex_a, "SMEXA-aaaaaa", "MEX-455c57", "MEX-455c57");
    mock_farm_tokens(&mut gateway, mex_b, "SMEXB-bbbbbb", "LKMEX-aab910", "MEX-455c57");
    mock_farm_tokens(&mut gateway, ride, "SRIDE-cccccc", "RIDE-7d18e9", "RIDE-7d18e9");

    let services = create_services(&gateway.url(), &api.url());
    let groups = services.getter.farm_staking_groups().await.unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].group_id, "MEX");
    assert_eq!(
        groups[0].child_contracts[1],
        ChildContract {
            address: mex_b,
            farming_token_id: "LKMEX-aab910".to_string(),
            reward_token_id: "MEX-455c57".to_string(),
            farm_token_id: "SMEXB-bbbbbb".to_string(),
        }
    );
    assert_eq!(groups[1].child_contracts.len(), 1);
    assert_eq!(groups[1].child_contracts[0].farm_token_id, "SRIDE-cccccc");
}

#[tokio::test]
async fn test_farm_staking_groups_fail_when_a_farm_fails() {
    let mut gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let (good, bad) = (farm_address(12), farm_address(13));
    mock_groups(&mut gateway, &[("MEX", &[good, bad][..])]);
    mock_farm_tokens(&mut gateway, good, "SMEX-aaaaaa", "MEX-455c57", "MEX-455c57");
    gateway
        .mock_query(bad, "getFarmingTokenId", &[], &[encode_text("MEX-455c57")])
        .mock_query(bad, "getRewardTokenId", &[], &[encode_text("MEX-455c57")])
        .mock_vm_error(bad, "getFarmTokenIdentifier", "user error", "not initialized");

    let services = create_services(&gateway.url(), &api.url());
    let err = services.getter.farm_staking_groups().await.unwrap_err();
    assert_eq!(err.getter(), Some("farmTokenId"));
}

#[tokio::test]
async fn test_token_lookup_falls_back_to_collection() {
    let gateway = GatewayMockBuilder::new().await;
    let mut api = ApiMockBuilder::new().await;
    api.mock_not_found("/tokens/LKMEX-aab910").mock_collection(&json!({
        "collection": "LKMEX-aab910",
        "type": "MetaESDT",
        "name": "LockedMEX",
        "ticker": "LKMEX",
        "decimals": 18
    }));

    let services = create_services(&gateway.url(), &api.url());
    let token = services.getter.token("LKMEX-aab910").await.unwrap();

    match token {
        StakeToken::Collection(collection) => {
            assert_eq!(collection.kind, "MetaESDT");
            assert_eq!(collection.decimals, Some(18));
        }
        other => panic!("expected a collection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_token_is_none_and_not_cached() {
    let gateway = GatewayMockBuilder::new().await;
    let mut api = ApiMockBuilder::new().await;
    api.mock_not_found("/tokens/NOPE-000000").mock_not_found("/collections/NOPE-000000");

    let services = create_services(&gateway.url(), &api.url());

    assert!(services.getter.token("NOPE-000000").await.is_none());
    assert!(services.getter.token("").await.is_none());
    assert!(services.cache.is_empty());
}

#[tokio::test]
async fn test_token_found_as_fungible() {
    let gateway = GatewayMockBuilder::new().await;
    let mut api = ApiMockBuilder::new().await;
    api.mock_token(&json!({
        "identifier": "RIDE-7d18e9",
        "name": "holoride",
        "ticker": "RIDE",
        "decimals": 18
    }));

    let services = create_services(&gateway.url(), &api.url());
    let token = services.getter.token("RIDE-7d18e9").await.unwrap();
    assert_eq!(token.identifier(), "RIDE-7d18e9");
    assert!(matches!(token, StakeToken::Esdt(_)));
}

#[tokio::test]
async fn test_network_reads_are_cached() {
    let gateway = GatewayMockBuilder::new().await;
    let mut api = ApiMockBuilder::new().await;
    let stats = api.expect_stats(500, 100, 14_400, 6_000, Some(2));
    api.mock_latest_block(1, 8_765_432);

    let services = create_services(&gateway.url(), &api.url());

    // stats and currentEpoch are separate getters, each fetching once
    assert_eq!(services.getter.stats().await.unwrap().rounds_per_epoch, 14_400);
    assert_eq!(services.getter.stats().await.unwrap().epoch, 500);
    assert_eq!(services.getter.current_epoch().await.unwrap(), 500);
    assert_eq!(services.getter.current_epoch().await.unwrap(), 500);
    assert_eq!(services.getter.shard_current_block_nonce(1).await.unwrap(), 8_765_432);

    stats.assert_async().await;
}

#[tokio::test]
async fn test_cache_store_is_usable_through_the_trait() {
    let gateway = GatewayMockBuilder::new().await;
    let api = ApiMockBuilder::new().await;
    let services = create_services(&gateway.url(), &api.url());

    let store: &dyn CacheStore = &services.cache;
    let factory = Box::pin(async { Ok::<_, CacheError>(json!(["MEX"])) });
    let value =
        store.get_or_set("groupIdentifiers", Duration::from_secs(60), factory).await.unwrap();

    assert_eq!(value, json!(["MEX"]));
    assert_eq!(services.cache.peek("groupIdentifiers"), Some(json!(["MEX"])));
}
