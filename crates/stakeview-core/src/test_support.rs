//! In-memory collaborators for unit tests.

use crate::{
    accounts::{
        models::{EsdtToken, MetaEsdt, NetworkStats, NftCollection},
        provider::AccountDataProvider,
    },
    chain::{Address, ChainError, ContractQuery, QueryArg, QueryResponse, SmartContractQuery},
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex};

type ResponseKey = (Address, String, Vec<String>);

fn args_key(args: &[QueryArg]) -> Vec<String> {
    args.iter().map(|arg| arg.to_hex().expect("test args encode")).collect()
}

fn group_arg(group_id: &str) -> Vec<QueryArg> {
    vec![QueryArg::Bytes(group_id.as_bytes().to_vec())]
}

/// Contract endpoints answering from a table, counting every query.
///
/// Responses registered without arguments answer any call to that endpoint unless a
/// response for the exact arguments exists.
#[derive(Default)]
pub(crate) struct FakeChain {
    responses: Mutex<HashMap<ResponseKey, Option<Vec<Vec<u8>>>>>,
    queries: Mutex<Vec<ContractQuery>>,
    groups: Mutex<Vec<String>>,
}

impl FakeChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn router() -> Address {
        Address::new([0xaa; 32])
    }

    pub(crate) fn respond(&self, address: Address, endpoint: &str, data: Vec<Vec<u8>>) {
        self.respond_with_args(address, endpoint, &[], data);
    }

    pub(crate) fn respond_with_args(
        &self,
        address: Address,
        endpoint: &str,
        args: &[QueryArg],
        data: Vec<Vec<u8>>,
    ) {
        let key = (address, endpoint.to_string(), args_key(args));
        self.responses.lock().unwrap().insert(key, Some(data));
    }

    pub(crate) fn fail(&self, address: Address, endpoint: &str) {
        self.fail_with_args(address, endpoint, &[]);
    }

    pub(crate) fn fail_with_args(&self, address: Address, endpoint: &str, args: &[QueryArg]) {
        let key = (address, endpoint.to_string(), args_key(args));
        self.responses.lock().unwrap().insert(key, None);
    }

    /// Registers a farm answering every getter the farm summary reads.
    pub(crate) fn install_farm(
        &self,
        farm: Address,
        farm_token: &str,
        farming_token: &str,
        reward_token: &str,
    ) {
        self.respond(farm, "getFarmTokenIdentifier", vec![farm_token.as_bytes().to_vec()]);
        self.respond(farm, "getFarmingTokenId", vec![farming_token.as_bytes().to_vec()]);
        self.respond(farm, "getRewardTokenId", vec![reward_token.as_bytes().to_vec()]);
        self.respond(farm, "getState", vec![vec![1]]);
        self.respond(farm, "getFarmTokenSupply", vec![vec![0x03, 0xe8]]);
        self.respond(farm, "getAnnualPercentageRewards", vec![vec![0x0a]]);
        self.respond(farm, "getPerBlockRewardAmount", vec![vec![0x64]]);
        self.respond(farm, "getLastRewardBlockNonce", vec![vec![0x01, 0x00]]);
        self.respond(farm, "getUndistributedFees", vec![vec![]]);
        self.respond(farm, "getCurrentBlockFee", vec![]);
        self.respond(farm, "getDivisionSafetyConstant", vec![vec![0x0f, 0x42, 0x40]]);
        self.respond(farm, "getRewardPerShare", vec![vec![0x02]]);
        self.respond(farm, "isProduceRewardsEnabled", vec![]);
        self.respond(farm, "areRewardsLocked", vec![vec![]]);
    }

    /// Registers a router group with the given `(address, farm token, farming token,
    /// reward token)` children.
    pub(crate) fn install_group(&self, group_id: &str, children: &[(Address, &str, &str, &str)]) {
        let groups = {
            let mut groups = self.groups.lock().unwrap();
            groups.push(group_id.to_string());
            groups.iter().map(|g| g.as_bytes().to_vec()).collect()
        };
        self.respond(Self::router(), "getGroupIdentifiers", groups);

        let addresses = children.iter().map(|(address, ..)| address.as_bytes().to_vec()).collect();
        self.respond_with_args(
            Self::router(),
            "getAddressesByGroupIdentifier",
            &group_arg(group_id),
            addresses,
        );

        for (address, farm_token, farming_token, reward_token) in children {
            self.install_farm(*address, farm_token, farming_token, reward_token);
        }
    }

    /// Points a group at a vesting contract issuing `token_id`.
    pub(crate) fn install_vesting(&self, group_id: &str, vesting: Address, token_id: &str) {
        self.respond_with_args(
            Self::router(),
            "getVestingAddressByGroupIdentifier",
            &group_arg(group_id),
            vec![vesting.as_bytes().to_vec()],
        );
        self.respond(vesting, "getLockedAssetTokenId", vec![token_id.as_bytes().to_vec()]);
    }

    pub(crate) fn fail_vesting(&self, group_id: &str) {
        self.fail_with_args(
            Self::router(),
            "getVestingAddressByGroupIdentifier",
            &group_arg(group_id),
        );
    }

    pub(crate) fn queries(&self) -> Vec<ContractQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self, endpoint: &str) -> usize {
        self.queries.lock().unwrap().iter().filter(|q| q.endpoint == endpoint).count()
    }
}

#[async_trait]
impl SmartContractQuery for FakeChain {
    async fn query(&self, query: &ContractQuery) -> Result<QueryResponse, ChainError> {
        self.queries.lock().unwrap().push(query.clone());

        let responses = self.responses.lock().unwrap();
        let exact = (query.address, query.endpoint.clone(), args_key(&query.args));
        let any = (query.address, query.endpoint.clone(), Vec::new());
        match responses.get(&exact).or_else(|| responses.get(&any)) {
            Some(Some(data)) => Ok(QueryResponse::ok(data.clone())),
            Some(None) => Err(ChainError::QueryFailed {
                endpoint: query.endpoint.clone(),
                code: "user error".into(),
                message: "execution failed".into(),
            }),
            None => Err(ChainError::QueryFailed {
                endpoint: query.endpoint.clone(),
                code: "function not found".into(),
                message: format!("no response registered for {}", query.endpoint),
            }),
        }
    }
}

/// Account data served from memory, counting every lookup.
#[derive(Default)]
pub(crate) struct FakeProvider {
    tokens: Mutex<HashMap<String, EsdtToken>>,
    collections: Mutex<HashMap<String, NftCollection>>,
    balances: Mutex<HashMap<Address, String>>,
    holdings: Mutex<HashMap<Address, Vec<EsdtToken>>>,
    metas: Mutex<HashMap<Address, Vec<MetaEsdt>>>,
    stats: Mutex<NetworkStats>,
    fail_lookups: Mutex<bool>,
    calls: Mutex<HashMap<&'static str, usize>>,
    meta_requests: Mutex<Vec<Vec<String>>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &'static str) {
        *self.calls.lock().unwrap().entry(call).or_default() += 1;
    }

    pub(crate) fn calls(&self, call: &str) -> usize {
        self.calls.lock().unwrap().get(call).copied().unwrap_or_default()
    }

    pub(crate) fn add_token(&self, token: EsdtToken) {
        self.tokens.lock().unwrap().insert(token.identifier.clone(), token);
    }

    pub(crate) fn add_collection(&self, collection: NftCollection) {
        self.collections.lock().unwrap().insert(collection.collection.clone(), collection);
    }

    pub(crate) fn set_balance(&self, address: Address, balance: &str) {
        self.balances.lock().unwrap().insert(address, balance.to_string());
    }

    pub(crate) fn set_holdings(&self, address: Address, tokens: Vec<EsdtToken>) {
        self.holdings.lock().unwrap().insert(address, tokens);
    }

    pub(crate) fn set_metas(&self, address: Address, metas: Vec<MetaEsdt>) {
        self.metas.lock().unwrap().insert(address, metas);
    }

    pub(crate) fn set_stats(&self, stats: NetworkStats) {
        *self.stats.lock().unwrap() = stats;
    }

    pub(crate) fn fail_lookups(&self) {
        *self.fail_lookups.lock().unwrap() = true;
    }

    /// Collection filters passed to every `meta_esdts` call, in call order.
    pub(crate) fn meta_requests(&self) -> Vec<Vec<String>> {
        self.meta_requests.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), ChainError> {
        if *self.fail_lookups.lock().unwrap() {
            return Err(ChainError::HttpError(503, "unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountDataProvider for FakeProvider {
    async fn esdt_token(&self, identifier: &str) -> Result<Option<EsdtToken>, ChainError> {
        self.record("esdt_token");
        self.check_failure()?;
        Ok(self.tokens.lock().unwrap().get(identifier).cloned())
    }

    async fn nft_collection(&self, identifier: &str) -> Result<Option<NftCollection>, ChainError> {
        self.record("nft_collection");
        self.check_failure()?;
        Ok(self.collections.lock().unwrap().get(identifier).cloned())
    }

    async fn account_balance(&self, address: &Address) -> Result<String, ChainError> {
        self.record("account_balance");
        self.check_failure()?;
        Ok(self.balances.lock().unwrap().get(address).cloned().unwrap_or_else(|| "0".into()))
    }

    async fn esdt_tokens(&self, address: &Address) -> Result<Vec<EsdtToken>, ChainError> {
        self.record("esdt_tokens");
        self.check_failure()?;
        Ok(self.holdings.lock().unwrap().get(address).cloned().unwrap_or_default())
    }

    async fn meta_esdts(
        &self,
        address: &Address,
        collections: &[String],
    ) -> Result<Vec<MetaEsdt>, ChainError> {
        self.record("meta_esdts");
        self.meta_requests.lock().unwrap().push(collections.to_vec());
        self.check_failure()?;
        let metas = self.metas.lock().unwrap().get(address).cloned().unwrap_or_default();
        Ok(metas
            .into_iter()
            .filter(|meta| {
                collections.iter().any(|c| meta.collection == *c || meta.collection.starts_with(c))
            })
            .collect())
    }

    async fn stats(&self) -> Result<NetworkStats, ChainError> {
        self.record("stats");
        self.check_failure()?;
        Ok(*self.stats.lock().unwrap())
    }

    async fn current_block_nonce(&self, shard: u32) -> Result<u64, ChainError> {
        self.record("current_block_nonce");
        self.check_failure()?;
        Ok(1_000 + u64::from(shard))
    }
}
