//! Account and token metadata lookups.

use crate::{
    accounts::models::{EsdtToken, MetaEsdt, NetworkStats, NftCollection},
    chain::{Address, ChainError, HttpClient, HttpClientConfig},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

/// Page size used for account token listings.
const PAGE_SIZE: usize = 10_000;

/// Read-only account, token and network metadata.
///
/// Lookups by identifier return `Ok(None)` when the identifier is unknown.
#[async_trait]
pub trait AccountDataProvider: Send + Sync {
    async fn esdt_token(&self, identifier: &str) -> Result<Option<EsdtToken>, ChainError>;

    async fn nft_collection(&self, identifier: &str) -> Result<Option<NftCollection>, ChainError>;

    /// Native balance of `address`, as a decimal string.
    async fn account_balance(&self, address: &Address) -> Result<String, ChainError>;

    /// Every fungible token `address` holds, in the order the API lists them.
    async fn esdt_tokens(&self, address: &Address) -> Result<Vec<EsdtToken>, ChainError>;

    /// Meta-ESDT positions of `address` restricted to the given collections.
    async fn meta_esdts(
        &self,
        address: &Address,
        collections: &[String],
    ) -> Result<Vec<MetaEsdt>, ChainError>;

    async fn stats(&self) -> Result<NetworkStats, ChainError>;

    async fn current_block_nonce(&self, shard: u32) -> Result<u64, ChainError>;
}

#[derive(Deserialize)]
struct AccountResponse {
    #[serde(default)]
    balance: String,
}

#[derive(Deserialize)]
struct BlockNonce {
    nonce: u64,
}

/// [`AccountDataProvider`] over the public REST API.
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: &str, config: HttpClientConfig) -> Result<Self, ChainError> {
        Ok(Self {
            http: HttpClient::with_config(config)?,
            base_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainError> {
        let url = format!("{}{path}", self.base_url);
        let body = self.http.get(&url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| ChainError::InvalidResponse(format!("{path}: {e}")))
    }

    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ChainError> {
        match self.get_json(path).await {
            Ok(value) => Ok(Some(value)),
            Err(ChainError::HttpError(404, _)) => {
                debug!(path, "resource not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl AccountDataProvider for ApiClient {
    async fn esdt_token(&self, identifier: &str) -> Result<Option<EsdtToken>, ChainError> {
        self.get_optional(&format!("/tokens/{identifier}")).await
    }

    async fn nft_collection(&self, identifier: &str) -> Result<Option<NftCollection>, ChainError> {
        self.get_optional(&format!("/collections/{identifier}")).await
    }

    async fn account_balance(&self, address: &Address) -> Result<String, ChainError> {
        let account: AccountResponse = self.get_json(&format!("/accounts/{address}")).await?;
        Ok(account.balance)
    }

    async fn esdt_tokens(&self, address: &Address) -> Result<Vec<EsdtToken>, ChainError> {
        self.get_json(&format!("/accounts/{address}/tokens?size={PAGE_SIZE}")).await
    }

    async fn meta_esdts(
        &self,
        address: &Address,
        collections: &[String],
    ) -> Result<Vec<MetaEsdt>, ChainError> {
        if collections.is_empty() {
            return Ok(Vec::new());
        }
        let path = format!(
            "/accounts/{address}/nfts?type=MetaESDT&collections={}&size={PAGE_SIZE}",
            collections.join(",")
        );
        self.get_json(&path).await
    }

    async fn stats(&self) -> Result<NetworkStats, ChainError> {
        self.get_json("/stats").await
    }

    async fn current_block_nonce(&self, shard: u32) -> Result<u64, ChainError> {
        let blocks: Vec<BlockNonce> =
            self.get_json(&format!("/blocks?shard={shard}&size=1&fields=nonce")).await?;
        blocks
            .first()
            .map(|block| block.nonce)
            .ok_or_else(|| ChainError::MissingValue(format!("latest block of shard {shard}")))
    }
}
