//! Chain gateway client: executes read-only VM queries against smart contracts.

use crate::chain::{
    http_client::{HttpClient, HttpClientConfig},
    types::{ContractQuery, QueryResponse},
    ChainError,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Executes one read-only query against a smart contract.
///
/// This is the seam between the query adapter and the network. Implementations must
/// not cache; caching happens a layer above.
#[async_trait]
pub trait SmartContractQuery: Send + Sync {
    async fn query(&self, query: &ContractQuery) -> Result<QueryResponse, ChainError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VmQueryRequest<'a> {
    sc_address: String,
    func_name: &'a str,
    args: Vec<String>,
}

#[derive(Deserialize)]
struct GatewayEnvelope {
    data: Option<VmQueryEnvelope>,
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: String,
}

#[derive(Deserialize)]
struct VmQueryEnvelope {
    data: VmOutput,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VmOutput {
    #[serde(default)]
    return_data: Option<Vec<Option<String>>>,
    #[serde(default)]
    return_code: String,
    #[serde(default)]
    return_message: String,
}

/// [`SmartContractQuery`] over the gateway's `/vm-values/query` endpoint.
pub struct GatewayClient {
    http: HttpClient,
    query_url: String,
}

impl GatewayClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(proxy_url: &str, config: HttpClientConfig) -> Result<Self, ChainError> {
        Ok(Self {
            http: HttpClient::with_config(config)?,
            query_url: format!("{}/vm-values/query", proxy_url.trim_end_matches('/')),
        })
    }

    fn parse_response(endpoint: &str, body: &[u8]) -> Result<QueryResponse, ChainError> {
        let envelope: GatewayEnvelope = serde_json::from_slice(body)
            .map_err(|e| ChainError::InvalidResponse(format!("{endpoint}: {e}")))?;

        let Some(output) = envelope.data.map(|d| d.data) else {
            return Err(ChainError::InvalidResponse(format!(
                "{endpoint}: missing data (code '{}', error '{}')",
                envelope.code, envelope.error
            )));
        };

        if output.return_code != "ok" {
            return Err(ChainError::QueryFailed {
                endpoint: endpoint.to_string(),
                code: output.return_code,
                message: output.return_message,
            });
        }

        let return_data = output
            .return_data
            .unwrap_or_default()
            .into_iter()
            .map(|slot| match slot {
                None => Ok(Vec::new()),
                Some(encoded) => BASE64.decode(encoded).map_err(|e| {
                    ChainError::InvalidResponse(format!("{endpoint}: invalid base64 slot: {e}"))
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResponse {
            return_data,
            return_code: output.return_code,
            return_message: output.return_message,
        })
    }
}

#[async_trait]
impl SmartContractQuery for GatewayClient {
    async fn query(&self, query: &ContractQuery) -> Result<QueryResponse, ChainError> {
        let args = query.args.iter().map(|arg| arg.to_hex()).collect::<Result<Vec<_>, _>>()?;
        let request = VmQueryRequest {
            sc_address: query.address.to_bech32(),
            func_name: &query.endpoint,
            args,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| ChainError::InvalidArgument(format!("{}: {e}", query.endpoint)))?;

        trace!(endpoint = %query.endpoint, contract = %query.address, "vm query started");
        let response = self.http.post_json(&self.query_url, bytes::Bytes::from(body)).await?;
        let parsed = Self::parse_response(&query.endpoint, &response)?;
        debug!(
            endpoint = %query.endpoint,
            contract = %query.address,
            slots = parsed.return_data.len(),
            "vm query completed"
        );
        Ok(parsed)
    }
}
