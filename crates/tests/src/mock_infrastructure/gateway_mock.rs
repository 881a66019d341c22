//! Gateway Mock Builder for VM Query Testing
//!
//! Wraps mockito to answer `POST /vm-values/query` for a given contract and endpoint.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use stakeview_core::chain::Address;

const QUERY_PATH: &str = "/vm-values/query";

/// Builder for mock gateway query responses.
///
/// Matching is on the JSON body: contract address, function name and, when given, the
/// hex-encoded arguments.
pub struct GatewayMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl GatewayMockBuilder {
    /// Creates a new gateway mock builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    fn body_matcher(address: Address, func: &str, args: &[String]) -> Matcher {
        let mut expected = json!({ "scAddress": address.to_bech32(), "funcName": func });
        if !args.is_empty() {
            expected["args"] = json!(args);
        }
        Matcher::PartialJson(expected)
    }

    fn ok_body(return_data: &[Vec<u8>]) -> String {
        let encoded: Vec<Value> =
            return_data.iter().map(|slot| Value::String(BASE64.encode(slot))).collect();
        json!({
            "data": {
                "data": {
                    "returnData": encoded,
                    "returnCode": "ok",
                    "returnMessage": ""
                }
            },
            "error": "",
            "code": "successful"
        })
        .to_string()
    }

    /// Mocks a successful query returning `return_data` slots.
    pub fn mock_query(
        &mut self,
        address: Address,
        func: &str,
        args: &[String],
        return_data: &[Vec<u8>],
    ) -> &mut Self {
        let mock = self.expect_query(address, func, args, return_data, None);
        self.mocks.push(mock);
        self
    }

    /// Mocks a successful query and returns the mock for hit-count assertions.
    ///
    /// With `hits` set, the mock expects exactly that many calls.
    pub fn expect_query(
        &mut self,
        address: Address,
        func: &str,
        args: &[String],
        return_data: &[Vec<u8>],
        hits: Option<usize>,
    ) -> Mock {
        let mut mock = self
            .server
            .mock("POST", QUERY_PATH)
            .match_body(Self::body_matcher(address, func, args))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(Self::ok_body(return_data));
        if let Some(hits) = hits {
            mock = mock.expect(hits);
        }
        mock.create()
    }

    /// Mocks a query the VM rejects with `return_code`.
    pub fn mock_vm_error(
        &mut self,
        address: Address,
        func: &str,
        return_code: &str,
        message: &str,
    ) -> &mut Self {
        self.mock_vm_error_with_args(address, func, &[], return_code, message)
    }

    /// Mocks a VM rejection for one argument list only.
    pub fn mock_vm_error_with_args(
        &mut self,
        address: Address,
        func: &str,
        args: &[String],
        return_code: &str,
        message: &str,
    ) -> &mut Self {
        let mock = self
            .server
            .mock("POST", QUERY_PATH)
            .match_body(Self::body_matcher(address, func, args))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": {
                        "data": {
                            "returnData": null,
                            "returnCode": return_code,
                            "returnMessage": message
                        }
                    },
                    "error": "",
                    "code": "successful"
                })
                .to_string(),
            )
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks a gateway-level HTTP failure for one endpoint.
    pub fn mock_http_error(&mut self, address: Address, func: &str, status: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", QUERY_PATH)
            .match_body(Self::body_matcher(address, func, &[]))
            .with_status(status)
            .with_body(
                json!({ "data": null, "error": "unavailable", "code": "internal_issue" })
                    .to_string(),
            )
            .create();

        self.mocks.push(mock);
        self
    }
}
