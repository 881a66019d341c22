//! Mock Infrastructure for Testing Stakeview
//!
//! Reusable mockito-backed servers standing in for the chain gateway and the account
//! API, so the full read path can be exercised without network access.
//!
//! ## Components
//!
//! - `GatewayMockBuilder`: answers `/vm-values/query` per contract and endpoint
//! - `ApiMockBuilder`: answers account, token and network stats lookups
//! - Test helpers for encoding contract values and wiring services
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{GatewayMockBuilder, encode_text};
//!
//! let mut gateway = GatewayMockBuilder::new().await;
//! gateway.mock_query(farm, "getFarmTokenIdentifier", &[], &[encode_text("FARM-abcdef")]);
//!
//! // Use gateway.url() as the proxy URL
//! ```

pub mod gateway_mock;
pub mod test_helpers;

pub use api_mock::ApiMockBuilder;
pub use gateway_mock::GatewayMockBuilder;
pub use test_helpers::*;
