//! Integration Tests for Stakeview
//!
//! These tests run the real gateway and API clients against mockito servers, so every
//! read goes through HTTP, JSON decoding, the cache store and the aggregation layer.
//!
//! - `gateway_tests`: VM query wire format, error mapping and value decoding
//! - `getter_tests`: cache-aside behavior of the staking getters
//! - `accounts_tests`: account token, farm position and locked token views
//! - `mock_infrastructure`: reusable gateway and API mocks plus fixtures
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```


#[cfg(test)]
mod getter_tests;


/// Mock infrastructure for testing
pub mod mock_infrastructure;
