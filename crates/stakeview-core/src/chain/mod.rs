//! Chain access: addresses, the VM value codec, and the gateway query client.
//!
//! Everything here is a thin, uncached boundary. The query adapter in
//! [`crate::staking::abi`] builds [`ContractQuery`] values, sends them through a
//! [`SmartContractQuery`] implementation, and decodes the [`QueryResponse`] into a
//! [`DecodedValue`].

pub mod address;
pub mod codec;
pub mod errors;
pub mod gateway;
pub mod http_client;
pub mod types;

pub use address::{Address, AddressError};
pub use errors::ChainError;
pub use gateway::{GatewayClient, SmartContractQuery};
pub use http_client::{HttpClient, HttpClientConfig};
pub use types::{
    ContractQuery, ContractRole, DecodedValue, FarmState, QueryArg, QueryResponse, ScalarShape,
    ValueShape,
};
