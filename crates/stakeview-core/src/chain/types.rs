//! Query and result types shared by the chain client and the query adapter.

use crate::chain::{
    address::Address,
    codec::{self, biguint_to_decimal},
    errors::ChainError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which family of contract an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractRole {
    /// An individual staking farm (child contract).
    Farm,
    /// The router that owns staking groups.
    Router,
    /// A group's vesting contract that issues locked tokens.
    Vesting,
}

impl ContractRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farm => "farm",
            Self::Router => "router",
            Self::Vesting => "vesting",
        }
    }
}

/// A typed query argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryArg {
    /// Unsigned integer given as a decimal string of any width.
    BigUint(String),
    U64(u64),
    Bytes(Vec<u8>),
    Address(Address),
}

impl QueryArg {
    /// Encodes the argument as the hex string expected by the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidArgument`] if a `BigUint` is not a decimal number.
    pub fn to_hex(&self) -> Result<String, ChainError> {
        Ok(match self {
            Self::BigUint(value) => hex::encode(codec::decimal_to_biguint(value)?),
            Self::U64(value) => {
                let bytes = value.to_be_bytes();
                let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
                hex::encode(&bytes[first..])
            }
            Self::Bytes(bytes) => hex::encode(bytes),
            Self::Address(address) => address.to_hex(),
        })
    }
}

/// One read-only query against one contract endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractQuery {
    pub address: Address,
    pub endpoint: String,
    pub args: Vec<QueryArg>,
}

/// Raw VM query output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResponse {
    /// One entry per returned value; an empty vector is an empty (zero/false/None) slot.
    pub return_data: Vec<Vec<u8>>,
    pub return_code: String,
    pub return_message: String,
}

impl QueryResponse {
    #[must_use]
    pub fn ok(return_data: Vec<Vec<u8>>) -> Self {
        Self { return_data, return_code: "ok".to_string(), return_message: String::new() }
    }

    #[must_use]
    pub fn first(&self) -> Option<&[u8]> {
        self.return_data.first().map(Vec::as_slice)
    }
}

/// Lifecycle state of a farm, as reported by the farm itself or by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FarmState {
    Inactive,
    Active,
    PartialActive,
}

impl FarmState {
    #[must_use]
    pub fn from_discriminant(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Inactive),
            1 => Some(Self::Active),
            2 => Some(Self::PartialActive),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Active => "Active",
            Self::PartialActive => "PartialActive",
        }
    }
}

impl fmt::Display for FarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected encoding of an endpoint's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Big unsigned integer rendered as a decimal string.
    Numeric,
    U64,
    Bool,
    Address,
    /// UTF-8 byte string (token identifiers, group identifiers).
    Text,
    /// Unit enum decoded into a [`FarmState`].
    FarmState,
    /// `Option<(TokenIdentifier, BigUint)>`.
    TokenAmountPair,
}

/// Element shape of a variadic result, where every return slot is one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarShape {
    Text,
    Address,
}

/// A decoded result value, tagged by its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Numeric(String),
    U64(u64),
    Bool(bool),
    Address(Address),
    Text(String),
    FarmState(FarmState),
    /// `None` when the contract returned the empty option.
    TokenAmountPair(Option<(String, String)>),
    List(Vec<DecodedValue>),
}

impl DecodedValue {
    /// Decodes a query response according to `shape`.
    ///
    /// Returns `Ok(None)` when the response carries no return slot at all.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Decode`] if a slot does not match the shape.
    pub fn decode(
        endpoint: &str,
        shape: ValueShape,
        response: &QueryResponse,
    ) -> Result<Option<Self>, ChainError> {
        let Some(slot) = response.first() else {
            return Ok(None);
        };

        let value = match shape {
            ValueShape::Numeric => Self::Numeric(biguint_to_decimal(slot)),
            ValueShape::U64 => Self::U64(codec::top_decode_u64(endpoint, slot)?),
            ValueShape::Bool => Self::Bool(codec::top_decode_bool(endpoint, slot)?),
            ValueShape::Address => Self::Address(codec::top_decode_address(endpoint, slot)?),
            ValueShape::Text => Self::Text(codec::top_decode_string(endpoint, slot)?),
            ValueShape::FarmState => {
                let discriminant = codec::top_decode_u64(endpoint, slot)?;
                let state = FarmState::from_discriminant(discriminant).ok_or_else(|| {
                    ChainError::decode(endpoint, format!("unknown state discriminant {discriminant}"))
                })?;
                Self::FarmState(state)
            }
            ValueShape::TokenAmountPair => {
                Self::TokenAmountPair(codec::top_decode_token_amount_pair(endpoint, slot)?)
            }
        };
        Ok(Some(value))
    }

    /// Decodes a variadic response, one element per return slot.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Decode`] if any slot does not match the element shape.
    pub fn decode_many(
        endpoint: &str,
        shape: ScalarShape,
        response: &QueryResponse,
    ) -> Result<Self, ChainError> {
        let items = response
            .return_data
            .iter()
            .map(|slot| Self::decode_scalar(endpoint, shape, slot))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::List(items))
    }

    fn decode_scalar(endpoint: &str, shape: ScalarShape, slot: &[u8]) -> Result<Self, ChainError> {
        match shape {
            ScalarShape::Text => Ok(Self::Text(codec::top_decode_string(endpoint, slot)?)),
            ScalarShape::Address => Ok(Self::Address(codec::top_decode_address(endpoint, slot)?)),
        }
    }

    /// Short category label used in decode errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "numeric",
            Self::U64(_) => "u64",
            Self::Bool(_) => "bool",
            Self::Address(_) => "address",
            Self::Text(_) => "text",
            Self::FarmState(_) => "farm state",
            Self::TokenAmountPair(_) => "token amount pair",
            Self::List(_) => "list",
        }
    }
}
