//! Binary codec for VM query arguments and return data.
//!
//! Return slots are *top-encoded*: a value occupies the whole slot, so big integers
//! are minimal big-endian bytes and `false`/`0`/`None` are empty slots. Values inside
//! composites are *nested-encoded*: fixed-width integers, and length-prefixed (`u32`
//! big-endian) byte strings and big integers.

use crate::chain::{address::Address, errors::ChainError};
use num_bigint::BigUint;
use std::str::FromStr;

/// Converts an arbitrary-width big-endian unsigned integer to its decimal string.
#[must_use]
pub fn biguint_to_decimal(bytes: &[u8]) -> String {
    BigUint::from_bytes_be(bytes).to_string()
}

/// Converts a decimal string to minimal big-endian bytes (empty for zero).
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] when the string is empty or not all digits.
pub fn decimal_to_biguint(value: &str) -> Result<Vec<u8>, ChainError> {
    let invalid = || ChainError::InvalidArgument(format!("'{value}' is not an unsigned integer"));

    // FromStr also accepts a sign and `_` separators
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let number = BigUint::from_str(value).map_err(|_| invalid())?;
    if number.bits() == 0 {
        return Ok(Vec::new());
    }
    Ok(number.to_bytes_be())
}

/// Returns `true` if a decimal amount string is absent, empty or zero.
#[must_use]
pub fn is_zero_amount(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().trim_start_matches('0').is_empty())
}

pub(crate) fn top_decode_u64(endpoint: &str, bytes: &[u8]) -> Result<u64, ChainError> {
    if bytes.len() > 8 {
        return Err(ChainError::decode(endpoint, format!("{} bytes do not fit u64", bytes.len())));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

pub(crate) fn top_decode_bool(endpoint: &str, bytes: &[u8]) -> Result<bool, ChainError> {
    match bytes {
        [] => Ok(false),
        [1] => Ok(true),
        other => Err(ChainError::decode(endpoint, format!("invalid bool encoding {other:02x?}"))),
    }
}

pub(crate) fn top_decode_string(endpoint: &str, bytes: &[u8]) -> Result<String, ChainError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ChainError::decode(endpoint, format!("invalid utf-8: {e}")))
}

pub(crate) fn top_decode_address(endpoint: &str, bytes: &[u8]) -> Result<Address, ChainError> {
    Address::from_slice(bytes).map_err(|e| ChainError::decode(endpoint, e.to_string()))
}

/// Cursor over nested-encoded data.
#[derive(Debug)]
pub struct NestedReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> NestedReader<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads exactly `len` raw bytes.
    pub fn read_exact(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        let slice = self.bytes.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_exact(1).map(|b| b[0])
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        let bytes: [u8; 4] = self.read_exact(4)?.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        let bytes: [u8; 8] = self.read_exact(8)?.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }

    /// Reads a `u32`-length-prefixed byte string.
    pub fn read_len_prefixed(&mut self) -> Option<&'a [u8]> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        self.read_exact(len)
    }

    /// Reads a `u32`-length-prefixed big unsigned integer as a decimal string.
    pub fn read_biguint(&mut self) -> Option<String> {
        self.read_len_prefixed().map(biguint_to_decimal)
    }
}

/// Decodes a top-encoded `Option<(TokenIdentifier, BigUint)>`.
///
/// Returns `None` for an empty slot (the `None` variant).
pub(crate) fn top_decode_token_amount_pair(
    endpoint: &str,
    bytes: &[u8],
) -> Result<Option<(String, String)>, ChainError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let mut reader = NestedReader::new(bytes);
    match reader.read_u8() {
        Some(0) if reader.is_empty() => return Ok(None),
        Some(1) => {}
        _ => return Err(ChainError::decode(endpoint, "invalid option discriminant")),
    }

    let token = reader
        .read_len_prefixed()
        .ok_or_else(|| ChainError::decode(endpoint, "truncated token identifier"))?;
    let token = top_decode_string(endpoint, token)?;
    let amount =
        reader.read_biguint().ok_or_else(|| ChainError::decode(endpoint, "truncated amount"))?;

    if !reader.is_empty() {
        return Err(ChainError::decode(endpoint, "trailing bytes after pair"));
    }
    Ok(Some((token, amount)))
}
