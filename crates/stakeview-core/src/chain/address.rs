//! Account and contract addresses.
//!
//! Addresses are 32-byte public keys. They travel over the wire as hex (query arguments)
//! or raw bytes (return data) and are shown to users in bech32 form with the `erd` prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Human-readable part of every bech32 address on the chain.
pub const ADDRESS_HRP: &str = "erd";

/// Length of an address public key in bytes.
pub const ADDRESS_LEN: usize = 32;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const GENERATOR: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];
const CHECKSUM_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address has no separator")]
    MissingSeparator,

    #[error("unexpected address prefix '{0}'")]
    InvalidPrefix(String),

    #[error("invalid bech32 character '{0}'")]
    InvalidCharacter(char),

    #[error("bech32 checksum mismatch")]
    InvalidChecksum,

    #[error("mixed-case bech32 string")]
    MixedCase,

    #[error("invalid padding in bech32 data")]
    InvalidPadding,

    #[error("address must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex address: {0}")]
    InvalidHex(String),
}

/// A 32-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    #[must_use]
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// The all-zero address.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0; ADDRESS_LEN])
    }

    /// Builds an address from a raw byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidLength`] unless the slice is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let array: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| AddressError::InvalidLength {
            expected: ADDRESS_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Parses a hex-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns an error for non-hex input or a key of the wrong length.
    pub fn from_hex(value: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(value).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Parses a bech32 address with the `erd` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error for a wrong prefix, bad checksum, bad characters or wrong length.
    pub fn from_bech32(value: &str) -> Result<Self, AddressError> {
        let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            return Err(AddressError::MixedCase);
        }
        let value = value.to_ascii_lowercase();

        let separator = value.rfind('1').ok_or(AddressError::MissingSeparator)?;
        let (hrp, rest) = value.split_at(separator);
        if hrp != ADDRESS_HRP {
            return Err(AddressError::InvalidPrefix(hrp.to_string()));
        }

        let mut data = Vec::with_capacity(rest.len());
        for c in rest[1..].chars() {
            let position = CHARSET
                .iter()
                .position(|&b| char::from(b) == c)
                .ok_or(AddressError::InvalidCharacter(c))?;
            #[allow(clippy::cast_possible_truncation)]
            data.push(position as u8);
        }
        if data.len() < CHECKSUM_LEN {
            return Err(AddressError::InvalidChecksum);
        }

        let mut values = hrp_expand(hrp);
        values.extend_from_slice(&data);
        if polymod(&values) != 1 {
            return Err(AddressError::InvalidChecksum);
        }

        data.truncate(data.len() - CHECKSUM_LEN);
        let bytes = convert_bits(&data, 5, 8, false)?;
        Self::from_slice(&bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    #[must_use]
    pub fn to_bech32(&self) -> String {
        // 8-to-5 regrouping with padding cannot fail
        let data = convert_bits(&self.0, 8, 5, true).unwrap_or_default();

        let mut values = hrp_expand(ADDRESS_HRP);
        values.extend_from_slice(&data);
        values.extend_from_slice(&[0; CHECKSUM_LEN]);
        let checksum = polymod(&values) ^ 1;

        let mut out = String::with_capacity(ADDRESS_HRP.len() + 1 + data.len() + CHECKSUM_LEN);
        out.push_str(ADDRESS_HRP);
        out.push('1');
        for value in data {
            out.push(char::from(CHARSET[usize::from(value)]));
        }
        for i in 0..CHECKSUM_LEN {
            let index = (checksum >> (5 * (5 - i))) & 31;
            out.push(char::from(CHARSET[index as usize]));
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_bech32(&value).map_err(serde::de::Error::custom)
    }
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut out: Vec<u8> = hrp.bytes().map(|b| b >> 5).collect();
    out.push(0);
    out.extend(hrp.bytes().map(|b| b & 31));
    out
}

fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, AddressError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value: u32 = (1 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        acc = (acc << from) | u32::from(value);
        bits += from;
        while bits >= to {
            bits -= to;
            #[allow(clippy::cast_possible_truncation)]
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            #[allow(clippy::cast_possible_truncation)]
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return Err(AddressError::InvalidPadding);
    }

    Ok(out)
}
