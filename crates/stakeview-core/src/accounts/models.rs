use serde::{Deserialize, Serialize};

/// Branding and pricing metadata the API attaches to a token or collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_url: Option<String>,
}

/// A fungible token, optionally with the balance an account holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsdtToken {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<TokenAssets>,
}

/// An NFT, SFT or meta-ESDT collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCollection {
    pub collection: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<TokenAssets>,
}

/// Result of a token lookup that accepts either a token id or a collection id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StakeToken {
    Esdt(EsdtToken),
    Collection(NftCollection),
}

impl StakeToken {
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Esdt(token) => &token.identifier,
            Self::Collection(collection) => &collection.collection,
        }
    }
}

/// A meta-ESDT position held by an account, with its raw attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaEsdt {
    pub identifier: String,
    pub collection: String,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(default)]
    pub decimals: u32,
    /// Base64 attribute blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<TokenAssets>,
}

/// Network-wide counters needed to turn epochs into wall-clock time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub epoch: u64,
    pub rounds_passed: u64,
    pub rounds_per_epoch: u64,
    /// Round duration in milliseconds.
    pub refresh_rate: u64,
}

/// One step of a locked token's unlock schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockMilestone {
    pub epoch: u64,
    /// Share unlocked at this milestone, in the precision of the attribute layout.
    pub percent: u64,
    /// Human-readable unlock time, filled in by the locked-token aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedToken {
    pub identifier: String,
    pub collection: String,
    pub ticker: String,
    pub name: String,
    pub nonce: u64,
    pub balance: String,
    pub decimals: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<TokenAssets>,
    pub unlock_schedule: Vec<UnlockMilestone>,
}

/// Locked tokens of one collection, in the order they were scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedTokenCollection {
    pub collection: String,
    pub tokens: Vec<LockedToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub address: String,
    pub egld_balance: String,
}
