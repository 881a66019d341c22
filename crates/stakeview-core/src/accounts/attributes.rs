//! Decoding of locked asset attributes into an unlock schedule.
//!
//! Layout (nested encoding, big-endian):
//!
//! ```text
//! u32 milestone count
//! per milestone: u64 unlock epoch, then u64 percent (extended) or u8 percent (legacy)
//! optional trailing u8 is_merged flag
//! ```

use crate::{accounts::models::UnlockMilestone, chain::codec::NestedReader};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

const EXTENDED_MILESTONE_LEN: usize = 16;
const LEGACY_MILESTONE_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PercentWidth {
    U64,
    U8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedAssetAttributes {
    pub unlock_schedule: Vec<UnlockMilestone>,
    pub is_merged: bool,
}

impl LockedAssetAttributes {
    /// Decodes a base64 attribute blob. Returns `None` when the blob is not a schedule.
    #[must_use]
    pub fn from_base64(attributes: &str) -> Option<Self> {
        let bytes = BASE64.decode(attributes).ok()?;
        Self::from_bytes(&bytes)
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut reader = NestedReader::new(bytes);
        let count = usize::try_from(reader.read_u32()?).ok()?;
        let body = reader.remaining();

        let width = if fits(body, count, EXTENDED_MILESTONE_LEN) {
            PercentWidth::U64
        } else if fits(body, count, LEGACY_MILESTONE_LEN) {
            PercentWidth::U8
        } else {
            return None;
        };

        let mut unlock_schedule = Vec::with_capacity(count);
        for _ in 0..count {
            let epoch = reader.read_u64()?;
            let percent = match width {
                PercentWidth::U64 => reader.read_u64()?,
                PercentWidth::U8 => u64::from(reader.read_u8()?),
            };
            unlock_schedule.push(UnlockMilestone { epoch, percent, unlock_date: None });
        }

        let is_merged = match reader.read_u8() {
            None => false,
            Some(0) => false,
            Some(1) => true,
            Some(_) => return None,
        };

        Some(Self { unlock_schedule, is_merged })
    }
}

/// Whether `body` bytes hold exactly `count` milestones of `width` bytes, with or without
/// the trailing merge flag.
fn fits(body: usize, count: usize, width: usize) -> bool {
    count
        .checked_mul(width)
        .is_some_and(|milestones| body == milestones || body == milestones + 1)
}
