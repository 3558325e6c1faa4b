// Prize Tier History
//
// Prize distribution parameters keyed by the first draw they apply to.

use serde::{Deserialize, Serialize};

use super::{ClientError, HistoryClient};
use crate::config::LedgerConfig;
use crate::guard::AuthorizationGuard;
use crate::history::Record;
use crate::search::DrawId;

/// Number of prize tiers in a distribution.
pub const TIER_COUNT: usize = 16;

/// Prize parameters in effect from `draw_id` until the next tier.
///
/// Fields other than `draw_id` are carried as an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeTier {
    pub draw_id: DrawId,
    pub bit_range_size: u8,
    pub max_picks_per_user: u32,
    pub expiry_duration: u32,
    pub end_timestamp_offset: u32,
    pub prize: u128,
    /// Draw percentage rate, scaled by 1e9.
    pub dpr: u32,
    pub tiers: [u32; TIER_COUNT],
}

impl Record for PrizeTier {
    fn id(&self) -> DrawId {
        self.draw_id
    }
}

pub type PrizeTierHistory<G> = HistoryClient<PrizeTier, G>;

impl<G: AuthorizationGuard> HistoryClient<PrizeTier, G> {
    /// Prize tier ledger with the built-in policy.
    pub fn prize_tiers(guard: G, timeline: Vec<PrizeTier>) -> Result<Self, ClientError> {
        Self::from_config("prize-tiers", guard, &LedgerConfig::prize_tiers(), timeline)
    }
}
