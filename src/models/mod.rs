pub mod chart;
pub mod market;
pub mod position;
pub mod stats;

pub use chart::{ChartSummary, PricePoint, Timeframe, CURRENT_LABEL};
pub use market::{LifecycleState, MarketId, MarketRecord, Outcome, SupplyPair};
pub use position::WalletBalances;
pub use stats::ProtocolStats;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ReadError;

// ---------------------------------------------------------------------------
// Batch read elements
// ---------------------------------------------------------------------------

/// Outcome of reading one market slot and its escrow.
///
/// The two reads are independent: a record can succeed while the escrow read
/// fails, and each is consumed field by field.
#[derive(Debug)]
pub struct MarketRead {
    pub id: MarketId,
    pub record: Result<MarketRecord, ReadError>,
    pub escrow: Result<Decimal, ReadError>,
}

impl MarketRead {
    /// The record, if it was read and the slot exists.
    pub fn existing_record(&self) -> Option<&MarketRecord> {
        self.record.as_ref().ok().filter(|r| r.exists)
    }

    pub fn escrow_value(&self) -> Option<Decimal> {
        self.escrow.as_ref().ok().copied()
    }
}

// ---------------------------------------------------------------------------
// Listing filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketFilter {
    #[default]
    All,
    Active,
    Resolved,
}

impl MarketFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(MarketFilter::All),
            "active" => Some(MarketFilter::Active),
            "resolved" => Some(MarketFilter::Resolved),
            _ => None,
        }
    }
}
