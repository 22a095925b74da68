use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Protocol-wide totals, folded fresh from a batch of market reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolStats {
    /// Sum of escrow over included markets whose escrow read succeeded.
    pub total_volume: Decimal,
    pub active_count: u64,
    pub resolved_count: u64,
    pub total_count: u64,
}
