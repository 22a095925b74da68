use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A connected account's holdings of one market's YES and NO tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalances {
    pub account: String,
    pub yes: Decimal,
    pub no: Decimal,
}
