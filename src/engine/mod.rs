pub mod aggregator;
pub mod catalog;
pub mod lifecycle;
pub mod pricer;
pub mod projector;
pub mod settlement;

pub use aggregator::aggregate;
pub use catalog::{filter_markets, time_left};
pub use lifecycle::{can_resolve, classify};
pub use pricer::{price_after_buy, price_impact_pct, quote_buy, yes_price, BuyQuote};
pub use projector::{summarize, Projection};
pub use settlement::{can_claim, preview, value_position, PayoutBasis, SettlementPreview};
