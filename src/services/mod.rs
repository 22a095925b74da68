pub mod market_view;
pub mod snapshot;

pub use market_view::{read_balances, read_market_view, read_supplies, summarize_markets, MarketSummary, MarketView};
pub use snapshot::{read_batch, read_batch_or_empty};
