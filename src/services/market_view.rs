use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::chain::MarketReader;
use crate::engine::{classify, time_left, yes_price};
use crate::errors::ReadError;
use crate::models::{LifecycleState, MarketId, MarketRecord, SupplyPair, WalletBalances};

/// One market as shown in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    pub id: MarketId,
    pub question: String,
    pub owner: String,
    pub deadline: DateTime<Utc>,
    pub state: LifecycleState,
    pub time_left: String,
    pub yes_price: Decimal,
}

/// A single market with its supplies and escrow.
#[derive(Debug, Clone)]
pub struct MarketView {
    pub record: MarketRecord,
    pub state: LifecycleState,
    pub supply: SupplyPair,
    pub escrow: Decimal,
    /// Set when the escrow read failed and the YES supply stands in for it.
    pub escrow_estimated: bool,
}

/// Load one market. `Ok(None)` for a slot that was never created.
///
/// The record read must succeed; supply and escrow reads degrade instead of
/// failing the view.
pub async fn read_market_view(
    reader: &dyn MarketReader,
    id: MarketId,
    now: DateTime<Utc>,
) -> Result<Option<MarketView>, ReadError> {
    let record = reader.market(id).await?;
    if !record.exists {
        return Ok(None);
    }

    let (supply, escrow) = tokio::join!(read_supplies(reader, &record), reader.escrow(id));

    // One YES token is minted per unit paid in, so YES supply tracks escrow
    let (escrow, escrow_estimated) = match escrow {
        Ok(escrow) => (escrow, false),
        Err(e) => {
            tracing::warn!(market_id = id, error = %e, "Escrow read failed, using YES supply");
            (supply.yes, true)
        }
    };

    Ok(Some(MarketView {
        state: classify(&record, now),
        record,
        supply,
        escrow,
        escrow_estimated,
    }))
}

/// Read both token supplies; an unreadable side counts as zero.
pub async fn read_supplies(reader: &dyn MarketReader, record: &MarketRecord) -> SupplyPair {
    let (yes, no) = tokio::join!(
        reader.total_supply(&record.yes_token),
        reader.total_supply(&record.no_token)
    );

    SupplyPair::new(
        or_zero(yes, record.id, "yes_supply"),
        or_zero(no, record.id, "no_supply"),
    )
}

/// Read `account`'s YES and NO balances; an unreadable side counts as zero.
pub async fn read_balances(
    reader: &dyn MarketReader,
    record: &MarketRecord,
    account: &str,
) -> WalletBalances {
    let (yes, no) = tokio::join!(
        reader.balance_of(&record.yes_token, account),
        reader.balance_of(&record.no_token, account)
    );

    WalletBalances {
        account: account.to_string(),
        yes: or_zero(yes, record.id, "yes_balance"),
        no: or_zero(no, record.id, "no_balance"),
    }
}

/// Listing rows for `records`, reading supplies with bounded concurrency.
pub async fn summarize_markets(
    reader: &dyn MarketReader,
    records: Vec<MarketRecord>,
    now: DateTime<Utc>,
    concurrency: usize,
) -> Vec<MarketSummary> {
    stream::iter(records)
        .map(|record| summarize_one(reader, record, now))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

async fn summarize_one(
    reader: &dyn MarketReader,
    record: MarketRecord,
    now: DateTime<Utc>,
) -> MarketSummary {
    let supply = read_supplies(reader, &record).await;
    MarketSummary {
        state: classify(&record, now),
        time_left: time_left(record.deadline, now),
        yes_price: yes_price(supply),
        id: record.id,
        question: record.question,
        owner: record.owner,
        deadline: record.deadline,
    }
}

fn or_zero(result: Result<Decimal, ReadError>, market_id: MarketId, field: &'static str) -> Decimal {
    result.unwrap_or_else(|e| {
        tracing::warn!(market_id, field, error = %e, "Read failed, defaulting to zero");
        Decimal::ZERO
    })
}
