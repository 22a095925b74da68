use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::chain::abi::normalize_address;
use crate::engine::pricer::{implied_probability_pct, no_price};
use crate::engine::settlement::{expected_share, PositionValue};
use crate::engine::{
    can_resolve, filter_markets, preview, price_impact_pct, quote_buy, summarize, time_left,
    value_position, yes_price, BuyQuote, Projection, SettlementPreview,
};
use crate::errors::AppError;
use crate::models::{
    ChartSummary, LifecycleState, MarketFilter, MarketId, MarketRecord, Outcome, PricePoint,
    Timeframe, WalletBalances,
};
use crate::services::{
    read_balances, read_batch, read_market_view, summarize_markets, MarketSummary, MarketView,
};
use crate::AppState;

/// Largest amount or balance accepted by the quote endpoint, in whole tokens.
const MAX_AMOUNT: u64 = 1_000_000_000_000;

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub search: Option<String>,
}

/// GET /api/markets?filter=&search=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<MarketSummary>>>, AppError> {
    let filter = match query.filter.as_deref() {
        Some(raw) => MarketFilter::from_str(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unknown filter: {raw}")))?,
        None => MarketFilter::All,
    };

    let now = Utc::now();
    let concurrency = state.config.read_concurrency;
    let reads = read_batch(state.reader.as_ref(), concurrency, state.config.max_markets).await?;
    let records: Vec<MarketRecord> = filter_markets(&reads, filter, query.search.as_deref(), now)
        .into_iter()
        .cloned()
        .collect();
    let summaries = summarize_markets(state.reader.as_ref(), records, now, concurrency).await;

    Ok(Json(ApiResponse::ok(summaries)))
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub caller: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketDetail {
    pub id: MarketId,
    pub question: String,
    pub owner: String,
    pub deadline: DateTime<Utc>,
    pub state: LifecycleState,
    pub outcome: Outcome,
    pub time_left: String,
    pub yes_token: String,
    pub no_token: String,
    pub yes_supply: Decimal,
    pub no_supply: Decimal,
    pub escrow: Decimal,
    pub escrow_estimated: bool,
    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub probability_pct: Decimal,
    /// Impact of a purchase of the configured reference amount.
    pub price_impact_pct: Decimal,
    pub can_resolve: bool,
}

/// GET /api/markets/:id
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<MarketId>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<ApiResponse<MarketDetail>>, AppError> {
    let now = Utc::now();
    let view = load_view(&state, id, now).await?;

    let supply = view.supply;
    let record = view.record;
    let detail = MarketDetail {
        id,
        time_left: time_left(record.deadline, now),
        can_resolve: can_resolve(&record, query.caller.as_deref(), now),
        question: record.question,
        owner: record.owner,
        deadline: record.deadline,
        state: view.state,
        outcome: record.outcome,
        yes_token: record.yes_token,
        no_token: record.no_token,
        yes_supply: supply.yes,
        no_supply: supply.no,
        escrow: view.escrow,
        escrow_estimated: view.escrow_estimated,
        yes_price: yes_price(supply),
        no_price: no_price(supply),
        probability_pct: implied_probability_pct(supply),
        price_impact_pct: price_impact_pct(supply, state.config.price_impact_amount),
    };

    Ok(Json(ApiResponse::ok(detail)))
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub timeframe: Option<String>,
    /// Market creation time as unix seconds, when the caller knows it.
    pub created_at: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub timeframe: Timeframe,
    pub created_at: DateTime<Utc>,
    pub points: Vec<PricePoint>,
    pub summary: Option<ChartSummary>,
}

/// GET /api/markets/:id/chart?timeframe=&created_at=
pub async fn chart(
    State(state): State<AppState>,
    Path(id): Path<MarketId>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ApiResponse<ChartResponse>>, AppError> {
    let timeframe = match query.timeframe.as_deref() {
        Some(raw) => Timeframe::from_str(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unknown timeframe: {raw}")))?,
        None => Timeframe::All,
    };
    let created_at = query
        .created_at
        .map(|secs| {
            DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| AppError::BadRequest(format!("invalid created_at: {secs}")))
        })
        .transpose()?;

    let now = Utc::now();
    let view = load_view(&state, id, now).await?;

    let projection = match created_at {
        Some(created_at) => {
            Projection::new(view.supply, view.escrow, view.record.deadline, created_at, now)
        }
        None => Projection::with_assumed_lifetime(
            view.supply,
            view.escrow,
            view.record.deadline,
            state.config.assumed_lifetime(),
            now,
        ),
    };

    let mut rng = StdRng::from_entropy();
    let points: Vec<PricePoint> = projection.series(&mut rng, timeframe, now).collect();
    let summary = summarize(&points, yes_price(view.supply));

    tracing::debug!(
        market_id = id,
        timeframe = %timeframe,
        samples = points.len(),
        "Chart projected"
    );

    Ok(Json(ApiResponse::ok(ChartResponse {
        timeframe,
        created_at: projection.created_at(),
        points,
        summary,
    })))
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    pub account: String,
}

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub balances: WalletBalances,
    pub value: PositionValue,
    pub settlement: SettlementPreview,
    pub expected_share: Decimal,
}

/// GET /api/markets/:id/position?account=
pub async fn position(
    State(state): State<AppState>,
    Path(id): Path<MarketId>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<ApiResponse<PositionResponse>>, AppError> {
    let account =
        normalize_address(&query.account).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let view = load_view(&state, id, Utc::now()).await?;
    let balances = read_balances(state.reader.as_ref(), &view.record, &account).await;

    let settlement = preview(view.state, &balances);
    let response = PositionResponse {
        value: value_position(&balances, yes_price(view.supply)),
        expected_share: expected_share(&settlement, view.supply),
        settlement,
        balances,
    };

    Ok(Json(ApiResponse::ok(response)))
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub amount: String,
    /// Caller's base-currency balance, when known.
    pub balance: Option<String>,
}

/// GET /api/markets/:id/quote?amount=&balance=
pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<MarketId>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<ApiResponse<BuyQuote>>, AppError> {
    let amount = parse_amount("amount", &query.amount)?;
    let balance = query
        .balance
        .as_deref()
        .map(|raw| parse_amount("balance", raw))
        .transpose()?;

    let view = load_view(&state, id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(quote_buy(view.state, view.supply, amount, balance))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_view(state: &AppState, id: MarketId, now: DateTime<Utc>) -> Result<MarketView, AppError> {
    read_market_view(state.reader.as_ref(), id, now)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("market {id}")))
}

fn parse_amount(field: &str, raw: &str) -> Result<Decimal, AppError> {
    let value: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {field}: {raw}")))?;

    if value.is_sign_negative() {
        return Err(AppError::BadRequest(format!("{field} must not be negative")));
    }
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(AppError::BadRequest(format!("{field} must not exceed {MAX_AMOUNT}")));
    }
    Ok(value)
}
