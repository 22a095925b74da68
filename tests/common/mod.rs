use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::Decimal;

use cds_markets::chain::MarketReader;
use cds_markets::config::{AppConfig, ChainConfig};
use cds_markets::errors::ReadError;
use cds_markets::models::{MarketId, MarketRecord, Outcome};
use cds_markets::AppState;

pub const OWNER: &str = "0x00000000000000000000000000000000000000aa";
pub const HOLDER: &str = "0x00000000000000000000000000000000000000bb";

/// In-memory contract state. Anything not seeded reads as the contract's
/// zero value; anything marked failing returns `ReadError::Unavailable`.
#[derive(Default)]
pub struct MockReader {
    count: u64,
    count_fails: bool,
    records: HashMap<MarketId, MarketRecord>,
    escrows: HashMap<MarketId, Decimal>,
    supplies: HashMap<String, Decimal>,
    balances: HashMap<(String, String), Decimal>,
    failing_records: HashSet<MarketId>,
    failing_escrows: HashSet<MarketId>,
}

#[allow(dead_code)]
impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, record: MarketRecord, yes: i64, no: i64, escrow: i64) -> Self {
        self.count = self.count.max(record.id);
        self.supplies.insert(record.yes_token.clone(), Decimal::from(yes));
        self.supplies.insert(record.no_token.clone(), Decimal::from(no));
        self.escrows.insert(record.id, Decimal::from(escrow));
        self.records.insert(record.id, record);
        self
    }

    pub fn with_balance(mut self, token: &str, account: &str, amount: i64) -> Self {
        self.balances
            .insert((token.to_string(), account.to_string()), Decimal::from(amount));
        self
    }

    /// Raise `marketCount` without creating the slots.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn fail_count(mut self) -> Self {
        self.count_fails = true;
        self
    }

    pub fn fail_record(mut self, id: MarketId) -> Self {
        self.failing_records.insert(id);
        self
    }

    pub fn fail_escrow(mut self, id: MarketId) -> Self {
        self.failing_escrows.insert(id);
        self
    }
}

fn unavailable(what: &str) -> ReadError {
    ReadError::Unavailable(what.to_string())
}

#[async_trait]
impl MarketReader for MockReader {
    async fn market_count(&self) -> Result<u64, ReadError> {
        if self.count_fails {
            return Err(unavailable("marketCount"));
        }
        Ok(self.count)
    }

    async fn market(&self, id: MarketId) -> Result<MarketRecord, ReadError> {
        if self.failing_records.contains(&id) {
            return Err(unavailable("markets"));
        }
        Ok(self
            .records
            .get(&id)
            .cloned()
            .unwrap_or_else(|| empty_slot(id)))
    }

    async fn escrow(&self, id: MarketId) -> Result<Decimal, ReadError> {
        if self.failing_escrows.contains(&id) {
            return Err(unavailable("marketEscrow"));
        }
        Ok(self.escrows.get(&id).copied().unwrap_or_default())
    }

    async fn total_supply(&self, token: &str) -> Result<Decimal, ReadError> {
        Ok(self.supplies.get(token).copied().unwrap_or_default())
    }

    async fn balance_of(&self, token: &str, account: &str) -> Result<Decimal, ReadError> {
        Ok(self
            .balances
            .get(&(token.to_string(), account.to_string()))
            .copied()
            .unwrap_or_default())
    }
}

/// An unresolved market owned by [`OWNER`].
#[allow(dead_code)]
pub fn market(id: MarketId, question: &str, deadline: DateTime<Utc>) -> MarketRecord {
    MarketRecord {
        id,
        owner: OWNER.into(),
        question: question.into(),
        deadline,
        resolved: false,
        outcome: Outcome::Unset,
        yes_token: format!("yes-{id}"),
        no_token: format!("no-{id}"),
        exists: true,
    }
}

#[allow(dead_code)]
pub fn resolved_market(id: MarketId, question: &str, outcome: Outcome) -> MarketRecord {
    MarketRecord {
        resolved: true,
        outcome,
        ..market(id, question, Utc::now() - Duration::days(1))
    }
}

fn empty_slot(id: MarketId) -> MarketRecord {
    MarketRecord {
        id,
        owner: "0x0000000000000000000000000000000000000000".into(),
        question: String::new(),
        deadline: DateTime::<Utc>::default(),
        resolved: false,
        outcome: Outcome::Unset,
        yes_token: "0x0000000000000000000000000000000000000000".into(),
        no_token: "0x0000000000000000000000000000000000000000".into(),
        exists: false,
    }
}

#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        chain: ChainConfig {
            rpc_url: "http://localhost:8545".into(),
            chain_id: 31_337,
            contract_address: "0x00000000000000000000000000000000000000cc".into(),
        },
        read_concurrency: 4,
        max_markets: 100,
        assumed_lifetime_days: 30,
        price_impact_amount: Decimal::new(1, 1),
    }
}

/// App state over `reader`, with a metrics handle that is not installed
/// as the global recorder so tests can build as many as they like.
#[allow(dead_code)]
pub fn test_state(reader: MockReader) -> AppState {
    AppState {
        reader: Arc::new(reader),
        config: test_config(),
        metrics_handle: PrometheusBuilder::new().build_recorder().handle(),
    }
}
