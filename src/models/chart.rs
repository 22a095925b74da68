use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label carried by the final sample of every series.
pub const CURRENT_LABEL: &str = "Now";

/// Chart lookback window selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1H")]
    OneHour,
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[default]
    #[serde(rename = "ALL")]
    All,
}

impl Timeframe {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "1H" => Some(Timeframe::OneHour),
            "1D" => Some(Timeframe::OneDay),
            "1W" => Some(Timeframe::OneWeek),
            "1M" => Some(Timeframe::OneMonth),
            "ALL" => Some(Timeframe::All),
            _ => None,
        }
    }

    /// Lookback span, or `None` for the full series.
    pub fn window(&self) -> Option<Duration> {
        match self {
            Timeframe::OneHour => Some(Duration::hours(1)),
            Timeframe::OneDay => Some(Duration::days(1)),
            Timeframe::OneWeek => Some(Duration::weeks(1)),
            Timeframe::OneMonth => Some(Duration::days(30)),
            Timeframe::All => None,
        }
    }

    /// Oldest timestamp a sample may carry to stay in this window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::OneHour => "1H",
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::All => "ALL",
        };
        f.write_str(s)
    }
}

/// One projected chart sample.
///
/// `close` is the supply-ratio price at the reconstructed supply level.
/// `high`, `low` and `volume` are cosmetic bands for rendering only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub yes_supply: Decimal,
    pub no_supply: Decimal,
    pub volume: Decimal,
    pub is_current: bool,
}

/// Aggregates over a (filtered) series, as shown next to the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub current_price: Decimal,
    pub first_close: Decimal,
    pub change_pct: Decimal,
    pub period_high: Decimal,
    pub period_low: Decimal,
}
