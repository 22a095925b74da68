use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use crate::engine::pricer::{pct_change, yes_price, UNINFORMED_PRICE};
use crate::models::{ChartSummary, PricePoint, SupplyPair, Timeframe, CURRENT_LABEL};

/// Assumed market lifetime when the creation time is unknown.
pub const DEFAULT_ASSUMED_LIFETIME_DAYS: i64 = 30;

pub const MIN_SAMPLES: u32 = 5;
pub const MAX_SAMPLES: u32 = 20;

const MIN_DURATION_SECS: i64 = 86_400;
const MIN_ELAPSED_SECS: i64 = 3_600;

/// Max cosmetic widening of the high/low band, in basis points (0.015).
const BAND_JITTER_BPS: i64 = 150;
const BAND_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
const BAND_CEIL: Decimal = Decimal::from_parts(99, 0, 0, false, 2);

pub fn default_assumed_lifetime() -> Duration {
    Duration::days(DEFAULT_ASSUMED_LIFETIME_DAYS)
}

/// Synthetic price history for one market.
///
/// There is no trade ledger to replay, so supplies are assumed to have grown
/// linearly from zero at creation to their current value. The series is
/// rebuilt from scratch on every call to [`Projection::samples`].
#[derive(Debug, Clone)]
pub struct Projection {
    supply: SupplyPair,
    escrow: Decimal,
    created_at: DateTime<Utc>,
    duration_secs: i64,
    sample_count: u32,
}

impl Projection {
    pub fn new(
        supply: SupplyPair,
        escrow: Decimal,
        deadline: DateTime<Utc>,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let duration_secs = (deadline - created_at).num_seconds().max(MIN_DURATION_SECS);
        let elapsed_secs = (now - created_at).num_seconds().max(MIN_ELAPSED_SECS);

        // One sample per twentieth of the lifetime observed so far
        let raw = elapsed_secs.saturating_mul(MAX_SAMPLES as i64) / duration_secs;
        let sample_count = raw.clamp(MIN_SAMPLES as i64, MAX_SAMPLES as i64) as u32;

        Self {
            supply,
            escrow,
            created_at,
            duration_secs,
            sample_count,
        }
    }

    /// Build a projection for a market whose creation time is unknown,
    /// assuming it was created `lifetime` before its deadline.
    pub fn with_assumed_lifetime(
        supply: SupplyPair,
        escrow: Decimal,
        deadline: DateTime<Utc>,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let created_at = deadline
            .checked_sub_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(supply, escrow, deadline, created_at, now)
    }

    /// Number of intervals `n`; the series holds `n + 1` samples.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Lazily generate the full series, oldest first.
    pub fn samples<'a, R: Rng>(&'a self, rng: &'a mut R) -> Samples<'a, R> {
        Samples {
            projection: self,
            rng,
            index: 0,
            prev_close: UNINFORMED_PRICE,
        }
    }

    /// The series restricted to `timeframe`. The current sample is always kept.
    pub fn series<'a, R: Rng>(
        &'a self,
        rng: &'a mut R,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = PricePoint> + 'a {
        let cutoff = timeframe.cutoff(now);
        self.samples(rng).filter(move |point| in_window(point, cutoff))
    }
}

fn in_window(point: &PricePoint, cutoff: Option<DateTime<Utc>>) -> bool {
    match cutoff {
        Some(cutoff) => point.is_current || point.timestamp >= cutoff,
        None => true,
    }
}

/// Iterator over projected samples. See [`Projection::samples`].
pub struct Samples<'a, R> {
    projection: &'a Projection,
    rng: &'a mut R,
    index: u32,
    prev_close: Decimal,
}

impl<R: Rng> Samples<'_, R> {
    fn band_jitter(&mut self) -> Decimal {
        Decimal::new(self.rng.gen_range(0..=BAND_JITTER_BPS), 4)
    }
}

impl<R: Rng> Iterator for Samples<'_, R> {
    type Item = PricePoint;

    fn next(&mut self) -> Option<PricePoint> {
        let n = self.projection.sample_count;
        if self.index > n {
            return None;
        }
        let i = self.index;
        self.index += 1;

        let progress = Decimal::from(i) / Decimal::from(n);
        let supply = self.projection.supply.scaled(progress);
        let close = yes_price(supply);
        let open = self.prev_close;
        self.prev_close = close;

        let high = (open.max(close) + self.band_jitter()).min(BAND_CEIL);
        let low = (open.min(close) - self.band_jitter()).max(BAND_FLOOR);

        let offset = self.projection.duration_secs * i as i64 / n as i64;
        let timestamp = self
            .projection
            .created_at
            .checked_add_signed(Duration::seconds(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let is_current = i == n;
        let label = if is_current {
            CURRENT_LABEL.to_string()
        } else {
            timestamp.format("%b %-d").to_string()
        };

        let volume_weight = Decimal::new(5, 1) + Decimal::new(self.rng.gen_range(0..1_000), 3);
        let volume = self.projection.escrow / Decimal::from(n) * volume_weight;

        Some(PricePoint {
            label,
            timestamp,
            open,
            high,
            low,
            close,
            yes_supply: supply.yes,
            no_supply: supply.no,
            volume,
            is_current,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.projection.sample_count + 1).saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for Samples<'_, R> {}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Period high/low and change from the first sample to `current_price`.
/// Returns `None` for an empty series.
pub fn summarize(points: &[PricePoint], current_price: Decimal) -> Option<ChartSummary> {
    let first = points.first()?;
    let period_high = points.iter().map(|p| p.high).max()?;
    let period_low = points.iter().map(|p| p.low).min()?;

    Some(ChartSummary {
        current_price,
        first_close: first.close,
        change_pct: pct_change(first.close, current_price),
        period_high,
        period_low,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
