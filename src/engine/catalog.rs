use chrono::{DateTime, Utc};

use crate::engine::lifecycle::classify;
use crate::models::{MarketFilter, MarketRead, MarketRecord};

/// Existing markets from a batch that match the listing tab and search text.
///
/// Order follows the batch (ascending market id). Search is a
/// case-insensitive substring match on the question.
pub fn filter_markets<'a>(
    reads: &'a [MarketRead],
    filter: MarketFilter,
    search: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<&'a MarketRecord> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    reads
        .iter()
        .filter_map(MarketRead::existing_record)
        .filter(|record| match filter {
            MarketFilter::All => true,
            MarketFilter::Active => classify(record, now).is_active(),
            MarketFilter::Resolved => classify(record, now).is_resolved(),
        })
        .filter(|record| match &needle {
            Some(needle) => record.question.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}

/// Human-readable time until `deadline`: `"Expired"`, `"2d 4h 10m"` or `"3h 5m"`.
pub fn time_left(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (deadline - now).num_seconds();
    if secs <= 0 {
        return "Expired".into();
    }

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}
