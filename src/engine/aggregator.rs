use chrono::{DateTime, Utc};

use crate::engine::lifecycle::classify;
use crate::models::{LifecycleState, MarketRead, ProtocolStats};

/// Fold a settled batch of market reads into protocol totals.
///
/// Each element is judged on its own:
/// - a failed record read or a non-existent slot drops the market from every total;
/// - a failed escrow read drops only its volume, the market is still counted;
/// - `AwaitingResolution` markets count toward `total_count` only.
pub fn aggregate<'a, I>(reads: I, now: DateTime<Utc>) -> ProtocolStats
where
    I: IntoIterator<Item = &'a MarketRead>,
{
    reads
        .into_iter()
        .fold(ProtocolStats::default(), |mut stats, read| {
            let Some(record) = read.existing_record() else {
                return stats;
            };

            stats.total_count += 1;
            match classify(record, now) {
                LifecycleState::Active => stats.active_count += 1,
                LifecycleState::Resolved(_) => stats.resolved_count += 1,
                LifecycleState::AwaitingResolution => {}
            }

            if let Some(escrow) = read.escrow_value() {
                stats.total_volume += escrow;
            }

            stats
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReadError;
    use crate::models::{MarketId, MarketRecord, Outcome};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn make_record(id: MarketId, deadline: DateTime<Utc>, resolved: bool) -> MarketRecord {
        MarketRecord {
            id,
            owner: "0xowner".into(),
            question: format!("Market {id}"),
            deadline,
            resolved,
            outcome: if resolved { Outcome::NoEvent } else { Outcome::Unset },
            yes_token: format!("0xyes{id}"),
            no_token: format!("0xno{id}"),
            exists: true,
        }
    }

    fn ok_read(record: MarketRecord, escrow: i64) -> MarketRead {
        MarketRead {
            id: record.id,
            record: Ok(record),
            escrow: Ok(Decimal::from(escrow)),
        }
    }

    fn failed(reason: &str) -> ReadError {
        ReadError::Unavailable(reason.into())
    }

    #[test]
    fn test_counts_by_state() {
        let now = Utc::now();
        let reads = vec![
            ok_read(make_record(1, now + Duration::days(1), false), 10),
            ok_read(make_record(2, now - Duration::days(1), false), 20),
            ok_read(make_record(3, now - Duration::days(1), true), 30),
        ];

        let stats = aggregate(&reads, now);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.resolved_count, 1);
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.total_volume, Decimal::from(60));
    }

    #[test]
    fn test_escrow_failure_keeps_market_in_counts() {
        let now = Utc::now();
        let mut reads: Vec<MarketRead> = (1..=5)
            .map(|id| ok_read(make_record(id, now + Duration::days(7), false), 100))
            .collect();
        reads[2].escrow = Err(failed("escrow timeout"));

        let stats = aggregate(&reads, now);
        assert_eq!(stats.total_count, 5);
        assert_eq!(stats.active_count, 5);
        assert_eq!(stats.total_volume, Decimal::from(400));
    }

    #[test]
    fn test_record_failure_and_missing_slot_are_excluded() {
        let now = Utc::now();
        let mut missing = make_record(2, now + Duration::days(1), false);
        missing.exists = false;

        let reads = vec![
            ok_read(make_record(1, now + Duration::days(1), false), 5),
            ok_read(missing, 50),
            MarketRead {
                id: 3,
                record: Err(failed("rpc down")),
                escrow: Ok(Decimal::from(500)),
            },
        ];

        let stats = aggregate(&reads, now);
        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.total_volume, Decimal::from(5));
    }

    #[test]
    fn test_all_failed_is_zero() {
        let reads: Vec<MarketRead> = (1..=3)
            .map(|id| MarketRead {
                id,
                record: Err(failed("boom")),
                escrow: Err(failed("boom")),
            })
            .collect();

        assert_eq!(aggregate(&reads, Utc::now()), ProtocolStats::default());
    }

    #[test]
    fn test_empty_batch() {
        let stats = aggregate(std::iter::empty::<&MarketRead>(), Utc::now());
        assert_eq!(stats, ProtocolStats::default());
    }
}
