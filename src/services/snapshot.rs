use futures_util::stream::{self, StreamExt};
use metrics::{gauge, histogram};
use std::time::Instant;

use crate::chain::MarketReader;
use crate::errors::ReadError;
use crate::models::{MarketId, MarketRead};

/// Read every market slot `1..=marketCount` together with its escrow.
///
/// At most `concurrency` markets are in flight; results come back in id
/// order. A failed element is logged and returned as-is for the engine to
/// exclude. Only a failed `marketCount` fails the whole batch, since the ids
/// cannot be enumerated without it. Ids above `max_markets` are not read.
pub async fn read_batch(
    reader: &dyn MarketReader,
    concurrency: usize,
    max_markets: u64,
) -> Result<Vec<MarketRead>, ReadError> {
    let started = Instant::now();
    let reported = reader.market_count().await?;
    let count = reported.min(max_markets);
    if count < reported {
        tracing::warn!(reported, max_markets, "marketCount above limit, batch truncated");
    }

    let reads: Vec<MarketRead> = stream::iter(1..=count)
        .map(|id| read_one(reader, id))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let included = reads.iter().filter(|r| r.existing_record().is_some()).count();
    gauge!("snapshot_markets_included").set(included as f64);
    histogram!("snapshot_latency_seconds").record(started.elapsed().as_secs_f64());

    tracing::debug!(
        market_count = count,
        included,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Market batch read"
    );

    Ok(reads)
}

/// Like [`read_batch`], but an unreadable market count yields an empty batch.
pub async fn read_batch_or_empty(
    reader: &dyn MarketReader,
    concurrency: usize,
    max_markets: u64,
) -> Vec<MarketRead> {
    match read_batch(reader, concurrency, max_markets).await {
        Ok(reads) => reads,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read market count, treating batch as empty");
            Vec::new()
        }
    }
}

async fn read_one(reader: &dyn MarketReader, id: MarketId) -> MarketRead {
    let (record, escrow) = tokio::join!(reader.market(id), reader.escrow(id));

    if let Err(e) = &record {
        tracing::warn!(market_id = id, error = %e, "Market read failed, excluded");
    }
    if let Err(e) = &escrow {
        tracing::warn!(market_id = id, error = %e, "Escrow read failed, volume excluded");
    }

    MarketRead { id, record, escrow }
}
