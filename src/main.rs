use std::sync::Arc;
use std::time::Duration;

use cds_markets::api::router::create_router;
use cds_markets::chain::{MarketReader, RpcMarketReader};
use cds_markets::config::AppConfig;
use cds_markets::errors::ReadError;
use cds_markets::metrics::init_metrics;
use cds_markets::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = init_metrics()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let reader = RpcMarketReader::new(http, &config.chain)?;

    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        contract = %reader.contract(),
        read_concurrency = config.read_concurrency,
        "Market reader configured"
    );

    match reader.verify_chain_id(config.chain.chain_id).await {
        Ok(()) => {}
        Err(e @ ReadError::ChainMismatch { .. }) => return Err(e.into()),
        Err(e) => tracing::warn!(error = %e, "Could not verify chain id at startup"),
    }

    match reader.market_count().await {
        Ok(count) => tracing::info!(market_count = count, "Connected to market contract"),
        Err(e) => tracing::warn!(error = %e, "Market contract not reachable at startup"),
    }

    let state = AppState {
        reader: Arc::new(reader),
        config,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
