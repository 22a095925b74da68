pub mod api;
pub mod chain;
pub mod config;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::chain::MarketReader;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<dyn MarketReader>,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
