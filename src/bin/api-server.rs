//! Altpulse API Server
//!
//! Runs a scan on every `GET /api/signals` and returns the ordered LONG and
//! SHORT candidates as JSON. Stateless; nothing is persisted between runs.

use altpulse::config::{get_environment, get_port, ExchangeConfig, ScanConfig};
use altpulse::core::http::start_server;
use altpulse::core::scanner::Scanner;
use altpulse::logging;
use altpulse::metrics::Metrics;
use altpulse::services::binance::BinanceFuturesClient;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let port = get_port();
    let exchange = ExchangeConfig::from_env();
    let scan = ScanConfig::from_env();

    info!("Starting Altpulse API Server");
    info!(environment = %get_environment(), "Environment");
    info!(
        base_url = %exchange.base_url,
        reference = %scan.reference_symbol,
        max_symbols = ?scan.max_symbols,
        concurrency = scan.max_concurrent_requests,
        "Market data: {}",
        exchange.base_url
    );

    let metrics = Arc::new(Metrics::new()?);
    let client = BinanceFuturesClient::new(&exchange)?;
    let scanner = Arc::new(Scanner::new(Arc::new(client), scan).with_metrics(metrics.clone()));

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        result = start_server(port, scanner, metrics) => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
                return Err(e);
            }
        }
    }

    info!("API server stopped");
    Ok(())
}
