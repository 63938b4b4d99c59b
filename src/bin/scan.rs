//! One-shot scan: fetch, classify and print the LONG/SHORT tables.

use altpulse::config::{ExchangeConfig, ScanConfig};
use altpulse::core::scanner::Scanner;
use altpulse::logging;
use altpulse::models::signal::{ScanReport, Signal};
use altpulse::services::binance::BinanceFuturesClient;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let exchange = ExchangeConfig::from_env();
    let scan = ScanConfig::from_env();
    info!(
        reference = %scan.reference_symbol,
        max_symbols = ?scan.max_symbols,
        "Starting scan against {}",
        exchange.base_url
    );

    let client = BinanceFuturesClient::new(&exchange)?;
    let scanner = Scanner::new(Arc::new(client), scan);

    let report = scanner.run().await.map_err(|e| {
        error!(error = %e, "Scan aborted");
        e
    })?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &ScanReport) {
    println!(
        "Updated: {} (reference {}, {} scanned, {} skipped)",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.reference_symbol,
        report.scanned,
        report.skipped.len()
    );

    if !report.longs.is_empty() {
        println!();
        println!("LONG opportunities");
        print_table(&report.longs);
    }

    if !report.shorts.is_empty() {
        println!();
        println!("SHORT opportunities");
        print_table(&report.shorts);
    }

    if !report.has_signals() {
        println!();
        println!("No signal detected.");
    }
}

fn print_table(signals: &[Signal]) {
    println!(
        "  {:<14} {:>14} {:>10} {:>8} {:>14} {:>14}",
        "Symbol", "Price", "24h %", "dCorr", "TP", "SL"
    );
    for signal in signals {
        println!(
            "  {:<14} {:>14.4} {:>10.2} {:>8.2} {:>14.4} {:>14.4}",
            signal.symbol,
            signal.price,
            signal.return_24h_pct,
            signal.delta_correlation,
            signal.take_profit,
            signal.stop_loss
        );
    }
}
