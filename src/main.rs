use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::delta::DeltaClient;
use config::TrackerConfig;
use services::refresh_service;
use services::report_service::PriceTracker;

fn print_report(report: &models::Report) {
    println!("{}", commands::report::render_report(report));
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "btc_price_tracker=info".parse::<tracing_subscriber::filter::Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = match TrackerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    info!(
        "Tracking {} via {} (marks {} / {})",
        config.symbol,
        config.base_url,
        config.morning_mark.format("%H:%M:%S"),
        config.evening_mark.format("%H:%M:%S")
    );

    let client = match DeltaClient::with_base_url(&config.base_url, config.timeout) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let tracker = PriceTracker::new(Arc::new(client), config.morning_mark, config.evening_mark);

    match config.refresh_interval {
        Some(period) => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            refresh_service::run_periodic(&tracker, &config.symbol, period, shutdown, print_report).await;
        }
        None => {
            refresh_service::run_once(&tracker, &config.symbol, print_report).await;
        }
    }
}
