//! cm8200b-stats - cable modem telemetry scraper.
//!
//! Scrapes the modem's status pages once and writes the results to InfluxDB.
//! Meant to be run periodically by an external scheduler such as cron.

mod config;
mod fetch;
mod html;
mod metrics;
mod pipeline;
mod sink;

use config::ScraperConfig;
use fetch::HttpFetcher;
use pipeline::Scraper;
use sink::InfluxSink;

use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("cm8200b_stats=info".parse()?))
        .init();

    // Load configuration
    let cfg = ScraperConfig::load();
    tracing::info!("Scraping modem at {}", cfg.device_url);
    tracing::info!(
        "Writing to database {} at {}",
        cfg.influx_database,
        cfg.influx_url()
    );

    let fetcher = HttpFetcher::new(cfg.fetch_timeout)?;
    let sink = InfluxSink::new(&cfg)?;

    let mut scraper = Scraper::new(&cfg, fetcher, sink);
    let report = scraper.run().await;

    let code = report.exit_code();
    if code == 0 {
        tracing::info!("Run complete, {} records written", report.written());
    } else {
        tracing::warn!(
            "Run finished with errors (exit status {}), {} records written",
            code,
            report.written()
        );
    }

    Ok(ExitCode::from(code))
}
