//! Binary crate for the `cityweather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and lookups
//! - Launching the weather service
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

/// Overrides the log filter, e.g. `CITYWEATHER_LOG=debug`.
const LOG_ENV: &str = "CITYWEATHER_LOG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.default_log_level());
    cmd.run().await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},hyper=warn,hyper_util=warn,reqwest=warn"))
    });

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
