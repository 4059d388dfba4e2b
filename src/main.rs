//! heybattery: estimates remaining battery life from full-charge cycles.
//!
//! Run with:  `RUST_LOG=info heybattery monitor`

mod cli;
mod monitor;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Structured logging; RUST_LOG controls verbosity (default: info).
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(hb_config::default_path);
    let config = hb_config::load(&config_path)?;
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.storage.data_dir.clone())
        .unwrap_or_else(hb_store::default_data_dir);

    tracing::debug!("heybattery v{} using data dir '{}'", env!("CARGO_PKG_VERSION"), data_dir.display());

    match cli.command {
        Command::Monitor => monitor::run(config_path, config, data_dir),
        Command::Status => report::status(&config, &data_dir),
        Command::History { json } => report::history(&data_dir, json),
        Command::Feed(args) => report::feed(&data_dir, &args),
    }
}
