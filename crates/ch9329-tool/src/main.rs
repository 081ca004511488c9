//! `ch9329-tool` entry point.
//!
//! Loads the optional config file, initialises logging, runs one subcommand
//! and prints its output.

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ch9329_tool::{load_config, run, Cli, ToolConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("cannot load config from {}", path.display()))?,
        None => ToolConfig::default(),
    };

    // Level comes from the config file unless `RUST_LOG` overrides it.
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.tool.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(config = ?cli.config, "configuration loaded");

    let output = run(&cli.command, &config)?;
    println!("{output}");
    Ok(())
}
