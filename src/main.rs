//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `sso_probe` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Printing one summary line per sequence
//!
//! The process exits with status 1 when any sequence failed, so the binary can
//! be driven directly by a monitoring agent.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use sso_probe::initialization::init_logger_with;
use sso_probe::{run_probes, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_probes(config).await {
        Ok(report) => {
            for line in report.summary_lines() {
                println!("{line}");
            }
            if report.failed() > 0 {
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("sso_probe error: {:#}", e);
            process::exit(1);
        }
    }
}
