//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_USER_AGENT, MAX_REDIRECT_HOPS, REQUEST_TIMEOUT_SECS, SEQUENCE_TIMEOUT,
    TRANSACTION_RETRIES,
};
use crate::storage::{RetryPolicy, RetryableErrorClass};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options for the probe binary.
///
/// # Examples
///
/// ```bash
/// # Run every sequence in the file and store the timings
/// sso_probe sequences.json
///
/// # Dry run with verbose output
/// sso_probe sequences.json --no-store --log-level debug
///
/// # Also retry when the connection pool is starved
/// sso_probe sequences.json --retryable-error busy --retryable-error pool_timed_out
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "sso_probe",
    about = "Replays web SSO login sequences and records how long each step took."
)]
pub struct Opt {
    /// JSON file describing the monitoring sequences
    #[arg(value_parser)]
    pub sequences: PathBuf,

    /// Database path (SQLite file)
    #[arg(long, value_parser, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Run the sequences without storing the results
    #[arg(long)]
    pub no_store: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Deadline for one whole sequence run in seconds
    #[arg(long, default_value_t = SEQUENCE_TIMEOUT.as_secs())]
    pub sequence_timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum redirect hops followed within one step
    #[arg(long, default_value_t = MAX_REDIRECT_HOPS)]
    pub max_redirects: usize,

    /// Retries shared by all writes of one run
    #[arg(long, default_value_t = TRANSACTION_RETRIES)]
    pub transaction_retries: u32,

    /// Storage error classes that are retried (repeatable)
    #[arg(
        long = "retryable-error",
        value_enum,
        default_values_t = [RetryableErrorClass::Busy, RetryableErrorClass::Locked]
    )]
    pub retryable_errors: Vec<RetryableErrorClass>,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use sso_probe::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     sequences: PathBuf::from("haka.json"),
///     store: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file describing the monitoring sequences
    pub sequences: PathBuf,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Whether results are written to the database
    pub store: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Deadline for one whole sequence run in seconds
    pub sequence_timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Maximum redirect hops followed within one step
    pub max_redirects: usize,

    /// Retries shared by all writes of one run
    pub transaction_retries: u32,

    /// Storage error classes that are retried
    pub retryable_errors: Vec<RetryableErrorClass>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sequences: PathBuf::from("sequences.json"),
            db_path: PathBuf::from(DB_PATH),
            store: true,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            sequence_timeout_seconds: SEQUENCE_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: MAX_REDIRECT_HOPS,
            transaction_retries: TRANSACTION_RETRIES,
            retryable_errors: RetryPolicy::default().retryable,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            sequences: opt.sequences,
            db_path: opt.db_path,
            store: !opt.no_store,
            log_level: opt.log_level,
            log_format: opt.log_format,
            timeout_seconds: opt.timeout_seconds,
            sequence_timeout_seconds: opt.sequence_timeout_seconds,
            user_agent: opt.user_agent,
            max_redirects: opt.max_redirects,
            transaction_retries: opt.transaction_retries,
            retryable_errors: opt.retryable_errors,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_secs(self.sequence_timeout_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retryable: self.retryable_errors.clone(),
            budget: self.transaction_retries,
        }
    }
}
