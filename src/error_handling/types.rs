//! Error type definitions.
//!
//! This module defines the errors raised while configuring, probing and
//! persisting monitoring sequences.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Error applying schema migrations.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Invalid or unreadable sequence configuration.
///
/// Raised while loading the sequence file, before any request is made. Never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read sequence file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse sequence file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// A response failed a validator, or an expected scraping token was absent.
///
/// Carries a one-line reason and, where available, the offending response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
    pub body: Option<String>,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            body: None,
        }
    }

    pub fn with_body(reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            body: Some(body.into()),
        }
    }
}

/// Failure of one resolver invocation.
///
/// Caught by the orchestrator and recorded as the step's error message; it never
/// propagates past a sequence run.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The step handed to the resolver has no target URL.
    #[error("{resolver}: The starting step does not contain URL")]
    MissingUrl { resolver: String },

    /// The target URL (or a completed relative URL) could not be parsed.
    #[error("{resolver}: Invalid URL {url}: {source}")]
    InvalidUrl {
        resolver: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Network or IO fault while talking to the target.
    #[error("{resolver}: Could not perform a http request to {url}")]
    Transport {
        resolver: String,
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The redirect chain did not terminate within the hop limit.
    #[error("{resolver}: Redirect limit of {max_hops} exceeded at {url}")]
    TooManyRedirects {
        resolver: String,
        url: String,
        max_hops: usize,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ProbeError {
    /// The response body captured when the failure happened, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ProbeError::Validation(e) => e.body.as_deref(),
            _ => None,
        }
    }

    /// The structured validation cause, if this failure came from a validator or scraper.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ProbeError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Error persisting monitoring results.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A non-transient database error; never retried.
    #[error("Storing monitoring results failed: {0}")]
    Fatal(#[source] sqlx::Error),

    /// A transient error that was still failing when the retry budget ran out.
    #[error("Storing monitoring results failed, retry limit exceeded: {0}")]
    RetriesExhausted(#[source] sqlx::Error),

    /// The sequence insert did not hand back a generated identifier.
    #[error("Could not get the generated key after insert")]
    MissingGeneratedKey,

    /// The database could not be opened or migrated.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}
