//! sso_probe library: synthetic monitoring of web single-sign-on flows
//!
//! A monitoring sequence replays a multi-step SSO handshake (service provider,
//! identity provider, back again) through a chain of resolvers. Each resolver
//! performs one HTTP exchange, validates the response and scrapes the next
//! step out of it. The timings of every phase, and the first failure if any,
//! are recorded in a SQLite database.
//!
//! # Example
//!
//! ```no_run
//! use sso_probe::{run_probes, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     sequences: std::path::PathBuf::from("haka.json"),
//!     ..Default::default()
//! };
//!
//! let report = run_probes(config).await?;
//! for line in report.summary_lines() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod models;
pub mod resolve;
pub mod sequence;
pub mod storage;
pub mod validate;

// Re-export public API
pub use config::{load_sequences, parse_sequences, Config, LogFormat, LogLevel, Opt};
pub use error_handling::{
    ConfigError, DatabaseError, InitializationError, ProbeError, StoreError, ValidationError,
};
pub use models::{MonitoringResults, SequenceResult, Step, StepResult};
pub use run::{run_probes, run_sequences, ProbeReport};
pub use sequence::MonitoringSequence;

// Internal run module (drives every configured sequence and stores the results)
mod run {
    use anyhow::{Context, Result};
    use futures::future::join_all;
    use log::{info, warn};

    use crate::app::{render_summary, summarize};
    use crate::config::{load_sequences, Config};
    use crate::initialization::init_probe_context;
    use crate::models::MonitoringResults;
    use crate::sequence::MonitoringSequence;
    use crate::storage::ResultStore;

    /// Outcome of one probe invocation.
    #[derive(Debug, Clone)]
    pub struct ProbeReport {
        /// Results of the sequences that finished before their deadline, in
        /// configuration order
        pub results: MonitoringResults,
        /// Ids of sequences that hit the sequence deadline and left no record
        pub timed_out: Vec<String>,
        /// Database ids of the stored results (empty when storing is disabled)
        pub stored_ids: Vec<i64>,
    }

    impl ProbeReport {
        /// True when no sequence ran at all.
        pub fn is_empty(&self) -> bool {
            self.results.is_empty() && self.timed_out.is_empty()
        }

        /// Sequences that recorded an error or never finished.
        ///
        /// A run without any sequence counts as one failure.
        pub fn failed(&self) -> usize {
            if self.is_empty() {
                return 1;
            }
            let errored = self
                .results
                .results()
                .iter()
                .filter(|r| r.first_error().is_some())
                .count();
            errored + self.timed_out.len()
        }

        /// One `<sequence id>: <summary>` line per configured sequence, or a
        /// single no-results line when nothing ran.
        pub fn summary_lines(&self) -> Vec<String> {
            if self.is_empty() {
                return vec![render_summary(Some(&self.results))];
            }
            self.results
                .results()
                .iter()
                .map(|r| format!("{}: {}", r.id, summarize(r)))
                .chain(
                    self.timed_out
                        .iter()
                        .map(|id| format!("{id}: ERROR: Sequence did not finish in time")),
                )
                .collect()
        }
    }

    /// Loads the sequence file named by `config` and probes every sequence in it.
    ///
    /// # Errors
    ///
    /// Fails if the sequence file is unreadable or invalid, or if the results
    /// cannot be stored. Probe failures are not errors; they are reported in
    /// the returned `ProbeReport`.
    pub async fn run_probes(config: Config) -> Result<ProbeReport> {
        let sequences =
            load_sequences(&config.sequences).context("Failed to load monitoring sequences")?;
        run_sequences(&config, &sequences).await
    }

    /// Runs `sequences` concurrently, each with its own cookie jar and deadline,
    /// then stores the finished results unless storing is disabled.
    pub async fn run_sequences(
        config: &Config,
        sequences: &[MonitoringSequence],
    ) -> Result<ProbeReport> {
        let mut contexts = Vec::with_capacity(sequences.len());
        for _ in sequences {
            contexts.push(init_probe_context(config).context("Failed to initialize HTTP client")?);
        }

        let deadline = config.sequence_timeout();
        let runs = sequences.iter().zip(contexts).map(|(sequence, mut ctx)| async move {
            match tokio::time::timeout(deadline, sequence.run(&mut ctx)).await {
                Ok(result) => Ok(result),
                Err(_) => {
                    warn!(
                        "{}: sequence did not finish within {}s",
                        sequence.id(),
                        deadline.as_secs()
                    );
                    Err(sequence.id().to_string())
                }
            }
        });

        let mut results = MonitoringResults::new();
        let mut timed_out = Vec::new();
        for outcome in join_all(runs).await {
            match outcome {
                Ok(result) => results.add_result(result),
                Err(id) => timed_out.push(id),
            }
        }

        let stored_ids = if config.store && !results.is_empty() {
            let store = ResultStore::open(&config.db_path, config.retry_policy())
                .await
                .context("Failed to open result database")?;
            let ids = store
                .store_all(&results)
                .await
                .context("Failed to store monitoring results")?;
            info!(
                "Stored {} monitoring results in {}",
                ids.len(),
                config.db_path.display()
            );
            ids
        } else {
            Vec::new()
        };

        Ok(ProbeReport {
            results,
            timed_out,
            stored_ids,
        })
    }
}
