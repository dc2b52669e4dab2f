//! Classification of transient SQLite errors and the shared retry budget.

use std::time::Duration;

use clap::ValueEnum;
use strum_macros::{Display, EnumIter};
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::{
    RETRY_FACTOR, RETRY_INITIAL_DELAY_MS, RETRY_MAX_DELAY_SECS, TRANSACTION_RETRIES,
};

/// Primary SQLite result codes, taken from the low byte of the extended code.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Storage error classes that may succeed when the transaction is re-attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum RetryableErrorClass {
    /// Another connection holds a conflicting lock on the database file
    Busy,
    /// A conflicting lock inside the same database connection or shared cache
    Locked,
    /// No pooled connection became available in time
    PoolTimedOut,
    /// I/O failure talking to the database
    Io,
}

/// Maps a driver error to its retryable class, if it has one.
pub fn classify(error: &sqlx::Error) -> Option<RetryableErrorClass> {
    match error {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code()?.parse::<i32>().ok()?;
            match code & 0xFF {
                SQLITE_BUSY => Some(RetryableErrorClass::Busy),
                SQLITE_LOCKED => Some(RetryableErrorClass::Locked),
                _ => None,
            }
        }
        sqlx::Error::PoolTimedOut => Some(RetryableErrorClass::PoolTimedOut),
        sqlx::Error::Io(_) => Some(RetryableErrorClass::Io),
        _ => None,
    }
}

/// Which errors are retried and how many retries one batch of results may spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retryable: Vec<RetryableErrorClass>,
    pub budget: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retryable: vec![RetryableErrorClass::Busy, RetryableErrorClass::Locked],
            budget: TRANSACTION_RETRIES,
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, error: &sqlx::Error) -> Option<RetryableErrorClass> {
        classify(error).filter(|class| self.retryable.contains(class))
    }

    /// Delays between attempts. The budget, not this iterator, bounds the attempts.
    ///
    /// `ExponentialBackoff` yields `factor * base^n`, so the base is the growth
    /// rate and the factor scales the first delay to `RETRY_INITIAL_DELAY_MS`.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(RETRY_FACTOR)
            .factor(RETRY_INITIAL_DELAY_MS / RETRY_FACTOR)
            .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
    }

    pub fn new_budget(&self) -> RetryBudget {
        RetryBudget::new(self.budget)
    }
}

/// Countdown of retries shared by every write of one persistence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    pub fn new(remaining: u32) -> Self {
        Self { remaining }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Takes one retry credit. Returns `false` once the budget is spent.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
