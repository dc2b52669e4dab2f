//! Retrying persistence of monitoring results.
//!
//! Every write runs in its own transaction. A failed transaction is retried
//! only when its error belongs to one of the policy's retryable classes and
//! the shared budget still has credit; anything else aborts the run.

use std::future::Future;
use std::path::Path;

use log::{error, warn};
use sqlx::SqlitePool;
use tokio_retry::RetryIf;

use crate::error_handling::StoreError;
use crate::models::{MonitoringResults, SequenceResult, StepResult};
use crate::storage::insert::{insert_sequence_result, insert_step_results};
use crate::storage::migrations::run_migrations;
use crate::storage::pool::init_db_pool_with_path;
use crate::storage::retry::{RetryBudget, RetryPolicy};

/// Writes sequence results to the database.
#[derive(Debug, Clone)]
pub struct ResultStore {
    pool: SqlitePool,
    policy: RetryPolicy,
}

impl ResultStore {
    pub fn new(pool: SqlitePool, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    /// Opens (creating if needed) the database at `db_path` and brings its
    /// schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the file cannot be created or opened,
    /// or if a migration fails.
    pub async fn open(db_path: &Path, policy: RetryPolicy) -> Result<Self, StoreError> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool, policy))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Stores every result with one shared retry budget.
    ///
    /// Returns the generated ids in result order.
    pub async fn store_all(&self, results: &MonitoringResults) -> Result<Vec<i64>, StoreError> {
        let mut budget = self.policy.new_budget();
        let mut ids = Vec::with_capacity(results.results().len());
        for result in results.results() {
            let id = self.store(result, &mut budget).await?;
            self.store_steps(id, &result.step_results, &mut budget).await?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Inserts the sequence row and returns its generated id.
    pub async fn store(
        &self,
        result: &SequenceResult,
        budget: &mut RetryBudget,
    ) -> Result<i64, StoreError> {
        let pool = &self.pool;
        let id = self
            .with_retry(budget, "monitoring_result", || async move {
                let mut tx = pool.begin().await?;
                let id = insert_sequence_result(&mut tx, result).await?;
                if id.is_some() {
                    tx.commit().await?;
                }
                Ok(id)
            })
            .await?;
        id.ok_or(StoreError::MissingGeneratedKey)
    }

    /// Inserts the step rows of one stored sequence.
    pub async fn store_steps(
        &self,
        result_id: i64,
        steps: &[StepResult],
        budget: &mut RetryBudget,
    ) -> Result<(), StoreError> {
        let pool = &self.pool;
        self.with_retry(budget, "monitoring_step_result", || async move {
            let mut tx = pool.begin().await?;
            insert_step_results(&mut tx, result_id, steps).await?;
            tx.commit().await
        })
        .await
    }

    /// Runs `action` until it succeeds, fails with a non-retryable error or
    /// the budget runs out, waiting on the policy's backoff between attempts.
    pub async fn with_retry<T, A, Fut>(
        &self,
        budget: &mut RetryBudget,
        operation: &str,
        action: A,
    ) -> Result<T, StoreError>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let mut exhausted = false;
        let policy = &self.policy;
        let condition = |e: &sqlx::Error| {
            let Some(class) = policy.is_retryable(e) else {
                return false;
            };
            if budget.try_consume() {
                warn!(
                    "Retryable {} error storing {} ({} retries left): {}",
                    class,
                    operation,
                    budget.remaining(),
                    e
                );
                true
            } else {
                exhausted = true;
                false
            }
        };

        let outcome = RetryIf::start(policy.strategy(), action, condition).await;
        outcome.map_err(|e| {
            if exhausted {
                warn!("Retry limit exceeded storing {}: {}", operation, e);
                StoreError::RetriesExhausted(e)
            } else {
                error!("Storing {} failed: {}", operation, e);
                StoreError::Fatal(e)
            }
        })
    }
}
