//! Shared test helpers for storage module tests.

use sqlx::SqlitePool;

use crate::models::{SequenceResult, StepResult};
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A finished three-phase run whose last phase failed.
pub fn sample_result() -> SequenceResult {
    let step = |id: &str, phase_id: i32, start: i64, end: i64, error: Option<&str>| StepResult {
        id: id.to_string(),
        phase_id,
        start_time: start,
        end_time: end,
        error_message: error.map(str::to_string),
        validation_error: None,
    };
    SequenceResult {
        id: "haka-sp".to_string(),
        start_time: 1_704_067_200_000,
        end_time: 1_704_067_200_900,
        step_results: vec![
            step("sp", 0, 1_704_067_200_000, 1_704_067_200_150, None),
            step("idp", 1, 1_704_067_200_150, 1_704_067_200_700, None),
            step(
                "sp",
                3,
                1_704_067_200_700,
                1_704_067_200_900,
                Some("Expected string 'Welcome' missing!"),
            ),
        ],
    }
}
