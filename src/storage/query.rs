//! Reading persisted monitoring results back into the result model.

use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::models::{SequenceResult, StepResult};

/// Loads one stored sequence result with its steps in phase order.
pub async fn load_sequence_result(
    pool: &SqlitePool,
    result_id: i64,
) -> Result<Option<SequenceResult>, DatabaseError> {
    let Some(row) = sqlx::query(
        "SELECT source_id, start_time, end_time FROM monitoring_result WHERE id = ?",
    )
    .bind(result_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let step_results = sqlx::query(
        "SELECT step_id, phase_id, error_message, start_time, end_time
         FROM monitoring_step_result
         WHERE result_id = ?
         ORDER BY phase_id, id",
    )
    .bind(result_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|step| StepResult {
        id: step.get("step_id"),
        phase_id: step.get("phase_id"),
        start_time: step.get("start_time"),
        end_time: step.get("end_time"),
        error_message: step.get("error_message"),
        validation_error: None,
    })
    .collect();

    Ok(Some(SequenceResult {
        id: row.get("source_id"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        step_results,
    }))
}

/// Ids of the stored results for a sequence, newest first.
pub async fn result_ids_for_source(
    pool: &SqlitePool,
    source_id: &str,
) -> Result<Vec<i64>, DatabaseError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM monitoring_result WHERE source_id = ? ORDER BY start_time DESC, id DESC",
    )
    .bind(source_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Every stored result of a sequence, newest first.
pub async fn load_sequence_results(
    pool: &SqlitePool,
    source_id: &str,
) -> Result<Vec<SequenceResult>, DatabaseError> {
    let mut results = Vec::new();
    for id in result_ids_for_source(pool, source_id).await? {
        if let Some(result) = load_sequence_result(pool, id).await? {
            results.push(result);
        }
    }
    Ok(results)
}
