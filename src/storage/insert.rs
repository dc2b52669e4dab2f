//! Database insert operations.
//!
//! Each function runs on a connection the caller has already opened a
//! transaction on; committing is left to the caller.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::models::{SequenceResult, StepResult};

/// Inserts the sequence row and returns its generated id.
///
/// Returns `Ok(None)` if the database did not hand back an id.
pub async fn insert_sequence_result(
    conn: &mut SqliteConnection,
    result: &SequenceResult,
) -> Result<Option<i64>, sqlx::Error> {
    log::debug!("Inserting monitoring result for {}", result.id);
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO monitoring_result (source_id, start_time, end_time)
         VALUES (?, ?, ?)
         RETURNING id",
    )
    .bind(&result.id)
    .bind(result.start_time)
    .bind(result.end_time)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(id) = id {
        log::debug!("Found key {}", id);
    }
    Ok(id)
}

/// Inserts every step row of one sequence as a single multi-row statement.
pub async fn insert_step_results(
    conn: &mut SqliteConnection,
    result_id: i64,
    steps: &[StepResult],
) -> Result<(), sqlx::Error> {
    if steps.is_empty() {
        log::debug!("No step results exists to be stored");
        return Ok(());
    }
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO monitoring_step_result
         (result_id, phase_id, step_id, error_message, start_time, end_time) ",
    );
    builder.push_values(steps, |mut row, step| {
        row.push_bind(result_id)
            .push_bind(step.phase_id)
            .push_bind(step.id.clone())
            .push_bind(step.error_message.clone())
            .push_bind(step.start_time)
            .push_bind(step.end_time);
    });
    builder.build().execute(&mut *conn).await?;
    log::trace!("Batch of {} step results executed", steps.len());
    Ok(())
}
