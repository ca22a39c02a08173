//! Repository for stored exam results.
//!
//! The store is append-only: `save` never overwrites or deduplicates. Should
//! two rows ever share an id, `get_by_id` deterministically returns the
//! earliest inserted one.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::ExamResult;

#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    id: String,
    exam_id: String,
    taken_at: DateTime<Utc>,
    time_spent_secs: i64,
    answers: String,
    breakdown: String,
}

impl ResultRow {
    fn into_result(self) -> Result<ExamResult> {
        Ok(ExamResult {
            id: self.id,
            exam_id: self.exam_id,
            taken_at: self.taken_at,
            time_spent_secs: self.time_spent_secs as u32,
            answers: serde_json::from_str(&self.answers)
                .context("Failed to decode stored answers")?,
            breakdown: serde_json::from_str(&self.breakdown)
                .context("Failed to decode stored score breakdown")?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, exam_id, taken_at, time_spent_secs, answers, breakdown FROM results";

/// Append a result. Persistence failures are loud errors; the caller decides
/// how to surface them (the attempt's in-memory breakdown stays presentable).
pub async fn save(pool: &SqlitePool, result: &ExamResult) -> Result<()> {
    let answers = serde_json::to_string(&result.answers).context("Failed to encode answers")?;
    let breakdown =
        serde_json::to_string(&result.breakdown).context("Failed to encode score breakdown")?;

    sqlx::query(
        r#"
        INSERT INTO results (id, exam_id, taken_at, time_spent_secs, answers, breakdown)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&result.id)
    .bind(&result.exam_id)
    .bind(result.taken_at)
    .bind(result.time_spent_secs as i64)
    .bind(answers)
    .bind(breakdown)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to save result '{}'", result.id))?;

    log::info!("Saved result '{}' for exam '{}'", result.id, result.exam_id);
    Ok(())
}

/// Earliest inserted row wins when an id appears more than once.
pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ExamResult>> {
    let row: Option<ResultRow> =
        sqlx::query_as(&format!("{} WHERE id = ? ORDER BY rowid ASC LIMIT 1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get result '{}'", id))?;

    row.map(ResultRow::into_result).transpose()
}

/// The most recent attempt by timestamp, or `None` on an empty store.
pub async fn get_latest(pool: &SqlitePool) -> Result<Option<ExamResult>> {
    let row: Option<ResultRow> = sqlx::query_as(&format!(
        "{} ORDER BY taken_at DESC, rowid DESC LIMIT 1",
        SELECT_COLUMNS
    ))
    .fetch_optional(pool)
    .await
    .context("Failed to get latest result")?;

    row.map(ResultRow::into_result).transpose()
}

/// All stored attempts, newest first.
pub async fn list(pool: &SqlitePool) -> Result<Vec<ExamResult>> {
    let rows: Vec<ResultRow> =
        sqlx::query_as(&format!("{} ORDER BY taken_at DESC, rowid DESC", SELECT_COLUMNS))
            .fetch_all(pool)
            .await
            .context("Failed to list results")?;

    rows.into_iter().map(ResultRow::into_result).collect()
}

/// Stored attempts for one exam, newest first.
pub async fn list_by_exam(pool: &SqlitePool, exam_id: &str) -> Result<Vec<ExamResult>> {
    let rows: Vec<ResultRow> = sqlx::query_as(&format!(
        "{} WHERE exam_id = ? ORDER BY taken_at DESC, rowid DESC",
        SELECT_COLUMNS
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list results for exam '{}'", exam_id))?;

    rows.into_iter().map(ResultRow::into_result).collect()
}
