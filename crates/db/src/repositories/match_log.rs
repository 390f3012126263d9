use eyre::Result;
use sqlx::{postgres::PgExecutor, types::Json};

use crate::models::{DbMatchAttemptLog, to_i32, to_i64};
use tutormatch_core::models::match_log::MatchAttemptLog;

pub async fn insert_match_log<'e, E: PgExecutor<'e>>(executor: E, log: &MatchAttemptLog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO match_attempt_logs (
            id, registration_id, attempted_at, success, match_score, processing_time_ms,
            failure_reason, candidate_tutors, selected_tutor_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(log.id)
    .bind(log.registration_id)
    .bind(log.attempted_at)
    .bind(log.success)
    .bind(to_i32(log.match_score))
    .bind(to_i64(log.processing_time_ms))
    .bind(log.failure_reason.as_deref())
    .bind(Json(&log.candidate_tutors))
    .bind(log.selected_tutor_id)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_all_match_logs<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<DbMatchAttemptLog>> {
    let logs = sqlx::query_as::<_, DbMatchAttemptLog>(
        r#"
        SELECT id, registration_id, attempted_at, success, match_score, processing_time_ms,
               failure_reason, candidate_tutors, selected_tutor_id
        FROM match_attempt_logs
        ORDER BY attempted_at ASC, id ASC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(logs)
}
