use eyre::Result;
use sqlx::{postgres::PgExecutor, types::Json};
use uuid::Uuid;

use crate::models::{DbSession, to_i32};
use tutormatch_core::models::{session::Session, subject_key};

pub async fn upsert_session<'e, E: PgExecutor<'e>>(executor: E, session: &Session) -> Result<()> {
    tracing::debug!(
        "Upserting session: id={}, tutor_id={}, enrolled={}/{}",
        session.id,
        session.tutor_id,
        session.enrolled(),
        session.capacity
    );

    sqlx::query(
        r#"
        INSERT INTO sessions (id, subject, tutor_id, capacity, students, schedule, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO UPDATE SET
            subject = EXCLUDED.subject,
            capacity = EXCLUDED.capacity,
            students = EXCLUDED.students,
            schedule = EXCLUDED.schedule,
            status = EXCLUDED.status
        "#,
    )
    .bind(session.id)
    .bind(&session.subject)
    .bind(session.tutor_id)
    .bind(to_i32(session.capacity))
    .bind(session.students.iter().copied().collect::<Vec<Uuid>>())
    .bind(Json(&session.schedule))
    .bind(session.status.as_str())
    .bind(session.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_session_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT id, subject, tutor_id, capacity, students, schedule, status, created_at
        FROM sessions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}

/// Scheduled sessions with a free seat whose subject contains `subject`, case-insensitively.
pub async fn find_open_sessions<'e, E: PgExecutor<'e>>(executor: E, subject: &str) -> Result<Vec<DbSession>> {
    let sessions = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT id, subject, tutor_id, capacity, students, schedule, status, created_at
        FROM sessions
        WHERE status = 'scheduled'
          AND cardinality(students) < capacity
          AND strpos(lower(subject), $1) > 0
        ORDER BY id ASC
        "#,
    )
    .bind(subject_key(subject))
    .fetch_all(executor)
    .await?;

    Ok(sessions)
}

/// Row-locks every scheduled session of the tutor.
pub async fn lock_tutor_sessions<'e, E: PgExecutor<'e>>(executor: E, tutor_id: Uuid) -> Result<Vec<DbSession>> {
    let sessions = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT id, subject, tutor_id, capacity, students, schedule, status, created_at
        FROM sessions
        WHERE tutor_id = $1 AND status = 'scheduled'
        ORDER BY id ASC
        FOR UPDATE
        "#,
    )
    .bind(tutor_id)
    .fetch_all(executor)
    .await?;

    Ok(sessions)
}

/// Conditional roster push. Returns `None` when the session is missing, not scheduled,
/// full or already has the student; the row is left untouched in that case.
pub async fn push_student<'e, E: PgExecutor<'e>>(
    executor: E,
    session_id: Uuid,
    student_id: Uuid,
) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        UPDATE sessions
        SET students = array_append(students, $2)
        WHERE id = $1
          AND status = 'scheduled'
          AND cardinality(students) < capacity
          AND NOT ($2 = ANY(students))
        RETURNING id, subject, tutor_id, capacity, students, schedule, status, created_at
        "#,
    )
    .bind(session_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}
