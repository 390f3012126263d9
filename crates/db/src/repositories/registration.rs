use eyre::Result;
use sqlx::{postgres::PgExecutor, types::Json};
use uuid::Uuid;

use crate::models::{DbRegistration, to_i32, to_i64};
use tutormatch_core::models::registration::Registration;

pub async fn insert_registration<'e, E: PgExecutor<'e>>(executor: E, registration: &Registration) -> Result<()> {
    tracing::debug!(
        "Inserting registration: id={}, student_id={}, type={}, status={}",
        registration.id,
        registration.student_id,
        registration.registration_type.as_str(),
        registration.status
    );

    sqlx::query(
        r#"
        INSERT INTO registrations (
            id, student_id, tutor_id, session_id, subject, preferred_time_slots, requested_slot,
            description, priority_level, status, registration_type, match_score,
            processing_time_ms, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(registration.id)
    .bind(registration.student_id)
    .bind(registration.tutor_id)
    .bind(registration.session_id)
    .bind(&registration.subject)
    .bind(Json(&registration.preferred_time_slots))
    .bind(registration.requested_slot.map(Json))
    .bind(registration.description.as_deref())
    .bind(registration.priority_level.as_str())
    .bind(registration.status.as_str())
    .bind(registration.registration_type.as_str())
    .bind(to_i32(registration.match_score))
    .bind(to_i64(registration.processing_time_ms))
    .bind(registration.created_at)
    .bind(registration.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_registration_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<DbRegistration>> {
    let registration = sqlx::query_as::<_, DbRegistration>(
        r#"
        SELECT id, student_id, tutor_id, session_id, subject, preferred_time_slots, requested_slot,
               description, priority_level, status, registration_type, match_score,
               processing_time_ms, created_at, updated_at
        FROM registrations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(registration)
}

pub async fn lock_registration<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbRegistration>> {
    let registration = sqlx::query_as::<_, DbRegistration>(
        r#"
        SELECT id, student_id, tutor_id, session_id, subject, preferred_time_slots, requested_slot,
               description, priority_level, status, registration_type, match_score,
               processing_time_ms, created_at, updated_at
        FROM registrations
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(registration)
}

/// Newest first.
pub async fn get_registrations_by_student<'e, E: PgExecutor<'e>>(
    executor: E,
    student_id: Uuid,
) -> Result<Vec<DbRegistration>> {
    let registrations = sqlx::query_as::<_, DbRegistration>(
        r#"
        SELECT id, student_id, tutor_id, session_id, subject, preferred_time_slots, requested_slot,
               description, priority_level, status, registration_type, match_score,
               processing_time_ms, created_at, updated_at
        FROM registrations
        WHERE student_id = $1
        ORDER BY created_at DESC, id ASC
        "#,
    )
    .bind(student_id)
    .fetch_all(executor)
    .await?;

    Ok(registrations)
}

/// Persists a status transition together with the links it may have filled in.
pub async fn update_registration_outcome<'e, E: PgExecutor<'e>>(
    executor: E,
    registration: &Registration,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE registrations
        SET status = $2, tutor_id = $3, session_id = $4, updated_at = $5
        WHERE id = $1
        "#,
    )
    .bind(registration.id)
    .bind(registration.status.as_str())
    .bind(registration.tutor_id)
    .bind(registration.session_id)
    .bind(registration.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}
