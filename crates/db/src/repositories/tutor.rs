use eyre::Result;
use sqlx::{postgres::PgExecutor, types::Json};
use uuid::Uuid;

use crate::models::{DbTutor, to_i32};
use tutormatch_core::models::{subject_key, tutor::Tutor};

pub async fn upsert_tutor<'e, E: PgExecutor<'e>>(executor: E, tutor: &Tutor) -> Result<()> {
    tracing::debug!("Upserting tutor: id={}, name={}", tutor.id, tutor.name);

    sqlx::query(
        r#"
        INSERT INTO tutors (id, name, expertise, rating, active_students, availability, booked_slots)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            expertise = EXCLUDED.expertise,
            rating = EXCLUDED.rating,
            active_students = EXCLUDED.active_students,
            availability = EXCLUDED.availability,
            booked_slots = EXCLUDED.booked_slots
        "#,
    )
    .bind(tutor.id)
    .bind(&tutor.name)
    .bind(tutor.expertise.iter().cloned().collect::<Vec<String>>())
    .bind(tutor.rating)
    .bind(to_i32(tutor.active_students))
    .bind(Json(&tutor.availability))
    .bind(Json(&tutor.booked_slots))
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_tutor_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbTutor>> {
    let tutor = sqlx::query_as::<_, DbTutor>(
        r#"
        SELECT id, name, expertise, rating, active_students, availability, booked_slots
        FROM tutors
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(tutor)
}

/// Row-locks the tutor for the rest of the surrounding transaction.
pub async fn lock_tutor<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbTutor>> {
    let tutor = sqlx::query_as::<_, DbTutor>(
        r#"
        SELECT id, name, expertise, rating, active_students, availability, booked_slots
        FROM tutors
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(tutor)
}

/// Tutors teaching `subject` (case-insensitive, exact) with at least `min_rating`.
/// Either filter may be omitted. Ordered by rating descending, then id. `subject` is folded
/// with [`subject_key`] before binding.
pub async fn find_tutors<'e, E: PgExecutor<'e>>(
    executor: E,
    subject: Option<&str>,
    min_rating: Option<f64>,
) -> Result<Vec<DbTutor>> {
    let tutors = sqlx::query_as::<_, DbTutor>(
        r#"
        SELECT id, name, expertise, rating, active_students, availability, booked_slots
        FROM tutors
        WHERE ($1::TEXT IS NULL OR EXISTS (
                SELECT 1 FROM unnest(expertise) AS topic
                WHERE lower(trim(topic)) = $1::TEXT
              ))
          AND ($2::DOUBLE PRECISION IS NULL OR rating >= $2::DOUBLE PRECISION)
        ORDER BY rating DESC, id ASC
        "#,
    )
    .bind(subject.map(subject_key))
    .bind(min_rating)
    .fetch_all(executor)
    .await?;

    Ok(tutors)
}

/// Writes back the fields the booking engine owns.
pub async fn update_tutor_calendars<'e, E: PgExecutor<'e>>(executor: E, tutor: &Tutor) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tutors
        SET availability = $2, booked_slots = $3, active_students = $4
        WHERE id = $1
        "#,
    )
    .bind(tutor.id)
    .bind(Json(&tutor.availability))
    .bind(Json(&tutor.booked_slots))
    .bind(to_i32(tutor.active_students))
    .execute(executor)
    .await?;

    Ok(())
}
