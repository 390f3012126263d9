use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Calendars are stored as JSONB keyed by ISO date
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tutors (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            expertise TEXT[] NOT NULL DEFAULT '{}',
            rating DOUBLE PRECISION NOT NULL DEFAULT 0,
            active_students INTEGER NOT NULL DEFAULT 0,
            availability JSONB NOT NULL DEFAULT '{}'::jsonb,
            booked_slots JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_rating CHECK (rating >= 0 AND rating <= 5),
            CONSTRAINT valid_active_students CHECK (active_students >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id UUID PRIMARY KEY,
            subject VARCHAR(255) NOT NULL,
            tutor_id UUID NOT NULL REFERENCES tutors(id),
            capacity INTEGER NOT NULL,
            students UUID[] NOT NULL DEFAULT '{}',
            schedule JSONB NOT NULL DEFAULT '{}'::jsonb,
            status VARCHAR(32) NOT NULL DEFAULT 'scheduled',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_capacity CHECK (capacity > 0),
            CONSTRAINT roster_within_capacity CHECK (cardinality(students) <= capacity)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS registrations (
            id UUID PRIMARY KEY,
            student_id UUID NOT NULL,
            tutor_id UUID NULL REFERENCES tutors(id),
            session_id UUID NULL REFERENCES sessions(id),
            subject VARCHAR(255) NOT NULL,
            preferred_time_slots JSONB NOT NULL DEFAULT '[]'::jsonb,
            requested_slot JSONB NULL,
            description TEXT NULL,
            priority_level VARCHAR(16) NOT NULL DEFAULT 'normal',
            status VARCHAR(32) NOT NULL,
            registration_type VARCHAR(32) NOT NULL,
            match_score INTEGER NOT NULL DEFAULT 0,
            processing_time_ms BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS match_attempt_logs (
            id UUID PRIMARY KEY,
            registration_id UUID NOT NULL,
            attempted_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            success BOOLEAN NOT NULL,
            match_score INTEGER NOT NULL DEFAULT 0,
            processing_time_ms BIGINT NOT NULL DEFAULT 0,
            failure_reason TEXT NULL,
            candidate_tutors JSONB NOT NULL DEFAULT '[]'::jsonb,
            selected_tutor_id UUID NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_tutors_rating ON tutors(rating DESC, id)",
        "CREATE INDEX IF NOT EXISTS idx_tutors_expertise ON tutors USING GIN (expertise)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_tutor_id ON sessions(tutor_id)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status)",
        "CREATE INDEX IF NOT EXISTS idx_registrations_student_id ON registrations(student_id)",
        "CREATE INDEX IF NOT EXISTS idx_registrations_tutor_id ON registrations(tutor_id)",
        "CREATE INDEX IF NOT EXISTS idx_match_attempt_logs_registration_id ON match_attempt_logs(registration_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
