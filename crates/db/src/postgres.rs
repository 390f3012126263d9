use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::WrapErr;
use uuid::Uuid;

use tutormatch_core::{
    MatchError, MatchResult,
    booking::{self, SessionPlan},
    models::{
        match_log::MatchAttemptLog, registration::Registration, session::Session,
        time_slot::TimeSlot, tutor::Tutor,
    },
};

use crate::{
    DbPool,
    repositories::{match_log, registration, session, tutor},
    store::{Confirmation, EnrollOutcome, EnrollRefusal, MatchStore, TutorFilter},
};

fn db_error(err: sqlx::Error) -> MatchError {
    MatchError::Database(eyre::Report::new(err))
}

fn tutor_not_found(id: Uuid) -> MatchError {
    MatchError::NotFound(format!("tutor {id}"))
}

fn registration_not_found(id: Uuid) -> MatchError {
    MatchError::NotFound(format!("registration {id}"))
}

/// Postgres-backed store. Multi-row writes run in one transaction with the tutor and
/// registration rows locked `FOR UPDATE`; roster pushes use a conditional update.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl MatchStore for PgStore {
    async fn save_tutor(&self, tutor: &Tutor) -> MatchResult<()> {
        tutor::upsert_tutor(&self.pool, tutor).await?;
        Ok(())
    }

    async fn get_tutor(&self, id: Uuid) -> MatchResult<Option<Tutor>> {
        Ok(tutor::get_tutor_by_id(&self.pool, id).await?.map(Tutor::from))
    }

    async fn find_tutors(&self, filter: &TutorFilter) -> MatchResult<Vec<Tutor>> {
        let rows = tutor::find_tutors(&self.pool, filter.subject.as_deref(), filter.min_rating).await?;
        Ok(rows.into_iter().map(Tutor::from).collect())
    }

    async fn replace_tutor_availability(
        &self,
        tutor_id: Uuid,
        date: NaiveDate,
        slots: Vec<TimeSlot>,
    ) -> MatchResult<Tutor> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut locked: Tutor = tutor::lock_tutor(&mut *tx, tutor_id)
            .await?
            .ok_or_else(|| tutor_not_found(tutor_id))?
            .into();
        locked.availability.replace_day(date, slots)?;
        tutor::update_tutor_calendars(&mut *tx, &locked).await?;

        tx.commit().await.map_err(db_error)?;
        Ok(locked)
    }

    async fn save_session(&self, session: &Session) -> MatchResult<()> {
        session::upsert_session(&self.pool, session).await?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> MatchResult<Option<Session>> {
        match session::get_session_by_id(&self.pool, id).await? {
            Some(row) => Ok(Some(Session::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn open_sessions(&self, subject: &str) -> MatchResult<Vec<Session>> {
        let rows = session::find_open_sessions(&self.pool, subject).await?;
        let sessions = rows
            .into_iter()
            .map(Session::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    async fn enroll_and_register(
        &self,
        session_id: Uuid,
        new_registration: &Registration,
    ) -> MatchResult<EnrollOutcome> {
        let student_id = new_registration.student_id;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let Some(row) = session::push_student(&mut *tx, session_id, student_id).await? else {
            tx.rollback().await.map_err(db_error)?;
            let current = self.get_session(session_id).await?;
            return Ok(EnrollOutcome::Refused(EnrollRefusal::diagnose(
                current.as_ref(),
                student_id,
            )));
        };
        let enrolled = Session::try_from(row)?;
        registration::insert_registration(&mut *tx, new_registration).await?;

        tx.commit().await.wrap_err("committing session enrollment")?;
        Ok(EnrollOutcome::Enrolled(enrolled))
    }

    async fn insert_registration(&self, registration: &Registration) -> MatchResult<()> {
        registration::insert_registration(&self.pool, registration).await?;
        Ok(())
    }

    async fn get_registration(&self, id: Uuid) -> MatchResult<Option<Registration>> {
        match registration::get_registration_by_id(&self.pool, id).await? {
            Some(row) => Ok(Some(Registration::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn registrations_for_student(&self, student_id: Uuid) -> MatchResult<Vec<Registration>> {
        let rows = registration::get_registrations_by_student(&self.pool, student_id).await?;
        let registrations = rows
            .into_iter()
            .map(Registration::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(registrations)
    }

    async fn place_manual_hold(&self, new_registration: &Registration) -> MatchResult<()> {
        let tutor_id = new_registration
            .tutor_id
            .ok_or_else(|| MatchError::InvalidInput("manual request has no tutor".to_string()))?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut locked: Tutor = tutor::lock_tutor(&mut *tx, tutor_id)
            .await?
            .ok_or_else(|| tutor_not_found(tutor_id))?
            .into();
        booking::apply_manual_hold(&mut locked, new_registration)?;

        tutor::update_tutor_calendars(&mut *tx, &locked).await?;
        registration::insert_registration(&mut *tx, new_registration).await?;

        tx.commit()
            .await
            .wrap_err("committing manual request")?;
        Ok(())
    }

    async fn confirm_manual(&self, registration_id: Uuid, plan: SessionPlan) -> MatchResult<Confirmation> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut locked_registration = Registration::try_from(
            registration::lock_registration(&mut *tx, registration_id)
                .await?
                .ok_or_else(|| registration_not_found(registration_id))?,
        )?;
        let tutor_id = locked_registration.tutor_id.ok_or_else(|| {
            MatchError::InvalidTransition(format!("registration {registration_id} has no tutor"))
        })?;
        let mut locked_tutor: Tutor = tutor::lock_tutor(&mut *tx, tutor_id)
            .await?
            .ok_or_else(|| tutor_not_found(tutor_id))?
            .into();

        let sessions = session::lock_tutor_sessions(&mut *tx, tutor_id)
            .await?
            .into_iter()
            .map(Session::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        let existing = booking::extendable_session(&sessions, &locked_registration).cloned();

        let confirmed = booking::apply_confirmation(
            &mut locked_registration,
            &mut locked_tutor,
            existing,
            &plan,
        )?;

        session::upsert_session(&mut *tx, &confirmed).await?;
        tutor::update_tutor_calendars(&mut *tx, &locked_tutor).await?;
        registration::update_registration_outcome(&mut *tx, &locked_registration).await?;

        tx.commit().await.wrap_err("committing confirmation")?;

        Ok(Confirmation {
            registration: locked_registration,
            session: confirmed,
            tutor: locked_tutor,
        })
    }

    async fn reject_registration(&self, registration_id: Uuid) -> MatchResult<Registration> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut locked = Registration::try_from(
            registration::lock_registration(&mut *tx, registration_id)
                .await?
                .ok_or_else(|| registration_not_found(registration_id))?,
        )?;

        let mut locked_tutor: Option<Tutor> = match locked.tutor_id {
            Some(tutor_id) => tutor::lock_tutor(&mut *tx, tutor_id).await?.map(Tutor::from),
            None => None,
        };
        booking::apply_rejection(&mut locked, locked_tutor.as_mut())?;

        if let Some(released) = &locked_tutor {
            tutor::update_tutor_calendars(&mut *tx, released).await?;
        }
        registration::update_registration_outcome(&mut *tx, &locked).await?;

        tx.commit().await.wrap_err("committing rejection")?;
        Ok(locked)
    }

    async fn append_match_log(&self, log: &MatchAttemptLog) -> MatchResult<()> {
        match_log::insert_match_log(&self.pool, log).await?;
        Ok(())
    }

    async fn match_logs(&self) -> MatchResult<Vec<MatchAttemptLog>> {
        let rows = match_log::get_all_match_logs(&self.pool).await?;
        Ok(rows.into_iter().map(MatchAttemptLog::from).collect())
    }
}
