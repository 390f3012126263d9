//! Automatic matching: try to seat the student in an existing group session, fall back to
//! scoring individual tutors, and queue the request for a coordinator when nobody clears
//! the threshold.

use serde_json::json;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use tutormatch_core::{
    MatchError, MatchResult,
    models::{
        identity::{Caller, Role},
        match_log::{CandidateScore, MatchAttemptLog},
        matching::{AutoMatchRequest, AutoMatchResponse, MatchedParty},
        registration::{Registration, RegistrationStatus, RegistrationType},
        session::Session,
        tutor::Tutor,
    },
    notify::{NotificationKind, Recipient},
    scoring::{TutorDecision, rank_sessions, rank_tutors},
    search::{session_candidates, tutor_candidates},
};
use tutormatch_db::{EnrollOutcome, TutorFilter};

use crate::{MatchEngine, audit::AutoAttempt, manual::required_subject};

/// Result of the optimistic session step. Failures are carried as a reason, never raised.
#[derive(Debug)]
pub enum SessionStage {
    Enrolled {
        session: Session,
        registration: Registration,
        score: u32,
    },
    NoCandidate,
    Failed { reason: String },
}

#[derive(Debug)]
pub enum TutorStage {
    Matched {
        tutor: Tutor,
        score: u32,
        candidates: Vec<CandidateScore>,
    },
    Escalated {
        best_score: u32,
        candidates: Vec<CandidateScore>,
        reason: String,
    },
}

impl MatchEngine {
    /// Never fails for "no match"; that is a `CoordinatorReview` registration. Store
    /// failures are escalated to coordinators and then returned to the caller.
    #[instrument(skip(self, request), fields(student_id = %caller.id, subject = %request.subject))]
    pub async fn auto_match(&self, caller: &Caller, request: AutoMatchRequest) -> MatchResult<AutoMatchResponse> {
        caller.require(Role::Student)?;
        let subject = required_subject(&request.subject)?.to_string();
        if request.available_time_slots.is_empty() {
            return Err(MatchError::InvalidInput(
                "at least one available time slot is required".to_string(),
            ));
        }
        for slot in &request.available_time_slots {
            self.config.calendar.check_bounds(&slot.window()?)?;
        }

        let mut attempt = AutoAttempt::new(
            caller.id,
            subject,
            request.available_time_slots,
            request.description,
            request.priority_level.unwrap_or_default(),
        );

        match self.run_auto_pipeline(&mut attempt).await {
            Ok(response) => Ok(response),
            Err(err) => {
                self.escalate_failure(&attempt, &err).await;
                Err(err)
            }
        }
    }

    async fn run_auto_pipeline(&self, attempt: &mut AutoAttempt) -> MatchResult<AutoMatchResponse> {
        let session_fallback = match self.session_stage(attempt).await {
            SessionStage::Enrolled {
                session,
                registration,
                score,
            } => {
                return self
                    .finish_session_enrollment(attempt, session, registration, score)
                    .await;
            }
            SessionStage::NoCandidate => None,
            SessionStage::Failed { reason } => Some(reason),
        };

        match self.tutor_stage(attempt).await? {
            TutorStage::Matched {
                tutor,
                score,
                candidates,
            } => self.finish_tutor_match(attempt, tutor, score, candidates).await,
            TutorStage::Escalated {
                best_score,
                candidates,
                reason,
            } => {
                let reason = match session_fallback {
                    Some(session_reason) => format!("{reason} (session enrollment failed: {session_reason})"),
                    None => reason,
                };
                self.finish_review(attempt, best_score, candidates, reason).await
            }
        }
    }

    pub async fn session_stage(&self, attempt: &mut AutoAttempt) -> SessionStage {
        match self.enroll_in_best_session(attempt).await {
            Ok(stage) => stage,
            Err(err) => {
                warn!("session enrollment failed, falling back to tutors: {err}");
                SessionStage::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn enroll_in_best_session(&self, attempt: &mut AutoAttempt) -> MatchResult<SessionStage> {
        let sessions = self.store.open_sessions(&attempt.subject).await?;
        let candidates = session_candidates(
            &sessions,
            &attempt.subject,
            attempt.student_id,
            &attempt.requested,
        );
        if candidates.is_empty() {
            return Ok(SessionStage::NoCandidate);
        }

        let mut session_tutors: HashMap<_, Tutor> = HashMap::new();
        for candidate in &candidates {
            let tutor_id = candidate.session.tutor_id;
            if session_tutors.contains_key(&tutor_id) {
                continue;
            }
            if let Some(tutor) = self.store.get_tutor(tutor_id).await? {
                session_tutors.insert(tutor_id, tutor);
            }
        }

        let ranked = rank_sessions(&candidates, |tutor_id| session_tutors.get(&tutor_id));
        let Some(best) = ranked
            .first()
            .filter(|best| self.config.scoring.accepts_session(best.score))
        else {
            return Ok(SessionStage::NoCandidate);
        };
        let (session_id, tutor_id, score) = (
            best.candidate.session.id,
            best.candidate.session.tutor_id,
            best.score,
        );

        let mut registration = attempt.registration(
            RegistrationType::AutoSessionEnrollment,
            RegistrationStatus::Matched,
        );
        registration.session_id = Some(session_id);
        registration.tutor_id = Some(tutor_id);
        registration.match_score = score;

        match self.enroll_attempt(attempt, session_id, &registration).await? {
            EnrollOutcome::Enrolled(session) => Ok(SessionStage::Enrolled {
                session,
                registration,
                score,
            }),
            EnrollOutcome::Refused(refusal) => {
                warn!(%session_id, "lost the race for a session seat: {refusal}");
                Ok(SessionStage::Failed {
                    reason: format!("session {session_id}: {refusal}"),
                })
            }
        }
    }

    pub async fn tutor_stage(&self, attempt: &AutoAttempt) -> MatchResult<TutorStage> {
        let filter = TutorFilter {
            subject: Some(attempt.subject.clone()),
            min_rating: None,
        };
        let tutors = self.store.find_tutors(&filter).await?;
        let eligible = tutor_candidates(&tutors, &attempt.subject);
        let ranked = rank_tutors(&eligible, &attempt.requested);
        let candidates: Vec<CandidateScore> = ranked.iter().map(|scored| scored.as_candidate()).collect();

        let threshold = self.config.scoring.tutor_threshold;
        Ok(match self.config.scoring.decide(&ranked) {
            TutorDecision::Accept(best) => TutorStage::Matched {
                tutor: best.tutor.clone(),
                score: best.score,
                candidates,
            },
            TutorDecision::Escalate { best: None } => TutorStage::Escalated {
                best_score: 0,
                candidates,
                reason: format!("no tutor teaches '{}'", attempt.subject),
            },
            TutorDecision::Escalate { best: Some(best) } => TutorStage::Escalated {
                best_score: best.score,
                candidates,
                reason: format!(
                    "best tutor score {} is below the threshold of {threshold}",
                    best.score
                ),
            },
        })
    }

    async fn finish_session_enrollment(
        &self,
        attempt: &mut AutoAttempt,
        session: Session,
        registration: Registration,
        score: u32,
    ) -> MatchResult<AutoMatchResponse> {
        let elapsed = attempt.elapsed_ms();
        let candidates = vec![CandidateScore {
            tutor_id: session.tutor_id,
            score,
        }];
        let log = MatchAttemptLog::succeeded(registration.id, score, elapsed, candidates, Some(session.tutor_id));
        self.log_attempt(attempt, log).await?;

        info!(session_id = %session.id, score, "student enrolled in group session");
        let payload = json!({
            "registration_id": registration.id,
            "session_id": session.id,
            "subject": session.subject,
        });
        self.notifier.notify(
            NotificationKind::SessionEnrolled,
            Recipient::Student(attempt.student_id),
            payload.clone(),
        );
        self.notifier.notify(
            NotificationKind::SessionEnrolled,
            Recipient::Tutor(session.tutor_id),
            payload,
        );

        Ok(AutoMatchResponse {
            registration,
            matched: Some(MatchedParty::from(&session)),
            match_score: score,
        })
    }

    async fn finish_tutor_match(
        &self,
        attempt: &mut AutoAttempt,
        tutor: Tutor,
        score: u32,
        candidates: Vec<CandidateScore>,
    ) -> MatchResult<AutoMatchResponse> {
        let mut registration = attempt.registration(RegistrationType::Auto, RegistrationStatus::Matched);
        registration.tutor_id = Some(tutor.id);
        registration.match_score = score;
        self.save_attempt_registration(attempt, &registration).await?;

        let elapsed = attempt.elapsed_ms();
        let log = MatchAttemptLog::succeeded(registration.id, score, elapsed, candidates, Some(tutor.id));
        self.log_attempt(attempt, log).await?;

        info!(tutor_id = %tutor.id, score, "student matched with tutor");
        let payload = json!({
            "registration_id": registration.id,
            "student_id": attempt.student_id,
            "tutor_id": tutor.id,
            "subject": registration.subject,
            "match_score": score,
        });
        self.notifier.notify(
            NotificationKind::TutorMatched,
            Recipient::Student(attempt.student_id),
            payload.clone(),
        );
        self.notifier
            .notify(NotificationKind::TutorMatched, Recipient::Tutor(tutor.id), payload);

        Ok(AutoMatchResponse {
            registration,
            matched: Some(MatchedParty::from(&tutor)),
            match_score: score,
        })
    }

    async fn finish_review(
        &self,
        attempt: &mut AutoAttempt,
        best_score: u32,
        candidates: Vec<CandidateScore>,
        reason: String,
    ) -> MatchResult<AutoMatchResponse> {
        let mut registration = attempt.registration(
            RegistrationType::Auto,
            RegistrationStatus::CoordinatorReview,
        );
        registration.match_score = best_score;
        self.save_attempt_registration(attempt, &registration).await?;

        let elapsed = attempt.elapsed_ms();
        let log = MatchAttemptLog::failed(registration.id, best_score, elapsed, reason.clone(), candidates);
        self.log_attempt(attempt, log).await?;

        info!(best_score, "no acceptable match, queued for coordinator review: {reason}");
        self.notifier.notify(
            NotificationKind::CoordinatorReview,
            Recipient::Coordinators,
            json!({
                "registration_id": registration.id,
                "student_id": attempt.student_id,
                "subject": registration.subject,
                "priority_level": registration.priority_level,
                "reason": reason,
            }),
        );
        self.notifier.notify(
            NotificationKind::CoordinatorReview,
            Recipient::Student(attempt.student_id),
            json!({
                "registration_id": registration.id,
                "subject": registration.subject,
            }),
        );

        Ok(AutoMatchResponse {
            registration,
            matched: None,
            match_score: best_score,
        })
    }
}
