//! Candidate scoring and the accept/escalate decision.
//!
//! Session candidates are accepted on any non-zero score, while tutor candidates must
//! clear [`ScoringPolicy::tutor_threshold`]. The asymmetry is long-standing behaviour
//! that callers depend on and is kept as-is.

use uuid::Uuid;

use crate::availability::tutor_has_window;
use crate::models::{match_log::CandidateScore, time_slot::RequestedSlot, tutor::Tutor};
use crate::search::SessionCandidate;

pub const DEFAULT_TUTOR_THRESHOLD: u32 = 10;

pub const WINDOW_MATCH_POINTS: u32 = 10;
pub const HIGH_RATING_POINTS: u32 = 5;
pub const HIGH_RATING_CUTOFF: f64 = 4.5;
pub const LIGHT_LOAD_POINTS: u32 = 2;
pub const LIGHT_LOAD_LIMIT: u32 = 5;
pub const SPARE_SEATS_POINTS: u32 = 2;
pub const SPARE_SEATS_MIN: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub tutor_threshold: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            tutor_threshold: DEFAULT_TUTOR_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredTutor<'a> {
    pub tutor: &'a Tutor,
    pub score: u32,
}

impl ScoredTutor<'_> {
    pub fn as_candidate(&self) -> CandidateScore {
        CandidateScore {
            tutor_id: self.tutor.id,
            score: self.score,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredSession<'a> {
    pub candidate: SessionCandidate<'a>,
    pub score: u32,
}

#[derive(Debug, Clone, Copy)]
pub enum TutorDecision<'a> {
    Accept(ScoredTutor<'a>),
    Escalate { best: Option<ScoredTutor<'a>> },
}

fn rating_bonus(rating: f64) -> u32 {
    if rating > HIGH_RATING_CUTOFF {
        HIGH_RATING_POINTS
    } else {
        0
    }
}

/// Window fit (boolean, no partial credit) plus rating and load bonuses.
pub fn score_tutor(tutor: &Tutor, requested: &[RequestedSlot]) -> u32 {
    let window = if tutor_has_window(tutor, requested) {
        WINDOW_MATCH_POINTS
    } else {
        0
    };
    let load = if tutor.active_students < LIGHT_LOAD_LIMIT {
        LIGHT_LOAD_POINTS
    } else {
        0
    };
    window + rating_bonus(tutor.rating) + load
}

/// Overlap score plus the session tutor's rating bonus and a bonus for plenty of free seats.
pub fn score_session(candidate: &SessionCandidate<'_>, session_tutor: Option<&Tutor>) -> u32 {
    let rating = session_tutor.map(|tutor| rating_bonus(tutor.rating)).unwrap_or(0);
    let seats = if candidate.session.seats_left() > SPARE_SEATS_MIN {
        SPARE_SEATS_POINTS
    } else {
        0
    };
    candidate.overlap_score + rating + seats
}

/// Highest score first; equal scores fall back to ascending tutor id.
pub fn rank_tutors<'a>(tutors: &[&'a Tutor], requested: &[RequestedSlot]) -> Vec<ScoredTutor<'a>> {
    let mut ranked: Vec<ScoredTutor<'a>> = tutors
        .iter()
        .map(|&tutor| ScoredTutor {
            tutor,
            score: score_tutor(tutor, requested),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.tutor.id.cmp(&b.tutor.id)));
    ranked
}

/// Highest score first; equal scores fall back to ascending session id.
pub fn rank_sessions<'a, 't>(
    candidates: &[SessionCandidate<'a>],
    tutor_of: impl Fn(Uuid) -> Option<&'t Tutor>,
) -> Vec<ScoredSession<'a>> {
    let mut ranked: Vec<ScoredSession<'a>> = candidates
        .iter()
        .map(|candidate| ScoredSession {
            candidate: *candidate,
            score: score_session(candidate, tutor_of(candidate.session.tutor_id)),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.candidate.session.id.cmp(&b.candidate.session.id))
    });
    ranked
}

impl ScoringPolicy {
    /// Any overlap at all is enough for a session.
    pub fn accepts_session(&self, score: u32) -> bool {
        score > 0
    }

    pub fn decide<'a>(&self, ranked: &[ScoredTutor<'a>]) -> TutorDecision<'a> {
        match ranked.first() {
            Some(best) if best.score >= self.tutor_threshold => TutorDecision::Accept(*best),
            best => TutorDecision::Escalate { best: best.copied() },
        }
    }
}
