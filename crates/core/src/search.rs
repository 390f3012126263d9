//! Candidate enumeration for automatic matching: open group sessions first, then tutors.

use uuid::Uuid;

use crate::availability::session_time_overlap_score;
use crate::models::{session::Session, time_slot::RequestedSlot, tutor::Tutor};

#[derive(Debug, Clone, Copy)]
pub struct SessionCandidate<'a> {
    pub session: &'a Session,
    pub overlap_score: u32,
}

/// Scheduled sessions covering `subject` with a free seat that `student` has not already joined,
/// keeping only those with non-zero time overlap. Ranked by overlap descending, then session id.
pub fn session_candidates<'a>(
    sessions: &'a [Session],
    subject: &str,
    student: Uuid,
    requested: &[RequestedSlot],
) -> Vec<SessionCandidate<'a>> {
    let mut candidates: Vec<SessionCandidate<'a>> = sessions
        .iter()
        .filter(|session| session.covers_subject(subject) && session.accepts(student))
        .map(|session| SessionCandidate {
            session,
            overlap_score: session_time_overlap_score(&session.schedule, requested),
        })
        .filter(|candidate| candidate.overlap_score > 0)
        .collect();

    candidates.sort_by(|a, b| {
        b.overlap_score
            .cmp(&a.overlap_score)
            .then_with(|| a.session.id.cmp(&b.session.id))
    });
    candidates
}

/// Every tutor with the subject in their expertise. No further filtering; scoring decides.
pub fn tutor_candidates<'a>(tutors: &'a [Tutor], subject: &str) -> Vec<&'a Tutor> {
    tutors.iter().filter(|tutor| tutor.teaches(subject)).collect()
}
