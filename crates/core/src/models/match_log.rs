use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub tutor_id: Uuid,
    pub score: u32,
}

/// Append-only audit record, one per attempt. Never read by the matcher itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAttemptLog {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub attempted_at: DateTime<Utc>,
    pub success: bool,
    pub match_score: u32,
    pub processing_time_ms: u64,
    pub failure_reason: Option<String>,
    pub candidate_tutors: Vec<CandidateScore>,
    pub selected_tutor_id: Option<Uuid>,
}

impl MatchAttemptLog {
    pub fn succeeded(
        registration_id: Uuid,
        match_score: u32,
        processing_time_ms: u64,
        candidate_tutors: Vec<CandidateScore>,
        selected_tutor_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            registration_id,
            attempted_at: Utc::now(),
            success: true,
            match_score,
            processing_time_ms,
            failure_reason: None,
            candidate_tutors,
            selected_tutor_id,
        }
    }

    pub fn failed(
        registration_id: Uuid,
        match_score: u32,
        processing_time_ms: u64,
        failure_reason: impl Into<String>,
        candidate_tutors: Vec<CandidateScore>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            registration_id,
            attempted_at: Utc::now(),
            success: false,
            match_score,
            processing_time_ms,
            failure_reason: Some(failure_reason.into()),
            candidate_tutors,
            selected_tutor_id: None,
        }
    }
}

/// Aggregate view over the attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalytics {
    pub total_attempts: u64,
    pub successful_attempts: u64,
    pub success_rate: f64,
    pub average_processing_time_ms: f64,
}

impl MatchAnalytics {
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a MatchAttemptLog>) -> Self {
        let (mut total, mut successes, mut elapsed) = (0u64, 0u64, 0u128);
        for log in logs {
            total += 1;
            successes += u64::from(log.success);
            elapsed += u128::from(log.processing_time_ms);
        }

        if total == 0 {
            return Self {
                total_attempts: 0,
                successful_attempts: 0,
                success_rate: 0.0,
                average_processing_time_ms: 0.0,
            };
        }

        Self {
            total_attempts: total,
            successful_attempts: successes,
            success_rate: successes as f64 / total as f64,
            average_processing_time_ms: elapsed as f64 / total as f64,
        }
    }
}
