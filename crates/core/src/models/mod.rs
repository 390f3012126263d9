pub mod identity;
pub mod match_log;
pub mod matching;
pub mod registration;
pub mod schedule;
pub mod session;
pub mod time_slot;
pub mod tutor;

/// Case-folded form of a subject. Every subject comparison goes through this, including the
/// parameters bound into SQL, so all backends agree on non-ASCII subjects.
pub fn subject_key(subject: &str) -> String {
    subject.trim().to_lowercase()
}
