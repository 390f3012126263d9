/// Coordinator analytics over the match attempt log
pub mod analytics;
/// Manual and automatic match requests
pub mod match_requests;
/// Tutor directory and calendars
pub mod tutors;
