pub mod analytics;
pub mod health;
pub mod match_requests;
pub mod tutors;
