//! # TutorMatch Core
//!
//! Domain types and the pure matching algorithms: the time-slot calendar model,
//! availability queries, candidate search and scoring. Nothing in this crate
//! performs I/O; the store and the booking engine live in sibling crates.

pub mod availability;
pub mod booking;
pub mod errors;
pub mod models;
pub mod notify;
pub mod scoring;
pub mod search;

pub use errors::{MatchError, MatchResult};
