//! Matching policy knobs, read from the environment.
//!
//! - `MATCH_TUTOR_THRESHOLD`: minimum tutor score for an automatic match (default: 10)
//! - `MATCH_SLOT_GRANULARITY_MINUTES`: alignment of published availability (default: 60)
//! - `MATCH_DAY_START` / `MATCH_DAY_END`: bookable part of the day (default: 07:00 / 17:00)
//! - `MATCH_SESSION_CAPACITY`: seats in a session created by a confirmation (default: 5)
//! - `MATCH_LISTING_MAX_LIMIT`: largest page size for tutor listings (default: 50)

use eyre::{Result, WrapErr, eyre};
use std::env;

use tutormatch_core::{
    models::time_slot::{CalendarPolicy, TimeOfDay},
    scoring::{DEFAULT_TUTOR_THRESHOLD, ScoringPolicy},
};

pub const DEFAULT_SESSION_CAPACITY: u32 = 5;
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_LISTING_MAX_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub scoring: ScoringPolicy,
    pub calendar: CalendarPolicy,
    pub session_capacity: u32,
    pub listing_max_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            calendar: CalendarPolicy::default(),
            session_capacity: DEFAULT_SESSION_CAPACITY,
            listing_max_limit: DEFAULT_LISTING_MAX_LIMIT,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre!("Invalid {name} value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = CalendarPolicy::default();

        let tutor_threshold = parse_var("MATCH_TUTOR_THRESHOLD", DEFAULT_TUTOR_THRESHOLD)?;
        let granularity = parse_var("MATCH_SLOT_GRANULARITY_MINUTES", defaults.granularity_minutes)?;
        let day_start: TimeOfDay = parse_var("MATCH_DAY_START", defaults.day_start)?;
        let day_end: TimeOfDay = parse_var("MATCH_DAY_END", defaults.day_end)?;
        let calendar = CalendarPolicy::new(granularity, day_start, day_end)
            .wrap_err("Invalid calendar settings")?;

        let session_capacity = parse_var("MATCH_SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)?;
        if session_capacity == 0 {
            return Err(eyre!("MATCH_SESSION_CAPACITY must be at least 1"));
        }
        let listing_max_limit = parse_var("MATCH_LISTING_MAX_LIMIT", DEFAULT_LISTING_MAX_LIMIT)?.max(1);

        Ok(Self {
            scoring: ScoringPolicy { tutor_threshold },
            calendar,
            session_capacity,
            listing_max_limit,
        })
    }
}
