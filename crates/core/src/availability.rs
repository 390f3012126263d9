//! Read-side availability queries over tutor calendars and session schedules.
//!
//! Everything here works on snapshots that may already be stale; the booking engine
//! re-runs [`tutor_slot_is_free`] inside the store transaction before committing.

use chrono::{NaiveDate, Weekday};

use crate::models::{
    schedule::{DaySchedule, TutorAvailability, Windowed},
    time_slot::{day_of_week, RequestedSlot, TimeSlot},
    tutor::Tutor,
};

/// Points for a session window that fully contains a requested window.
pub const PERFECT_FIT_POINTS: u32 = 10;
/// Points for a session window that only partially overlaps a requested window.
pub const PARTIAL_OVERLAP_POINTS: u32 = 5;

/// True iff some dated availability window falling on `day` fully contains `wanted`.
pub fn offers_window(availability: &TutorAvailability, day: Weekday, wanted: &TimeSlot) -> bool {
    availability
        .iter()
        .filter(|(date, _)| day_of_week(*date) == day)
        .any(|(_, slots)| slots.iter().any(|slot| slot.contains(wanted)))
}

/// OR across requested slots: a single fitting window is enough. Malformed requested
/// slots never match.
pub fn tutor_has_window(tutor: &Tutor, requested: &[RequestedSlot]) -> bool {
    requested.iter().any(|slot| match slot.window() {
        Ok(wanted) => offers_window(&tutor.availability, slot.day_of_week, &wanted),
        Err(_) => false,
    })
}

/// True iff nothing in the tutor's booked calendar for `date` collides with `wanted`.
pub fn tutor_slot_is_free(tutor: &Tutor, date: NaiveDate, wanted: &TimeSlot) -> bool {
    !tutor
        .booked_slots
        .slots_on(date)
        .iter()
        .any(|booked| booked.window().collides_with(wanted))
}

/// Sums, over every (session window, requested window) pair on the same weekday,
/// [`PERFECT_FIT_POINTS`] for full containment or [`PARTIAL_OVERLAP_POINTS`] for a collision.
pub fn session_time_overlap_score(schedule: &DaySchedule, requested: &[RequestedSlot]) -> u32 {
    let mut score = 0;
    for (date, window) in schedule.entries() {
        let day = day_of_week(date);
        for slot in requested.iter().filter(|slot| slot.day_of_week == day) {
            let Ok(wanted) = slot.window() else {
                continue;
            };
            if window.contains(&wanted) {
                score += PERFECT_FIT_POINTS;
            } else if window.collides_with(&wanted) {
                score += PARTIAL_OVERLAP_POINTS;
            }
        }
    }
    score
}
