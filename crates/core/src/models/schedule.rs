use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::time_slot::{has_internal_overlap, TimeSlot};
use crate::errors::{MatchError, MatchResult};

/// Anything stored in a [`DaySchedule`] exposes the window it occupies.
pub trait Windowed {
    fn window(&self) -> TimeSlot;
}

impl Windowed for TimeSlot {
    fn window(&self) -> TimeSlot {
        *self
    }
}

/// An entry in a tutor's booked calendar.
///
/// A manual request places a hold (`registration_id` set, `session_id` empty); confirming
/// it fills in `session_id` on the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedSlot {
    pub window: TimeSlot,
    pub session_id: Option<Uuid>,
    pub registration_id: Option<Uuid>,
}

impl BookedSlot {
    pub fn hold(window: TimeSlot, registration_id: Uuid) -> Self {
        Self {
            window,
            session_id: None,
            registration_id: Some(registration_id),
        }
    }

    pub fn for_session(window: TimeSlot, session_id: Uuid) -> Self {
        Self {
            window,
            session_id: Some(session_id),
            registration_id: None,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.session_id.is_none()
    }
}

impl Windowed for BookedSlot {
    fn window(&self) -> TimeSlot {
        self.window
    }
}

/// Date-keyed calendar. Slots within one date never collide; dates with no slots are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySchedule<E = TimeSlot> {
    days: BTreeMap<NaiveDate, Vec<E>>,
}

pub type TutorAvailability = DaySchedule<TimeSlot>;
pub type TutorBookedSlots = DaySchedule<BookedSlot>;

impl<E> Default for DaySchedule<E> {
    fn default() -> Self {
        Self {
            days: BTreeMap::new(),
        }
    }
}

impl<E: Windowed> DaySchedule<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots_on(&self, date: NaiveDate) -> &[E] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[E])> + '_ {
        self.days.iter().map(|(date, slots)| (*date, slots.as_slice()))
    }

    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, &E)> + '_ {
        self.days
            .iter()
            .flat_map(|(date, slots)| slots.iter().map(move |slot| (*date, slot)))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Replaces every slot on `date`. An overlapping set is rejected and leaves the schedule untouched.
    pub fn replace_day(&mut self, date: NaiveDate, mut entries: Vec<E>) -> MatchResult<()> {
        let windows: Vec<TimeSlot> = entries.iter().map(Windowed::window).collect();
        if has_internal_overlap(&windows) {
            return Err(MatchError::InvalidInput(format!(
                "slots for {date} overlap each other"
            )));
        }

        if entries.is_empty() {
            self.days.remove(&date);
        } else {
            entries.sort_by_key(|entry| entry.window().start());
            self.days.insert(date, entries);
        }
        Ok(())
    }

    /// Adds one entry, failing with `SlotConflict` if it collides with anything already on that date.
    pub fn try_insert(&mut self, date: NaiveDate, entry: E) -> MatchResult<()> {
        let window = entry.window();
        if let Some(existing) = self
            .slots_on(date)
            .iter()
            .find(|slot| slot.window().collides_with(&window))
        {
            return Err(MatchError::SlotConflict(format!(
                "{date} {window} collides with booked {}",
                existing.window()
            )));
        }

        let slots = self.days.entry(date).or_default();
        slots.push(entry);
        slots.sort_by_key(|slot| slot.window().start());
        Ok(())
    }

    /// Removes every entry on `date` matching `predicate`, returning how many were removed.
    pub fn remove_where(&mut self, date: NaiveDate, predicate: impl Fn(&E) -> bool) -> usize {
        let Some(slots) = self.days.get_mut(&date) else {
            return 0;
        };
        let before = slots.len();
        slots.retain(|slot| !predicate(slot));
        let removed = before - slots.len();
        if slots.is_empty() {
            self.days.remove(&date);
        }
        removed
    }

    pub fn find_mut(&mut self, date: NaiveDate, predicate: impl Fn(&E) -> bool) -> Option<&mut E> {
        self.days.get_mut(&date)?.iter_mut().find(|slot| predicate(slot))
    }
}

impl<E: Windowed> FromIterator<(NaiveDate, E)> for DaySchedule<E> {
    /// Collects without overlap checks; callers building fixtures are trusted.
    fn from_iter<I: IntoIterator<Item = (NaiveDate, E)>>(iter: I) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<E>> = BTreeMap::new();
        for (date, entry) in iter {
            days.entry(date).or_default().push(entry);
        }
        for slots in days.values_mut() {
            slots.sort_by_key(|slot| slot.window().start());
        }
        Self { days }
    }
}
