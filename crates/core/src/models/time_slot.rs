use chrono::{Datelike, NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::errors::{MatchError, MatchResult};

/// Wall-clock time of day with minute precision, rendered as fixed-width `HH:MM`.
///
/// Dates and times in this system are naive: no timezone is ever attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(u16::from(hour) * 60 + u16::from(minute)))
        } else {
            None
        }
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MatchError::InvalidInput(format!("'{s}' is not a valid HH:MM time"));

        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        if !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        let hour = s[..2].parse::<u8>().map_err(|_| invalid())?;
        let minute = s[3..].parse::<u8>().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A half-open `[start, end)` window within a single day. `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSlot")]
pub struct TimeSlot {
    start: TimeOfDay,
    end: TimeOfDay,
}

#[derive(Deserialize)]
struct RawTimeSlot {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<RawTimeSlot> for TimeSlot {
    type Error = MatchError;

    fn try_from(raw: RawTimeSlot) -> Result<Self, Self::Error> {
        TimeSlot::new(raw.start, raw.end)
    }
}

impl TimeSlot {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> MatchResult<Self> {
        if start >= end {
            return Err(MatchError::InvalidInput(format!(
                "slot start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> MatchResult<Self> {
        Self::new(start.parse()?, end.parse()?)
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Availability rule ("can I fit?"): true iff `other` lies entirely inside this window.
    pub fn contains(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Conflict rule ("do these collide?"): true iff the windows share any time at all.
    /// Touching windows such as 09:00-10:00 and 10:00-11:00 do not collide.
    pub fn collides_with(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The single weekday derivation used by every component.
pub fn day_of_week(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// True iff any two slots of the list collide once sorted by start.
pub fn has_internal_overlap(slots: &[TimeSlot]) -> bool {
    let mut sorted = slots.to_vec();
    sorted.sort_by_key(TimeSlot::start);
    sorted.windows(2).any(|pair| pair[1].start < pair[0].end)
}

/// A window a student asked for on a recurring weekday. Unvalidated until [`RequestedSlot::window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedSlot {
    pub day_of_week: Weekday,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl RequestedSlot {
    pub fn window(&self) -> MatchResult<TimeSlot> {
        TimeSlot::new(self.start, self.end)
    }
}

/// A concrete dated window picked for a manual match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBooking {
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl SlotBooking {
    pub fn window(&self) -> MatchResult<TimeSlot> {
        TimeSlot::new(self.start, self.end)
    }

    pub fn as_requested(&self) -> RequestedSlot {
        RequestedSlot {
            day_of_week: day_of_week(self.date),
            start: self.start,
            end: self.end,
        }
    }
}

/// Slot granularity and the bookable part of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarPolicy {
    pub granularity_minutes: u16,
    pub day_start: TimeOfDay,
    pub day_end: TimeOfDay,
}

impl Default for CalendarPolicy {
    fn default() -> Self {
        Self {
            granularity_minutes: 60,
            day_start: TimeOfDay(7 * 60),
            day_end: TimeOfDay(17 * 60),
        }
    }
}

impl CalendarPolicy {
    pub fn new(granularity_minutes: u16, day_start: TimeOfDay, day_end: TimeOfDay) -> MatchResult<Self> {
        if granularity_minutes == 0 || granularity_minutes > TimeOfDay::MINUTES_PER_DAY {
            return Err(MatchError::InvalidInput(format!(
                "slot granularity of {granularity_minutes} minutes is out of range"
            )));
        }
        if day_start >= day_end {
            return Err(MatchError::InvalidInput(format!(
                "day start {day_start} must be before day end {day_end}"
            )));
        }
        Ok(Self {
            granularity_minutes,
            day_start,
            day_end,
        })
    }

    /// Alignment and day bounds. Applied to calendar windows a tutor publishes.
    pub fn validate(&self, slot: &TimeSlot) -> MatchResult<()> {
        let aligned = |t: TimeOfDay| t.minutes() % self.granularity_minutes == 0;
        if !aligned(slot.start) || !aligned(slot.end) {
            return Err(MatchError::InvalidInput(format!(
                "slot {slot} is not aligned to {} minute marks",
                self.granularity_minutes
            )));
        }
        self.check_bounds(slot)
    }

    /// Day bounds only. A requested window just has to fit the bookable day; whether it
    /// fits the tutor is decided by their calendar.
    pub fn check_bounds(&self, slot: &TimeSlot) -> MatchResult<()> {
        if slot.start < self.day_start || slot.end > self.day_end {
            return Err(MatchError::InvalidInput(format!(
                "slot {slot} falls outside {}-{}",
                self.day_start, self.day_end
            )));
        }
        Ok(())
    }
}
