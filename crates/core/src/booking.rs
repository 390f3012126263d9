//! State transitions for booking, applied by a store to values it has locked inside one
//! transaction. On error the caller discards the mutated values, so nothing here needs to
//! undo partial work.

use chrono::Utc;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::availability::tutor_slot_is_free;
use crate::errors::{MatchError, MatchResult};
use crate::models::{
    subject_key,
    registration::{Registration, RegistrationStatus, RegistrationType},
    schedule::{BookedSlot, DaySchedule},
    session::{Session, SessionStatus},
    time_slot::{SlotBooking, TimeSlot},
    tutor::Tutor,
};

/// Parameters for a session created by confirming a manual request.
#[derive(Debug, Clone, Copy)]
pub struct SessionPlan {
    pub new_session_id: Uuid,
    pub capacity: u32,
}

fn manual_slot(registration: &Registration) -> MatchResult<(SlotBooking, TimeSlot)> {
    let booking = registration.requested_slot.ok_or_else(|| {
        MatchError::InvalidInput(format!("registration {} has no selected slot", registration.id))
    })?;
    Ok((booking, booking.window()?))
}

fn ensure_tutor(registration: &Registration, tutor: &Tutor) -> MatchResult<()> {
    if registration.tutor_id != Some(tutor.id) {
        return Err(MatchError::InvalidInput(format!(
            "registration {} does not belong to tutor {}",
            registration.id, tutor.id
        )));
    }
    Ok(())
}

/// Re-checks the tutor's booked calendar and places a hold for the registration's slot.
/// A collision with an existing booking is reported before the window is checked against the
/// tutor's published availability.
pub fn apply_manual_hold(tutor: &mut Tutor, registration: &Registration) -> MatchResult<()> {
    ensure_tutor(registration, tutor)?;
    let (booking, window) = manual_slot(registration)?;

    if !tutor_slot_is_free(tutor, booking.date, &window) {
        return Err(MatchError::SlotConflict(format!(
            "tutor {} is already booked on {} during {}",
            tutor.id, booking.date, window
        )));
    }
    if !tutor
        .availability
        .slots_on(booking.date)
        .iter()
        .any(|offered| offered.contains(&window))
    {
        return Err(MatchError::InvalidInput(format!(
            "tutor {} is not available on {} during {window}",
            tutor.id, booking.date
        )));
    }
    tutor
        .booked_slots
        .try_insert(booking.date, BookedSlot::hold(window, registration.id))
}

/// An existing session of the same tutor and subject that already runs the exact window on that
/// date and can take the student. Lowest id wins.
pub fn extendable_session<'a>(
    sessions: &'a [Session],
    registration: &Registration,
) -> Option<&'a Session> {
    let (booking, window) = manual_slot(registration).ok()?;
    sessions
        .iter()
        .filter(|session| {
            Some(session.tutor_id) == registration.tutor_id
                && subject_key(&session.subject) == subject_key(&registration.subject)
                && session.schedule.slots_on(booking.date).contains(&window)
                && session.accepts(registration.student_id)
        })
        .min_by_key(|session| session.id)
}

/// Pending manual request to `Matched`: enrolls the student in `existing` or a new session,
/// turns the hold into a session booking and bumps the tutor's load.
pub fn apply_confirmation(
    registration: &mut Registration,
    tutor: &mut Tutor,
    existing: Option<Session>,
    plan: &SessionPlan,
) -> MatchResult<Session> {
    if registration.registration_type != RegistrationType::Manual {
        return Err(MatchError::InvalidTransition(format!(
            "registration {} is not a manual request",
            registration.id
        )));
    }
    if registration.status != RegistrationStatus::Pending {
        return Err(MatchError::InvalidTransition(format!(
            "registration {} is {}, only pending requests can be confirmed",
            registration.id, registration.status
        )));
    }
    ensure_tutor(registration, tutor)?;
    let (booking, window) = manual_slot(registration)?;

    let mut session = existing.unwrap_or_else(|| {
        let mut schedule = DaySchedule::new();
        schedule.replace_day(booking.date, vec![window]).ok();
        Session {
            id: plan.new_session_id,
            subject: registration.subject.clone(),
            tutor_id: tutor.id,
            capacity: plan.capacity.max(1),
            students: BTreeSet::new(),
            schedule,
            status: SessionStatus::Scheduled,
            created_at: Utc::now(),
        }
    });
    if !session.enroll(registration.student_id) {
        return Err(MatchError::SlotConflict(format!(
            "session {} has no seat left for student {}",
            session.id, registration.student_id
        )));
    }

    let registration_id = registration.id;
    match tutor
        .booked_slots
        .find_mut(booking.date, |slot| slot.registration_id == Some(registration_id))
    {
        Some(held) => held.session_id = Some(session.id),
        None => {
            if !tutor_slot_is_free(tutor, booking.date, &window) {
                return Err(MatchError::SlotConflict(format!(
                    "hold for registration {registration_id} was lost and {} {} is now taken",
                    booking.date, window
                )));
            }
            tutor.booked_slots.try_insert(
                booking.date,
                BookedSlot {
                    window,
                    session_id: Some(session.id),
                    registration_id: Some(registration_id),
                },
            )?;
        }
    }

    tutor.active_students += 1;
    registration.session_id = Some(session.id);
    registration.transition(RegistrationStatus::Matched)?;
    Ok(session)
}

/// Moves the registration to `Rejected` and releases any hold it still has on the tutor.
pub fn apply_rejection(registration: &mut Registration, tutor: Option<&mut Tutor>) -> MatchResult<()> {
    registration.transition(RegistrationStatus::Rejected)?;

    if let (Some(booking), Some(tutor)) = (registration.requested_slot, tutor) {
        let registration_id = registration.id;
        tutor.booked_slots.remove_where(booking.date, |slot| {
            slot.is_hold() && slot.registration_id == Some(registration_id)
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time_slot::TimeOfDay;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    fn tutor() -> Tutor {
        Tutor {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            expertise: BTreeSet::from(["Calculus".to_string()]),
            rating: 4.7,
            active_students: 0,
            availability: [(monday(), TimeSlot::parse("08:00", "12:00").unwrap())]
                .into_iter()
                .collect(),
            booked_slots: Default::default(),
        }
    }

    fn manual(tutor: &Tutor, start: &str, end: &str) -> Registration {
        let mut registration = Registration::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Calculus",
            RegistrationType::Manual,
            RegistrationStatus::Pending,
        );
        registration.tutor_id = Some(tutor.id);
        registration.requested_slot = Some(SlotBooking {
            date: monday(),
            start: start.parse::<TimeOfDay>().unwrap(),
            end: end.parse::<TimeOfDay>().unwrap(),
        });
        registration
    }

    fn plan() -> SessionPlan {
        SessionPlan {
            new_session_id: Uuid::new_v4(),
            capacity: 5,
        }
    }

    #[test]
    fn overlapping_hold_is_a_conflict() {
        let mut tutor = tutor();
        let first = manual(&tutor, "09:00", "10:00");
        apply_manual_hold(&mut tutor, &first).unwrap();

        let second = manual(&tutor, "09:30", "10:30");
        let result = apply_manual_hold(&mut tutor, &second);

        assert!(matches!(result, Err(MatchError::SlotConflict(_))));
        assert_eq!(tutor.booked_slots.slots_on(monday()).len(), 1);
    }

    #[test]
    fn booked_overlap_wins_over_missing_availability() {
        let mut tutor = tutor();
        tutor.availability = [(monday(), TimeSlot::parse("09:00", "10:00").unwrap())]
            .into_iter()
            .collect();
        let first = manual(&tutor, "09:00", "10:00");
        apply_manual_hold(&mut tutor, &first).unwrap();

        let overlapping = manual(&tutor, "09:30", "10:30");
        assert!(matches!(
            apply_manual_hold(&mut tutor, &overlapping),
            Err(MatchError::SlotConflict(_))
        ));

        let unpublished = manual(&tutor, "10:00", "11:00");
        assert!(matches!(
            apply_manual_hold(&mut tutor, &unpublished),
            Err(MatchError::InvalidInput(_))
        ));
        assert_eq!(tutor.booked_slots.slots_on(monday()).len(), 1);
    }

    #[test]
    fn confirmation_upgrades_the_hold_in_place() {
        let mut tutor = tutor();
        let mut registration = manual(&tutor, "09:00", "10:00");
        apply_manual_hold(&mut tutor, &registration).unwrap();

        let plan = plan();
        let session = apply_confirmation(&mut registration, &mut tutor, None, &plan).unwrap();

        assert_eq!(session.id, plan.new_session_id);
        assert!(session.students.contains(&registration.student_id));
        assert_eq!(registration.status, RegistrationStatus::Matched);
        assert_eq!(registration.session_id, Some(session.id));
        assert_eq!(tutor.active_students, 1);

        let booked = tutor.booked_slots.slots_on(monday());
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0].session_id, Some(session.id));
    }

    #[test]
    fn confirming_twice_is_an_invalid_transition() {
        let mut tutor = tutor();
        let mut registration = manual(&tutor, "09:00", "10:00");
        apply_manual_hold(&mut tutor, &registration).unwrap();
        apply_confirmation(&mut registration, &mut tutor, None, &plan()).unwrap();

        let again = apply_confirmation(&mut registration, &mut tutor, None, &plan());
        assert!(matches!(again, Err(MatchError::InvalidTransition(_))));
    }

    #[test]
    fn confirmation_extends_a_matching_session() {
        let mut tutor = tutor();
        let registration = manual(&tutor, "09:00", "10:00");
        let window = TimeSlot::parse("09:00", "10:00").unwrap();
        let existing = Session {
            id: Uuid::new_v4(),
            subject: "calculus".to_string(),
            tutor_id: tutor.id,
            capacity: 3,
            students: BTreeSet::from([Uuid::new_v4()]),
            schedule: [(monday(), window)].into_iter().collect(),
            status: SessionStatus::Scheduled,
            created_at: Utc::now(),
        };
        let sessions = vec![existing.clone()];

        let picked = extendable_session(&sessions, &registration).cloned();
        assert_eq!(picked.as_ref().map(|s| s.id), Some(existing.id));

        let mut registration = registration;
        apply_manual_hold(&mut tutor, &registration).unwrap();
        let session = apply_confirmation(&mut registration, &mut tutor, picked, &plan()).unwrap();
        assert_eq!(session.id, existing.id);
        assert_eq!(session.enrolled(), 2);
    }

    #[test]
    fn rejection_releases_the_hold() {
        let mut tutor = tutor();
        let mut registration = manual(&tutor, "09:00", "10:00");
        apply_manual_hold(&mut tutor, &registration).unwrap();

        apply_rejection(&mut registration, Some(&mut tutor)).unwrap();

        assert_eq!(registration.status, RegistrationStatus::Rejected);
        assert!(tutor.booked_slots.is_empty());
        assert!(apply_rejection(&mut registration, Some(&mut tutor)).is_err());
    }
}
