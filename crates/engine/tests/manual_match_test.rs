mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use tutormatch_core::{
    MatchError,
    models::{
        matching::CreateManualMatchRequest,
        registration::RegistrationStatus,
        schedule::BookedSlot,
        time_slot::SlotBooking,
        tutor::Tutor,
    },
    notify::{NotificationKind, Recipient},
};
use tutormatch_db::MatchStore;

use common::*;

fn ada() -> Tutor {
    available_on(
        tutor("Ada", 4.8, 0, &["Calculus", "Physics"]),
        monday(),
        window("08:00", "12:00"),
    )
}

fn request_for(tutor: &Tutor, start: &str, end: &str) -> CreateManualMatchRequest {
    CreateManualMatchRequest {
        tutor_id: tutor.id,
        subject: "Calculus".to_string(),
        selected_slot: SlotBooking {
            date: monday(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
        },
        description: None,
    }
}

#[test_log::test(tokio::test)]
async fn overlapping_window_is_a_slot_conflict() {
    let mut tutor = ada();
    tutor
        .booked_slots
        .try_insert(monday(), BookedSlot::for_session(window("09:00", "10:00"), uuid::Uuid::new_v4()))
        .unwrap();
    let harness = Harness::new(vec![tutor.clone()], vec![]);
    let caller = student();

    let err = harness
        .engine
        .create_manual_request(&caller, request_for(&tutor, "09:30", "10:30"))
        .await
        .unwrap_err();

    assert!(matches!(err, MatchError::SlotConflict(_)));
    assert!(harness.store.registrations_for_student(caller.id).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn overlap_with_the_only_published_hour_is_still_a_slot_conflict() {
    let mut tutor = available_on(tutor("Grace", 4.6, 0, &["Calculus"]), monday(), window("09:00", "10:00"));
    tutor
        .booked_slots
        .try_insert(monday(), BookedSlot::for_session(window("09:00", "10:00"), uuid::Uuid::new_v4()))
        .unwrap();
    let harness = Harness::new(vec![tutor.clone()], vec![]);
    let caller = student();

    let err = harness
        .engine
        .create_manual_request(&caller, request_for(&tutor, "09:30", "10:30"))
        .await
        .unwrap_err();

    assert!(matches!(err, MatchError::SlotConflict(_)), "got {err:?}");
    let stored = harness.store.get_tutor(tutor.id).await.unwrap().unwrap();
    assert_eq!(stored.booked_slots.slots_on(monday()).len(), 1);
}

#[test_log::test(tokio::test)]
async fn request_is_held_until_the_tutor_confirms() {
    let tutor = ada();
    let mut harness = Harness::new(vec![tutor.clone()], vec![]);
    let caller = student();

    let registration = harness
        .engine
        .create_manual_request(&caller, request_for(&tutor, "09:00", "10:00"))
        .await
        .unwrap();
    assert_eq!(registration.status, RegistrationStatus::Pending);

    let held = harness.store.get_tutor(tutor.id).await.unwrap().unwrap();
    let booked = held.booked_slots.slots_on(monday());
    assert_eq!(booked.len(), 1);
    assert!(booked[0].is_hold());

    let confirmation = harness
        .engine
        .confirm_manual_request(&tutor_caller(&tutor), registration.id)
        .await
        .unwrap();

    assert_eq!(confirmation.registration.status, RegistrationStatus::Matched);
    assert_eq!(confirmation.registration.session_id, Some(confirmation.session.id));
    assert!(confirmation.session.students.contains(&caller.id));
    assert_eq!(confirmation.session.capacity, 5);
    assert_eq!(confirmation.tutor.active_students, 1);

    let stored = harness.store.get_tutor(tutor.id).await.unwrap().unwrap();
    let booked = stored.booked_slots.slots_on(monday());
    assert_eq!(booked.len(), 1);
    assert_eq!(booked[0].session_id, Some(confirmation.session.id));

    let notifications = harness.notifications();
    assert_eq!(notifications[0].kind, NotificationKind::ManualRequestReceived);
    assert_eq!(notifications[0].recipient, Recipient::Tutor(tutor.id));
    assert_eq!(notifications[1].kind, NotificationKind::MatchConfirmed);
    assert_eq!(notifications[1].recipient, Recipient::Student(caller.id));
}

#[test_log::test(tokio::test)]
async fn only_the_addressed_tutor_confirms() {
    let tutor = ada();
    let other = ada();
    let harness = Harness::new(vec![tutor.clone(), other.clone()], vec![]);

    let registration = harness
        .engine
        .create_manual_request(&student(), request_for(&tutor, "09:00", "10:00"))
        .await
        .unwrap();

    let err = harness
        .engine
        .confirm_manual_request(&tutor_caller(&other), registration.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Forbidden(_)));

    let err = harness
        .engine
        .confirm_manual_request(&coordinator(), registration.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Forbidden(_)));

    harness
        .engine
        .confirm_manual_request(&tutor_caller(&tutor), registration.id)
        .await
        .unwrap();
    let err = harness
        .engine
        .confirm_manual_request(&tutor_caller(&tutor), registration.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::InvalidTransition(_)));
}

#[test_log::test(tokio::test)]
async fn rejecting_releases_the_slot() {
    let tutor = ada();
    let mut harness = Harness::new(vec![tutor.clone()], vec![]);
    let first = student();

    let registration = harness
        .engine
        .create_manual_request(&first, request_for(&tutor, "09:00", "10:00"))
        .await
        .unwrap();

    let err = harness
        .engine
        .reject_request(&first, registration.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Forbidden(_)));

    let rejected = harness
        .engine
        .reject_request(&coordinator(), registration.id)
        .await
        .unwrap();
    assert_eq!(rejected.status, RegistrationStatus::Rejected);

    let stored = harness.store.get_tutor(tutor.id).await.unwrap().unwrap();
    assert!(stored.booked_slots.slots_on(monday()).is_empty());

    let kinds = harness.notification_kinds();
    assert_eq!(
        kinds,
        vec![NotificationKind::ManualRequestReceived, NotificationKind::MatchRejected]
    );

    harness
        .engine
        .create_manual_request(&student(), request_for(&tutor, "09:00", "10:00"))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_requests_for_one_slot_book_it_once() {
    let tutor = ada();
    let harness = Harness::new(vec![tutor.clone()], vec![]);

    let mut handles = Vec::new();
    for _ in 0..12 {
        let engine = Arc::clone(&harness.engine);
        let request = request_for(&tutor, "10:00", "11:00");
        handles.push(tokio::spawn(async move {
            engine.create_manual_request(&student(), request).await
        }));
    }

    let (mut booked, mut conflicts) = (0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(MatchError::SlotConflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(booked, 1);
    assert_eq!(conflicts, 11);
    let stored = harness.store.get_tutor(tutor.id).await.unwrap().unwrap();
    assert_eq!(stored.booked_slots.slots_on(monday()).len(), 1);
}

#[tokio::test]
async fn request_must_fit_the_tutor() {
    let tutor = ada();
    let harness = Harness::new(vec![tutor.clone()], vec![]);
    let caller = student();

    let mut chemistry = request_for(&tutor, "09:00", "10:00");
    chemistry.subject = "Chemistry".to_string();
    let err = harness.engine.create_manual_request(&caller, chemistry).await.unwrap_err();
    assert!(matches!(err, MatchError::InvalidInput(_)));

    let outside = request_for(&tutor, "13:00", "14:00");
    let err = harness.engine.create_manual_request(&caller, outside).await.unwrap_err();
    assert!(matches!(err, MatchError::InvalidInput(_)));

    let mut unknown = request_for(&tutor, "09:00", "10:00");
    unknown.tutor_id = uuid::Uuid::new_v4();
    let err = harness.engine.create_manual_request(&caller, unknown).await.unwrap_err();
    assert!(matches!(err, MatchError::NotFound(_)));

    let err = harness
        .engine
        .create_manual_request(&coordinator(), request_for(&tutor, "09:00", "10:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Forbidden(_)));
}
