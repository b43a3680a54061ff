//! Concurrent enroll/cancel against the in-memory store
//!
//! These tests verify that:
//! 1. N concurrent enrolls into a section with k < N seats yield exactly k
//!    successes and N-k `SectionFull`
//! 2. One student racing into two conflicting sections gets at most one
//! 3. `0 <= remaining_slots <= capacity` holds after mixed enroll/cancel traffic

#![cfg(feature = "test-util")]

use std::sync::Arc;

use chrono::NaiveTime;
use tokio::sync::Barrier;

use course_enrollment::enrollment::{EnrollmentEngine, InMemoryEnrollmentStore};
use course_enrollment::models::{Meeting, Weekday};
use course_enrollment::EnrollmentError;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn meeting(day: Weekday, start: (u32, u32), end: (u32, u32)) -> Meeting {
    Meeting::new(day, t(start.0, start.1), t(end.0, end.1))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exactly_k_of_n_enrollments_succeed() {
    const SEATS: i32 = 3;
    const STUDENTS: i32 = 20;

    let store = Arc::new(InMemoryEnrollmentStore::new());
    store.add_section(
        1,
        SEATS,
        vec![meeting(Weekday::Tuesday, (9, 0), (10, 30))],
    );
    for student_id in 1..=STUDENTS {
        store.add_student(student_id);
    }
    let engine = EnrollmentEngine::new(store.clone());
    let barrier = Arc::new(Barrier::new(STUDENTS as usize));

    let handles: Vec<_> = (1..=STUDENTS)
        .map(|student_id| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                engine.enroll(student_id, 1).await
            })
        })
        .collect();

    let mut successes = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(EnrollmentError::SectionFull { section_id: 1 }) => full += 1,
            Err(other) => panic!("unexpected outcome: {}", other),
        }
    }

    assert_eq!(successes, SEATS);
    assert_eq!(full, STUDENTS - SEATS);
    assert_eq!(store.remaining_slots(1), Some(0));
    assert_eq!(store.enrolled_count(1), SEATS as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_student_cannot_take_two_conflicting_sections() {
    let store = Arc::new(InMemoryEnrollmentStore::new());
    store.add_section(1, 10, vec![meeting(Weekday::Friday, (13, 0), (14, 0))]);
    store.add_section(2, 10, vec![meeting(Weekday::Friday, (13, 30), (14, 30))]);
    store.add_student(7);
    let engine = EnrollmentEngine::new(store.clone());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [1, 2]
        .into_iter()
        .map(|section_id| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                engine.enroll(7, section_id).await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(EnrollmentError::ScheduleConflict { .. }) => {}
            Err(other) => panic!("unexpected outcome: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(
        u8::from(store.is_enrolled(7, 1)) + u8::from(store.is_enrolled(7, 2)),
        1
    );
    // The loser's seat was never taken.
    let taken = (10 - store.remaining_slots(1).unwrap()) + (10 - store.remaining_slots(2).unwrap());
    assert_eq!(taken, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_counter_bounds_hold_under_mixed_traffic() {
    const CAPACITY: i32 = 2;
    const STUDENTS: i32 = 8;

    let store = Arc::new(InMemoryEnrollmentStore::new());
    store.add_section(5, CAPACITY, vec![meeting(Weekday::Monday, (8, 0), (9, 0))]);
    for student_id in 1..=STUDENTS {
        store.add_student(student_id);
    }
    let engine = EnrollmentEngine::new(store.clone());

    let handles: Vec<_> = (1..=STUDENTS)
        .map(|student_id| {
            let engine = engine.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    let _ = engine.enroll(student_id, 5).await;
                    tokio::task::yield_now().await;
                    let _ = engine.cancel(student_id, 5).await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task panicked");
    }

    let remaining = store.remaining_slots(5).unwrap();
    assert!((0..=CAPACITY).contains(&remaining));
    assert_eq!(store.enrolled_count(5), 0);
    assert_eq!(remaining, CAPACITY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_duplicate_concurrent_enroll_succeeds_once() {
    let store = Arc::new(InMemoryEnrollmentStore::new());
    store.add_section(9, 5, vec![meeting(Weekday::Thursday, (15, 0), (16, 0))]);
    store.add_student(3);
    let engine = EnrollmentEngine::new(store.clone());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                engine.enroll(3, 9).await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(EnrollmentError::AlreadyEnrolled { .. }) => {}
            Err(other) => panic!("unexpected outcome: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(store.remaining_slots(9), Some(4));
}
