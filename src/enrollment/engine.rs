//! Enrollment Engine - the enroll/cancel state transition
//!
//! Each call runs in one store transaction. The section row is locked first
//! and held until commit, so the check-and-decrement sequence on
//! `remaining_slots` is atomic across connections and processes. Any failure
//! rolls the whole transaction back.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::conflict::find_conflict;
use super::store::{EnrollmentStore, EnrollmentTx, InsertOutcome};
use crate::error::{EnrollmentError, EnrollmentResult};
use crate::models::{SectionId, StudentId};

/// Confirmation of a committed enroll or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrollmentConfirmation {
    pub student_id: StudentId,
    pub section_id: SectionId,
    /// Seats left in the section as of this commit.
    pub remaining_slots: i32,
}

#[derive(Clone)]
pub struct EnrollmentEngine {
    store: Arc<dyn EnrollmentStore>,
}

impl EnrollmentEngine {
    pub fn new(store: Arc<dyn EnrollmentStore>) -> Self {
        Self { store }
    }

    pub async fn enroll(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> EnrollmentResult<EnrollmentConfirmation> {
        let mut tx = self.store.begin().await?;

        match enroll_in_tx(tx.as_mut(), student_id, section_id).await {
            Ok(remaining_slots) => {
                tx.commit().await?;
                info!(
                    "Enrolled student {} in section {} ({} slots left)",
                    student_id, section_id, remaining_slots
                );
                Ok(EnrollmentConfirmation {
                    student_id,
                    section_id,
                    remaining_slots,
                })
            }
            Err(e) => {
                abort(tx, "enroll", &e).await;
                Err(e)
            }
        }
    }

    pub async fn cancel(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> EnrollmentResult<EnrollmentConfirmation> {
        let mut tx = self.store.begin().await?;

        match cancel_in_tx(tx.as_mut(), student_id, section_id).await {
            Ok(remaining_slots) => {
                tx.commit().await?;
                info!(
                    "Cancelled enrollment of student {} in section {} ({} slots left)",
                    student_id, section_id, remaining_slots
                );
                Ok(EnrollmentConfirmation {
                    student_id,
                    section_id,
                    remaining_slots,
                })
            }
            Err(e) => {
                abort(tx, "cancel", &e).await;
                Err(e)
            }
        }
    }
}

/// Runs the enroll checks and writes; returns the remaining slots after the
/// decrement.
async fn enroll_in_tx(
    tx: &mut dyn EnrollmentTx,
    student_id: StudentId,
    section_id: SectionId,
) -> EnrollmentResult<i32> {
    // 1. Lock the section and check seats
    let seats = tx
        .lock_section(section_id)
        .await?
        .ok_or(EnrollmentError::SectionNotFound { section_id })?;
    if seats.remaining_slots <= 0 {
        return Err(EnrollmentError::SectionFull { section_id });
    }

    // Lock the student: serialises this student's concurrent enrollments so
    // the conflict check below sees every committed meeting.
    if !tx.lock_student(student_id).await? {
        return Err(EnrollmentError::StudentNotFound { student_id });
    }

    // 2. Duplicate
    if tx.enrollment_exists(student_id, section_id).await? {
        return Err(EnrollmentError::AlreadyEnrolled {
            student_id,
            section_id,
        });
    }

    // 3-4. Schedule conflict
    let candidate = tx.section_meetings(section_id).await?;
    let schedule = tx.student_meetings(student_id).await?;
    if let Some(conflict) = find_conflict(&candidate, &schedule) {
        return Err(EnrollmentError::ScheduleConflict {
            section_id,
            conflicting_section_id: conflict.existing_section_id,
            day: conflict.day,
        });
    }

    // 5. Guarded decrement
    if !tx.take_seat(section_id).await? {
        return Err(EnrollmentError::SectionFull { section_id });
    }

    // 6. Insert
    match tx.insert_enrollment(student_id, section_id).await? {
        InsertOutcome::Inserted => Ok(seats.remaining_slots - 1),
        InsertOutcome::Duplicate => Err(EnrollmentError::AlreadyEnrolled {
            student_id,
            section_id,
        }),
    }
}

async fn cancel_in_tx(
    tx: &mut dyn EnrollmentTx,
    student_id: StudentId,
    section_id: SectionId,
) -> EnrollmentResult<i32> {
    let not_enrolled = EnrollmentError::NotEnrolled {
        student_id,
        section_id,
    };

    // Same lock order as enroll: section row first.
    let Some(seats) = tx.lock_section(section_id).await? else {
        return Err(not_enrolled);
    };

    if !tx.delete_enrollment(student_id, section_id).await? {
        return Err(not_enrolled);
    }

    tx.release_seat(section_id).await?;
    Ok((seats.remaining_slots + 1).min(seats.capacity))
}

async fn abort(tx: Box<dyn EnrollmentTx>, operation: &str, cause: &EnrollmentError) {
    if cause.is_internal() {
        error!("{} failed: {:#}", operation, cause);
    } else {
        debug!("{} rejected: {}", operation, cause);
    }

    if let Err(e) = tx.rollback().await {
        // Dropping the handle still discards the writes.
        warn!("Rollback after failed {} returned error: {:#}", operation, e);
    }
}
