//! Persistence port for the enrollment engine.
//!
//! The engine runs entirely through these traits, so the same enroll/cancel
//! algorithm drives the Postgres adapter and the in-memory store.
//!
//! A transaction handle owns its locks. `commit` publishes all writes at
//! once; `rollback`, or dropping the handle without committing, discards
//! them and releases the locks.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Meeting, SectionId, StudentId};

/// Seat counter of a section, read under its row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatCounter {
    pub capacity: i32,
    pub remaining_slots: i32,
}

/// Result of inserting an enrollment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The `(student_id, section_id)` uniqueness constraint rejected the row.
    Duplicate,
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn EnrollmentTx>>;
}

#[async_trait]
pub trait EnrollmentTx: Send {
    // ── Locks ──

    /// Exclusive row lock on the section; `None` if it does not exist.
    async fn lock_section(&mut self, section_id: SectionId) -> Result<Option<SeatCounter>>;

    /// Exclusive row lock on the student; `false` if it does not exist.
    async fn lock_student(&mut self, student_id: StudentId) -> Result<bool>;

    // ── Reads ──

    async fn enrollment_exists(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<bool>;

    async fn section_meetings(&mut self, section_id: SectionId) -> Result<Vec<Meeting>>;

    /// Meetings of every section the student is enrolled in, tagged by section.
    async fn student_meetings(&mut self, student_id: StudentId)
        -> Result<Vec<(SectionId, Meeting)>>;

    // ── Writes ──

    /// Guarded decrement (`remaining_slots > 0`). Returns `true` iff exactly
    /// one row was updated.
    async fn take_seat(&mut self, section_id: SectionId) -> Result<bool>;

    /// Increment capped at capacity.
    async fn release_seat(&mut self, section_id: SectionId) -> Result<()>;

    async fn insert_enrollment(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<InsertOutcome>;

    /// Returns `true` iff a row was deleted.
    async fn delete_enrollment(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<bool>;

    // ── Completion ──

    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}
