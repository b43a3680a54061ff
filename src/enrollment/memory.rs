//! In-memory enrollment store
//!
//! Mirrors the Postgres adapter's semantics closely enough to exercise the
//! engine without a database: each section/student row has its own async
//! lock held by the transaction until it ends, writes are buffered and
//! published atomically at commit, and a dropped transaction leaves no trace.
//! A lock entry is pruned when the last transaction referencing it ends.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};

use super::store::{EnrollmentStore, EnrollmentTx, InsertOutcome, SeatCounter};
use crate::models::{Meeting, SectionId, StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RowKey {
    Section(SectionId),
    Student(StudentId),
}

#[derive(Debug, Clone)]
struct SectionRecord {
    capacity: i32,
    remaining_slots: i32,
    meetings: Vec<Meeting>,
}

#[derive(Debug, Default)]
struct StoreState {
    sections: HashMap<SectionId, SectionRecord>,
    students: HashSet<StudentId>,
    enrollments: BTreeSet<(StudentId, SectionId)>,
}

#[derive(Debug, Clone, Copy)]
enum PendingWrite {
    TakeSeat(SectionId),
    ReleaseSeat(SectionId),
    Insert(StudentId, SectionId),
    Delete(StudentId, SectionId),
}

#[derive(Default)]
pub struct InMemoryEnrollmentStore {
    state: Arc<Mutex<StoreState>>,
    row_locks: Arc<LockTable>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a section with `remaining_slots = capacity`.
    pub fn add_section(&self, section_id: SectionId, capacity: i32, meetings: Vec<Meeting>) {
        self.state().sections.insert(
            section_id,
            SectionRecord {
                capacity,
                remaining_slots: capacity,
                meetings,
            },
        );
    }

    pub fn add_student(&self, student_id: StudentId) {
        self.state().students.insert(student_id);
    }

    pub fn remaining_slots(&self, section_id: SectionId) -> Option<i32> {
        self.state()
            .sections
            .get(&section_id)
            .map(|s| s.remaining_slots)
    }

    pub fn capacity(&self, section_id: SectionId) -> Option<i32> {
        self.state().sections.get(&section_id).map(|s| s.capacity)
    }

    pub fn is_enrolled(&self, student_id: StudentId, section_id: SectionId) -> bool {
        self.state().enrollments.contains(&(student_id, section_id))
    }

    pub fn enrolled_count(&self, section_id: SectionId) -> usize {
        self.state()
            .enrollments
            .iter()
            .filter(|(_, sec)| *sec == section_id)
            .count()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        lock_state(&self.state)
    }

    #[cfg(test)]
    fn tracked_row_locks(&self) -> usize {
        lock_table(&self.row_locks).len()
    }
}

fn lock_state(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    // The state is only mutated by whole-statement updates, so a poisoned
    // guard still holds consistent data.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

type LockTable = Mutex<HashMap<RowKey, Arc<RowLock<()>>>>;

fn lock_table(table: &LockTable) -> MutexGuard<'_, HashMap<RowKey, Arc<RowLock<()>>>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn begin(&self) -> Result<Box<dyn EnrollmentTx>> {
        Ok(Box::new(InMemoryTx {
            state: Arc::clone(&self.state),
            row_locks: Arc::clone(&self.row_locks),
            held: HashMap::new(),
            pending: Vec::new(),
        }))
    }
}

struct InMemoryTx {
    state: Arc<Mutex<StoreState>>,
    row_locks: Arc<LockTable>,
    held: HashMap<RowKey, OwnedMutexGuard<()>>,
    pending: Vec<PendingWrite>,
}

impl InMemoryTx {
    /// Re-entrant within one transaction, like a Postgres row lock.
    async fn lock_row(&mut self, key: RowKey) {
        if self.held.contains_key(&key) {
            return;
        }
        let lock = Arc::clone(lock_table(&self.row_locks).entry(key).or_default());
        let guard = lock.lock_owned().await;
        self.held.insert(key, guard);
    }

    /// Seat counter as seen by this transaction (committed + own writes).
    fn seats(&self, state: &StoreState, section_id: SectionId) -> Option<SeatCounter> {
        let record = state.sections.get(&section_id)?;
        let mut remaining = record.remaining_slots;
        for write in &self.pending {
            match *write {
                PendingWrite::TakeSeat(id) if id == section_id => remaining -= 1,
                PendingWrite::ReleaseSeat(id) if id == section_id => {
                    remaining = (remaining + 1).min(record.capacity)
                }
                _ => {}
            }
        }
        Some(SeatCounter {
            capacity: record.capacity,
            remaining_slots: remaining,
        })
    }

    fn enrolled(&self, state: &StoreState, student_id: StudentId, section_id: SectionId) -> bool {
        let key = (student_id, section_id);
        self.pending
            .iter()
            .fold(state.enrollments.contains(&key), |present, write| match *write {
                PendingWrite::Insert(s, sec) if (s, sec) == key => true,
                PendingWrite::Delete(s, sec) if (s, sec) == key => false,
                _ => present,
            })
    }
}

impl Drop for InMemoryTx {
    fn drop(&mut self) {
        let keys: Vec<RowKey> = self.held.keys().copied().collect();
        self.held.clear();

        // An entry referenced only by the table has no holder and no waiter.
        let mut locks = lock_table(&self.row_locks);
        for key in keys {
            if locks.get(&key).is_some_and(|l| Arc::strong_count(l) == 1) {
                locks.remove(&key);
            }
        }
    }
}

#[async_trait]
impl EnrollmentTx for InMemoryTx {
    async fn lock_section(&mut self, section_id: SectionId) -> Result<Option<SeatCounter>> {
        self.lock_row(RowKey::Section(section_id)).await;
        let state = lock_state(&self.state);
        Ok(self.seats(&state, section_id))
    }

    async fn lock_student(&mut self, student_id: StudentId) -> Result<bool> {
        self.lock_row(RowKey::Student(student_id)).await;
        Ok(lock_state(&self.state).students.contains(&student_id))
    }

    async fn enrollment_exists(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<bool> {
        let state = lock_state(&self.state);
        Ok(self.enrolled(&state, student_id, section_id))
    }

    async fn section_meetings(&mut self, section_id: SectionId) -> Result<Vec<Meeting>> {
        let state = lock_state(&self.state);
        Ok(state
            .sections
            .get(&section_id)
            .map(|s| s.meetings.clone())
            .unwrap_or_default())
    }

    async fn student_meetings(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<(SectionId, Meeting)>> {
        let state = lock_state(&self.state);
        let mut sections: BTreeSet<SectionId> = state
            .enrollments
            .iter()
            .filter(|(s, _)| *s == student_id)
            .map(|(_, sec)| *sec)
            .collect();
        for write in &self.pending {
            if let PendingWrite::Insert(s, sec) = *write {
                if s == student_id {
                    sections.insert(sec);
                }
            }
        }
        sections.retain(|sec| self.enrolled(&state, student_id, *sec));

        Ok(sections
            .into_iter()
            .filter_map(|sec| state.sections.get(&sec).map(|r| (sec, r)))
            .flat_map(|(sec, r)| r.meetings.iter().map(move |m| (sec, *m)))
            .collect())
    }

    async fn take_seat(&mut self, section_id: SectionId) -> Result<bool> {
        let available = {
            let state = lock_state(&self.state);
            self.seats(&state, section_id)
                .is_some_and(|s| s.remaining_slots > 0)
        };
        if available {
            self.pending.push(PendingWrite::TakeSeat(section_id));
        }
        Ok(available)
    }

    async fn release_seat(&mut self, section_id: SectionId) -> Result<()> {
        self.pending.push(PendingWrite::ReleaseSeat(section_id));
        Ok(())
    }

    async fn insert_enrollment(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<InsertOutcome> {
        let duplicate = {
            let state = lock_state(&self.state);
            if !state.sections.contains_key(&section_id) || !state.students.contains(&student_id)
            {
                bail!(
                    "foreign key violation: student {} / section {}",
                    student_id,
                    section_id
                );
            }
            self.enrolled(&state, student_id, section_id)
        };
        if duplicate {
            return Ok(InsertOutcome::Duplicate);
        }
        self.pending
            .push(PendingWrite::Insert(student_id, section_id));
        Ok(InsertOutcome::Inserted)
    }

    async fn delete_enrollment(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<bool> {
        let present = {
            let state = lock_state(&self.state);
            self.enrolled(&state, student_id, section_id)
        };
        if present {
            self.pending
                .push(PendingWrite::Delete(student_id, section_id));
        }
        Ok(present)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut state = lock_state(&self.state);

        // Validate against the committed state before publishing anything.
        let mut staged: HashMap<SectionId, i32> = HashMap::new();
        for write in &self.pending {
            if let PendingWrite::TakeSeat(id) | PendingWrite::ReleaseSeat(id) = *write {
                let Some(record) = state.sections.get(&id) else {
                    bail!("section {} vanished before commit", id);
                };
                let remaining = staged.entry(id).or_insert(record.remaining_slots);
                *remaining = match *write {
                    PendingWrite::TakeSeat(_) => *remaining - 1,
                    _ => (*remaining + 1).min(record.capacity),
                };
                if *remaining < 0 {
                    bail!("check constraint violated: section {} remaining_slots < 0", id);
                }
            }
        }

        for (id, remaining) in staged {
            if let Some(record) = state.sections.get_mut(&id) {
                record.remaining_slots = remaining;
            }
        }
        for write in &self.pending {
            match *write {
                PendingWrite::Insert(s, sec) => {
                    state.enrollments.insert((s, sec));
                }
                PendingWrite::Delete(s, sec) => {
                    state.enrollments.remove(&(s, sec));
                }
                _ => {}
            }
        }
        // Row locks release when `self.held` drops.
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn uncommitted_writes_are_invisible_and_discarded() {
        let store = InMemoryEnrollmentStore::new();
        store.add_student(1);
        store.add_section(7, 3, vec![]);

        let mut tx = store.begin().await.unwrap();
        tx.lock_section(7).await.unwrap();
        assert!(tx.take_seat(7).await.unwrap());
        assert_eq!(
            tx.insert_enrollment(1, 7).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert!(tx.enrollment_exists(1, 7).await.unwrap());
        assert_eq!(store.remaining_slots(7), Some(3));
        assert!(!store.is_enrolled(1, 7));

        drop(tx);

        assert_eq!(store.remaining_slots(7), Some(3));
        assert!(!store.is_enrolled(1, 7));
    }

    #[tokio::test]
    async fn section_lock_blocks_second_transaction_until_commit() {
        let store = Arc::new(InMemoryEnrollmentStore::new());
        store.add_section(7, 1, vec![]);

        let mut first = store.begin().await.unwrap();
        first.lock_section(7).await.unwrap();
        assert!(first.take_seat(7).await.unwrap());

        let contender = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut second = store.begin().await.unwrap();
                let seats = second.lock_section(7).await.unwrap().unwrap();
                second.rollback().await.unwrap();
                seats.remaining_slots
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        first.commit().await.unwrap();
        assert_eq!(contender.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn release_seat_is_capped_at_capacity() {
        let store = InMemoryEnrollmentStore::new();
        store.add_section(7, 2, vec![]);

        let mut tx = store.begin().await.unwrap();
        tx.release_seat(7).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.remaining_slots(7), Some(2));
    }

    #[tokio::test]
    async fn insert_for_unknown_student_fails() {
        let store = InMemoryEnrollmentStore::new();
        store.add_section(7, 2, vec![]);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.insert_enrollment(99, 7).await.is_err());
    }

    #[tokio::test]
    async fn row_lock_entries_are_pruned_when_transactions_end() {
        let store = Arc::new(InMemoryEnrollmentStore::new());
        store.add_student(1);
        store.add_section(7, 2, vec![]);

        for section_id in 1000..1100 {
            let mut tx = store.begin().await.unwrap();
            assert!(tx.lock_section(section_id).await.unwrap().is_none());
            tx.rollback().await.unwrap();
        }
        assert_eq!(store.tracked_row_locks(), 0);

        let mut first = store.begin().await.unwrap();
        first.lock_section(7).await.unwrap();
        first.lock_student(1).await.unwrap();
        assert_eq!(store.tracked_row_locks(), 2);

        let waiter = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut second = store.begin().await.unwrap();
                second.lock_section(7).await.unwrap();
                second.commit().await.unwrap();
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The waiter still references section 7, so only that entry survives.
        first.commit().await.unwrap();
        assert_eq!(store.tracked_row_locks(), 1);
        waiter.await.unwrap();
        assert_eq!(store.tracked_row_locks(), 0);
    }
}
