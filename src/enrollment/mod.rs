//! Enrollment core: conflict detection, the persistence port, the engine,
//! and an in-memory store implementing the port (`test-util` feature).

pub mod conflict;
pub mod engine;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod store;

pub use conflict::{find_conflict, meetings_overlap, Conflict};
pub use engine::{EnrollmentConfirmation, EnrollmentEngine};
#[cfg(any(test, feature = "test-util"))]
pub use memory::InMemoryEnrollmentStore;
pub use store::{EnrollmentStore, EnrollmentTx, InsertOutcome, SeatCounter};
