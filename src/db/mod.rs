//! Storage layer: store interfaces and their implementations.
//!
//! The engine never reaches for ambient globals; it takes these interfaces as
//! explicit parameters, so tests run against [`MemoryStore`] while production
//! uses [`FirestoreDb`].

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::geometry::Coordinate;
use crate::models::{AttendanceSession, RawDeviceEvent, SessionClose};

/// Collection names as constants.
pub mod collections {
    /// Card UID → worker mapping, keyed by (encoded) card UID
    pub const RFID_CARDS: &str = "rfid_cards";
    /// Worker profiles (field assignment lives here)
    pub const USERS: &str = "users";
    /// Attendance sessions
    pub const ATTENDANCE: &str = "attendance";
    /// Raw device-event queue
    pub const DEVICE_EVENTS: &str = "device_events";
}

/// Read access to worker identity data.
#[allow(async_fn_in_trait)]
pub trait IdentityStore {
    /// Resolve a card UID to a worker via the 1:1 card → worker mapping.
    async fn worker_by_card(&self, card_uid: &str) -> Result<Option<String>>;

    /// Look up the field a worker is assigned to, if any.
    async fn field_assignment(&self, worker_id: &str) -> Result<Option<String>>;
}

/// Read/write access to the attendance ledger.
#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    /// All open sessions for a worker, most recent check-in first.
    ///
    /// A well-formed ledger has at most one; returning them all lets the
    /// engine detect the integrity violation instead of silently picking one.
    async fn open_sessions(&self, worker_id: &str) -> Result<Vec<AttendanceSession>>;

    /// The worker's most recently opened session, open or closed.
    ///
    /// Lets the engine recognize a redelivered device event that already
    /// closed a session, instead of treating it as a fresh check-in.
    async fn latest_session(&self, worker_id: &str) -> Result<Option<AttendanceSession>>;

    /// Write a new open session, re-checking immediately before the write
    /// that the worker still has no open session.
    ///
    /// Returns false (and writes nothing) when an open session exists; this
    /// closes the race between two near-simultaneous check-ins for the same
    /// worker.
    async fn create_session_if_none_open(&self, session: &AttendanceSession) -> Result<bool>;

    /// Close a session, setting the check-out fields. Closing is terminal.
    async fn close_session(&self, session_id: &str, close: &SessionClose) -> Result<()>;
}

/// Read access to field boundaries.
#[allow(async_fn_in_trait)]
pub trait FieldStore {
    /// Boundary polygon for a field, if known.
    async fn field_boundary(&self, field_id: &str) -> Result<Option<Vec<Coordinate>>>;
}

/// The transient raw device-event queue.
#[allow(async_fn_in_trait)]
pub trait EventQueue {
    /// Oldest unprocessed device event, if any.
    async fn next_event(&self) -> Result<Option<RawDeviceEvent>>;

    /// Remove a processed event from the queue.
    async fn delete_event(&self, event_id: &str) -> Result<()>;
}
