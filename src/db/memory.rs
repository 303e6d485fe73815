// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store implementation.
//!
//! Implements all four store interfaces over shared maps. Used by tests and
//! for local development without a Firestore emulator. An offline switch
//! makes every operation fail with a transient database error, mirroring the
//! mock mode of [`crate::db::FirestoreDb`].

use crate::db::{AttendanceStore, EventQueue, FieldStore, IdentityStore};
use crate::error::{EngineError, Result};
use crate::geometry::Coordinate;
use crate::models::{AttendanceSession, RawDeviceEvent, SessionClose};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default, Clone)]
pub struct MemoryStore {
    /// card_uid → worker_id
    cards: Arc<DashMap<String, String>>,
    /// worker_id → field_id
    assignments: Arc<DashMap<String, String>>,
    /// field_id → boundary polygon
    boundaries: Arc<DashMap<String, Vec<Coordinate>>>,
    /// session_id → session
    sessions: Arc<DashMap<String, AttendanceSession>>,
    /// Pending device events, oldest first
    events: Arc<Mutex<VecDeque<RawDeviceEvent>>>,
    /// Serializes the open-session re-check with the session write
    create_gate: Arc<Mutex<()>>,
    /// When set, every operation fails with a transient database error
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card → worker mapping.
    pub fn register_card(&self, card_uid: &str, worker_id: &str) {
        self.cards.insert(card_uid.to_string(), worker_id.to_string());
    }

    /// Assign a worker to a field.
    pub fn assign_field(&self, worker_id: &str, field_id: &str) {
        self.assignments
            .insert(worker_id.to_string(), field_id.to_string());
    }

    /// Store a field boundary.
    pub fn set_boundary(&self, field_id: &str, boundary: Vec<Coordinate>) {
        self.boundaries.insert(field_id.to_string(), boundary);
    }

    /// Append a device event to the queue.
    pub fn push_event(&self, event: RawDeviceEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(event);
    }

    /// Toggle offline mode; while offline every operation returns a
    /// transient database error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Look up a stored session by id.
    pub fn session(&self, session_id: &str) -> Option<AttendanceSession> {
        self.sessions.get(session_id).map(|s| s.value().clone())
    }

    /// All stored sessions for a worker, open and closed.
    pub fn sessions_for_worker(&self, worker_id: &str) -> Vec<AttendanceSession> {
        self.sessions
            .iter()
            .filter(|s| s.worker_id == worker_id)
            .map(|s| s.value().clone())
            .collect()
    }

    /// Number of queued device events.
    pub fn queue_len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Insert a session directly, bypassing the open-session check. Lets
    /// tests construct a corrupted ledger (two open sessions).
    pub fn insert_session_unchecked(&self, session: AttendanceSession) {
        self.sessions.insert(session.session_id.clone(), session);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(EngineError::Database("store unreachable".to_string()));
        }
        Ok(())
    }

    /// A poisoned lock means a writer panicked mid-operation; surface it as
    /// a transient store failure rather than cascading the panic.
    fn lock_events(&self) -> Result<std::sync::MutexGuard<'_, VecDeque<RawDeviceEvent>>> {
        self.events
            .lock()
            .map_err(|_| EngineError::Database("event queue lock poisoned".to_string()))
    }
}

impl IdentityStore for MemoryStore {
    async fn worker_by_card(&self, card_uid: &str) -> Result<Option<String>> {
        self.check_online()?;
        Ok(self.cards.get(card_uid).map(|w| w.value().clone()))
    }

    async fn field_assignment(&self, worker_id: &str) -> Result<Option<String>> {
        self.check_online()?;
        Ok(self.assignments.get(worker_id).map(|f| f.value().clone()))
    }
}

impl AttendanceStore for MemoryStore {
    async fn open_sessions(&self, worker_id: &str) -> Result<Vec<AttendanceSession>> {
        self.check_online()?;
        let mut open: Vec<AttendanceSession> = self
            .sessions
            .iter()
            .filter(|s| s.worker_id == worker_id && s.is_open())
            .map(|s| s.value().clone())
            .collect();
        open.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
        Ok(open)
    }

    async fn latest_session(&self, worker_id: &str) -> Result<Option<AttendanceSession>> {
        self.check_online()?;
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.worker_id == worker_id)
            .max_by_key(|s| s.check_in_time)
            .map(|s| s.value().clone()))
    }

    async fn create_session_if_none_open(&self, session: &AttendanceSession) -> Result<bool> {
        self.check_online()?;
        let _gate = self
            .create_gate
            .lock()
            .map_err(|_| EngineError::Database("session create lock poisoned".to_string()))?;
        let already_open = self
            .sessions
            .iter()
            .any(|s| s.worker_id == session.worker_id && s.is_open());
        if already_open {
            return Ok(false);
        }
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(true)
    }

    async fn close_session(&self, session_id: &str, close: &SessionClose) -> Result<()> {
        self.check_online()?;
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| EngineError::Database(format!("Session {} not found", session_id)))?;
        session.check_out_time = Some(close.check_out_time);
        session.check_out_location = close.check_out_location;
        session.check_out_method = Some(close.check_out_method);
        session.check_out_device = close.check_out_device.clone();
        session.check_out_event_id = close.check_out_event_id.clone();
        session.status = close.status;
        if close.geofence_mismatch.is_some() {
            session.geofence_mismatch = close.geofence_mismatch;
        }
        Ok(())
    }
}

impl FieldStore for MemoryStore {
    async fn field_boundary(&self, field_id: &str) -> Result<Option<Vec<Coordinate>>> {
        self.check_online()?;
        Ok(self.boundaries.get(field_id).map(|b| b.value().clone()))
    }
}

impl EventQueue for MemoryStore {
    async fn next_event(&self) -> Result<Option<RawDeviceEvent>> {
        self.check_online()?;
        Ok(self.lock_events()?.front().cloned())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        self.check_online()?;
        self.lock_events()?.retain(|e| e.event_id != event_id);
        Ok(())
    }
}
