// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance reconciliation engine.
//!
//! Turns raw presence signals into a consistent ledger with at most one open
//! session per worker:
//! 1. Resolve the signal to a worker identity
//! 2. Query the worker's open-session state
//! 3. Open a new session (check-in) or close the existing one (check-out)
//! 4. Geofence the recorded location against the assigned field boundary,
//!    flagging mismatches without rejecting the action
//!
//! Business conflicts (already checked in, nothing to close, unknown card)
//! are reported as [`CheckOutcome`] values, never as errors.

use crate::db::{AttendanceStore, FieldStore, IdentityStore};
use crate::error::{EngineError, Result};
use crate::geometry::{self, Coordinate};
use crate::models::{AttendanceSession, CheckMethod, RawDeviceEvent, SessionClose, SessionStatus};
use chrono::Utc;
use serde::Serialize;

/// Caller-facing outcome of a reconciliation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckOutcome {
    CheckedIn {
        session_id: String,
        geofence_mismatch: Option<bool>,
    },
    CheckedOut {
        session_id: String,
        geofence_mismatch: Option<bool>,
    },
    Conflict {
        reason: ConflictReason,
    },
    UnresolvedIdentity,
}

/// Why a check-in or check-out was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    AlreadyCheckedIn,
    NoOpenSession,
}

/// The reconciliation engine. Stateless between calls; all state lives in
/// the stores it is constructed with.
pub struct AttendanceEngine<I, A, F> {
    identity: I,
    attendance: A,
    fields: F,
}

impl<I, A, F> AttendanceEngine<I, A, F>
where
    I: IdentityStore,
    A: AttendanceStore,
    F: FieldStore,
{
    pub fn new(identity: I, attendance: A, fields: F) -> Self {
        Self {
            identity,
            attendance,
            fields,
        }
    }

    /// Open a new session for a worker.
    ///
    /// Returns a conflict if the worker already has an open session. The
    /// store re-checks immediately before the write, so a lost race also
    /// surfaces as the same conflict rather than a second open session.
    pub async fn check_in(
        &self,
        worker_id: &str,
        location: Option<Coordinate>,
        method: CheckMethod,
        device_id: Option<&str>,
        event_id: Option<&str>,
    ) -> Result<CheckOutcome> {
        if self.open_session(worker_id).await?.is_some() {
            tracing::info!(worker_id, "Check-in refused: session already open");
            return Ok(CheckOutcome::Conflict {
                reason: ConflictReason::AlreadyCheckedIn,
            });
        }

        let field_id = self.identity.field_assignment(worker_id).await?;
        let geofence_mismatch = self
            .geofence_mismatch(field_id.as_deref(), location)
            .await?;

        let now = Utc::now();
        let session = AttendanceSession {
            session_id: format!("{}-{}", worker_id, now.timestamp_millis()),
            worker_id: worker_id.to_string(),
            field_id,
            check_in_time: now,
            check_in_location: location,
            check_in_method: method,
            check_in_device: device_id.map(|d| d.to_string()),
            check_in_event_id: event_id.map(|e| e.to_string()),
            check_out_time: None,
            check_out_location: None,
            check_out_method: None,
            check_out_device: None,
            check_out_event_id: None,
            supervisor_verified: method.is_trusted(),
            status: SessionStatus::Present,
            geofence_mismatch,
        };

        let created = self.attendance.create_session_if_none_open(&session).await?;
        if !created {
            tracing::warn!(
                worker_id,
                "Check-in lost a race with a concurrent open; refusing"
            );
            return Ok(CheckOutcome::Conflict {
                reason: ConflictReason::AlreadyCheckedIn,
            });
        }

        tracing::info!(
            worker_id,
            session_id = %session.session_id,
            method = ?method,
            verified = session.supervisor_verified,
            "Checked in"
        );

        Ok(CheckOutcome::CheckedIn {
            session_id: session.session_id,
            geofence_mismatch,
        })
    }

    /// Close the worker's open session.
    ///
    /// Returns a conflict if there is nothing to close. For device-sourced
    /// check-outs, `event_id` is recorded on the session so a redelivery of
    /// the same queue entry is recognized instead of opening a new session.
    pub async fn check_out(
        &self,
        worker_id: &str,
        location: Option<Coordinate>,
        method: CheckMethod,
        device_id: Option<&str>,
        event_id: Option<&str>,
    ) -> Result<CheckOutcome> {
        let Some(session) = self.open_session(worker_id).await? else {
            tracing::info!(worker_id, "Check-out refused: no open session");
            return Ok(CheckOutcome::Conflict {
                reason: ConflictReason::NoOpenSession,
            });
        };

        let geofence_mismatch = self
            .geofence_mismatch(session.field_id.as_deref(), location)
            .await?;

        let close = SessionClose {
            check_out_time: Utc::now(),
            check_out_location: location,
            check_out_method: method,
            check_out_device: device_id.map(|d| d.to_string()),
            check_out_event_id: event_id.map(|e| e.to_string()),
            // No close-time business rule is defined beyond the default.
            status: SessionStatus::Present,
            geofence_mismatch,
        };

        self.attendance
            .close_session(&session.session_id, &close)
            .await?;

        tracing::info!(
            worker_id,
            session_id = %session.session_id,
            method = ?method,
            "Checked out"
        );

        Ok(CheckOutcome::CheckedOut {
            session_id: session.session_id,
            geofence_mismatch,
        })
    }

    /// Reconcile one raw device event.
    ///
    /// Device scans carry no direction, so the current open-session state
    /// decides: no open session means check-in, an open session means
    /// check-out. A replay of the event that opened the current session is
    /// refused as a conflict rather than toggling the worker back out, and
    /// a replay of the event that closed the latest session is refused
    /// rather than reopening the worker.
    pub async fn process_device_event(&self, event: &RawDeviceEvent) -> Result<CheckOutcome> {
        let Some(worker_id) = self.identity.worker_by_card(&event.card_uid).await? else {
            // The reader has no feedback channel; unregistered cards are
            // logged and ignored.
            tracing::info!(card_uid = %event.card_uid, "Card not registered; ignoring scan");
            return Ok(CheckOutcome::UnresolvedIdentity);
        };

        match self.open_session(&worker_id).await? {
            Some(session) if session.check_in_event_id.as_deref() == Some(&event.event_id) => {
                tracing::info!(
                    worker_id = %worker_id,
                    event_id = %event.event_id,
                    "Replayed device event for an already-open session; refusing"
                );
                Ok(CheckOutcome::Conflict {
                    reason: ConflictReason::AlreadyCheckedIn,
                })
            }
            Some(_) => {
                self.check_out(
                    &worker_id,
                    None,
                    CheckMethod::Rfid,
                    Some(&event.device_id),
                    Some(&event.event_id),
                )
                .await
            }
            None => {
                // A redelivery of the event that closed the latest session
                // must not open a fresh one.
                let latest = self.attendance.latest_session(&worker_id).await?;
                if latest.is_some_and(|s| {
                    s.check_out_event_id.as_deref() == Some(&event.event_id)
                }) {
                    tracing::info!(
                        worker_id = %worker_id,
                        event_id = %event.event_id,
                        "Replayed device event already closed a session; refusing"
                    );
                    return Ok(CheckOutcome::Conflict {
                        reason: ConflictReason::NoOpenSession,
                    });
                }

                self.check_in(
                    &worker_id,
                    None,
                    CheckMethod::Rfid,
                    Some(&event.device_id),
                    Some(&event.event_id),
                )
                .await
            }
        }
    }

    /// The worker's unique open session, if any.
    ///
    /// More than one open session is a corrupted ledger; the operation is
    /// aborted and the condition logged for operator remediation.
    async fn open_session(&self, worker_id: &str) -> Result<Option<AttendanceSession>> {
        let mut open = self.attendance.open_sessions(worker_id).await?;
        match open.len() {
            0 => Ok(None),
            1 => Ok(open.pop()),
            n => {
                tracing::error!(
                    worker_id,
                    open_count = n,
                    "Multiple open sessions found for worker; refusing to reconcile"
                );
                Err(EngineError::Integrity(format!(
                    "worker {} has {} open sessions",
                    worker_id, n
                )))
            }
        }
    }

    /// Whether a recorded location falls outside the assigned field boundary.
    ///
    /// `None` when the location cannot be verified: no assignment, no
    /// location, or a degenerate boundary.
    async fn geofence_mismatch(
        &self,
        field_id: Option<&str>,
        location: Option<Coordinate>,
    ) -> Result<Option<bool>> {
        let (Some(field_id), Some(location)) = (field_id, location) else {
            return Ok(None);
        };

        match self.fields.field_boundary(field_id).await? {
            Some(boundary) if boundary.len() >= 3 => {
                Ok(Some(!geometry::is_point_in_polygon(location, &boundary)))
            }
            _ => Ok(None),
        }
    }
}
