// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Attendance session model.
//!
//! A session is one worker's continuous presence interval at a field. It is
//! created open by a check-in and closed exactly once by the matching
//! check-out; the absence of `check_out_time` is the sole discriminator of
//! open vs closed.

use crate::geometry::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a presence signal was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMethod {
    /// Self-reported from the mobile client's GPS
    Gps,
    /// Card scan from a field-mounted reader
    Rfid,
}

impl CheckMethod {
    /// Device-sourced scans are a trusted ingestion path; GPS self-reports
    /// await supervisor confirmation.
    pub fn is_trusted(self) -> bool {
        matches!(self, CheckMethod::Rfid)
    }
}

/// Status assigned to a session at close time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Present,
    Absent,
    LeftEarly,
}

/// One worker's presence interval, stored in the attendance ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSession {
    /// Session ID (also used as document ID)
    pub session_id: String,
    /// Worker this session belongs to
    pub worker_id: String,
    /// Assigned field, if the assignment could be resolved
    pub field_id: Option<String>,

    pub check_in_time: DateTime<Utc>,
    pub check_in_location: Option<Coordinate>,
    pub check_in_method: CheckMethod,
    /// Reader device that produced the check-in, for device-sourced sessions
    pub check_in_device: Option<String>,
    /// Queue entry that produced the check-in; used to detect replays of an
    /// already-processed device event
    pub check_in_event_id: Option<String>,

    pub check_out_time: Option<DateTime<Utc>>,
    pub check_out_location: Option<Coordinate>,
    pub check_out_method: Option<CheckMethod>,
    pub check_out_device: Option<String>,
    /// Queue entry that closed the session; a redelivery of it must not
    /// reopen the worker
    pub check_out_event_id: Option<String>,

    /// True when the originating method is a trusted device ingestion path
    pub supervisor_verified: bool,
    /// Assigned at close time; defaults to present while open
    pub status: SessionStatus,
    /// Whether the recorded location fell outside the field boundary.
    /// `None` means the location could not be verified (no boundary or no
    /// location available).
    pub geofence_mismatch: Option<bool>,
}

impl AttendanceSession {
    /// Whether this session is still open (no check-out recorded).
    pub fn is_open(&self) -> bool {
        self.check_out_time.is_none()
    }
}

/// Fields written when closing a session.
#[derive(Debug, Clone)]
pub struct SessionClose {
    pub check_out_time: DateTime<Utc>,
    pub check_out_location: Option<Coordinate>,
    pub check_out_method: CheckMethod,
    pub check_out_device: Option<String>,
    pub check_out_event_id: Option<String>,
    pub status: SessionStatus,
    pub geofence_mismatch: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_trust() {
        assert!(CheckMethod::Rfid.is_trusted());
        assert!(!CheckMethod::Gps.is_trusted());
    }

    #[test]
    fn test_method_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&CheckMethod::Gps).unwrap(), "\"gps\"");
        assert_eq!(
            serde_json::to_string(&SessionStatus::LeftEarly).unwrap(),
            "\"left_early\""
        );
    }
}
