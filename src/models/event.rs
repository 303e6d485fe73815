// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Raw device events awaiting reconciliation.
//!
//! Field readers post loose JSON; payloads are validated here, at the adapter
//! boundary, before anything reaches the state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An unprocessed card scan from a field reader.
///
/// Transient: consumed and deleted from the queue after processing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RawDeviceEvent {
    /// Queue entry ID (also used as document ID)
    pub event_id: String,
    /// Card UID as reported by the reader
    #[validate(length(min = 1))]
    pub card_uid: String,
    /// Reader device that produced the scan
    #[validate(length(min = 1))]
    pub device_id: String,
    /// When the scan was received
    pub received_at: DateTime<Utc>,
}

impl RawDeviceEvent {
    /// Parse and validate a loose JSON payload.
    pub fn from_value(event_id: String, value: serde_json::Value) -> Result<Self, EventParseError> {
        #[derive(Deserialize)]
        struct Payload {
            card_uid: String,
            device_id: String,
            received_at: Option<DateTime<Utc>>,
        }

        let payload: Payload = serde_json::from_value(value)
            .map_err(|e| EventParseError::InvalidPayload(e.to_string()))?;

        let event = Self {
            event_id,
            card_uid: payload.card_uid,
            device_id: payload.device_id,
            received_at: payload.received_at.unwrap_or_else(Utc::now),
        };
        event
            .validate()
            .map_err(|e| EventParseError::InvalidPayload(e.to_string()))?;
        Ok(event)
    }
}

/// Errors from device event payload parsing.
#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("Invalid device event payload: {0}")]
    InvalidPayload(String),
}
