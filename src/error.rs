// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engine error types.
//!
//! Business outcomes (already checked in, nothing to close, unknown card) are
//! NOT errors; they are reported as [`crate::services::CheckOutcome`] values.
//! This enum covers the failures that abort an operation.

/// Errors that abort a reconciliation operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Transient store failure (network, timeout). Retryable by the caller;
    /// the engine performs no retry internally.
    #[error("Database error: {0}")]
    Database(String),

    /// More than one open session found for a worker. Requires operator
    /// remediation; the engine never auto-resolves this.
    #[error("Attendance ledger integrity violation: {0}")]
    Integrity(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
