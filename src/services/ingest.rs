// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device-log queue drain.
//!
//! Pulls raw device events off the transient queue, reconciles them through
//! the engine, and deletes each consumed entry. The reconciliation write is
//! durable before cleanup is attempted; a failed delete leaves the entry for
//! the next cycle, where the engine's replay guard turns it into a conflict
//! instead of a duplicate session.

use crate::db::{AttendanceStore, EventQueue, FieldStore, IdentityStore};
use crate::error::Result;
use crate::services::reconcile::{AttendanceEngine, CheckOutcome};

/// Drains the raw device-event queue through the reconciliation engine.
pub struct DeviceLogIngestor<Q, I, A, F> {
    queue: Q,
    engine: AttendanceEngine<I, A, F>,
}

impl<Q, I, A, F> DeviceLogIngestor<Q, I, A, F>
where
    Q: EventQueue,
    I: IdentityStore,
    A: AttendanceStore,
    F: FieldStore,
{
    pub fn new(queue: Q, engine: AttendanceEngine<I, A, F>) -> Self {
        Self { queue, engine }
    }

    /// Process queued events until the queue is empty.
    ///
    /// Returns the number of events consumed. Store failures propagate
    /// without deleting the in-flight event, so it is retried next cycle.
    pub async fn drain(&self) -> Result<usize> {
        let mut processed = 0;

        while let Some(event) = self.queue.next_event().await? {
            let outcome = self.engine.process_device_event(&event).await?;

            match &outcome {
                CheckOutcome::CheckedIn { session_id, .. } => {
                    tracing::debug!(event_id = %event.event_id, session_id = %session_id, "Event opened a session");
                }
                CheckOutcome::CheckedOut { session_id, .. } => {
                    tracing::debug!(event_id = %event.event_id, session_id = %session_id, "Event closed a session");
                }
                CheckOutcome::Conflict { reason } => {
                    tracing::info!(event_id = %event.event_id, reason = ?reason, "Event resolved to a conflict");
                }
                CheckOutcome::UnresolvedIdentity => {
                    tracing::info!(event_id = %event.event_id, "Event card not registered");
                }
            }

            // The ledger write above is durable; cleanup is best-effort.
            // Unresolved cards are consumed too so they are not retried
            // forever.
            if let Err(e) = self.queue.delete_event(&event.event_id).await {
                tracing::warn!(
                    event_id = %event.event_id,
                    error = %e,
                    "Failed to delete processed device event; leaving for next cycle"
                );
                processed += 1;
                break;
            }

            processed += 1;
        }

        Ok(processed)
    }
}
