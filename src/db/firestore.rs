// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Backs three of the engine's store interfaces:
//! - [`IdentityStore`]: `rfid_cards` and `users` collections
//! - [`AttendanceStore`]: `attendance` collection
//! - [`EventQueue`]: `device_events` collection
//!
//! Field boundaries are served from the GeoJSON file loaded at startup (see
//! [`crate::services::BoundaryService`]), not from Firestore.

use crate::db::{collections, AttendanceStore, EventQueue, IdentityStore};
use crate::error::{EngineError, Result};
use crate::models::{AttendanceSession, RawDeviceEvent, SessionClose};
use serde::Deserialize;

/// How many queue documents to fetch per poll. Malformed entries are dropped
/// in place, so one fetch can yield the next valid event without re-querying.
const QUEUE_PEEK_LIMIT: u32 = 10;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Card UID → worker mapping document.
#[derive(Debug, Deserialize)]
struct CardDoc {
    worker_id: String,
}

/// The slice of the worker profile the engine reads.
#[derive(Debug, Deserialize)]
struct WorkerDoc {
    #[serde(default)]
    assigned_field_id: Option<String>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| EngineError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            EngineError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb> {
        self.client.as_ref().ok_or_else(|| {
            EngineError::Database("Database not connected (offline mode)".to_string())
        })
    }

    /// Document id for a card mapping. Card UIDs come straight off reader
    /// firmware, so encode them before use as a document path segment.
    fn card_doc_id(card_uid: &str) -> String {
        urlencoding::encode(card_uid).into_owned()
    }
}

impl IdentityStore for FirestoreDb {
    async fn worker_by_card(&self, card_uid: &str) -> Result<Option<String>> {
        let doc: Option<CardDoc> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RFID_CARDS)
            .obj()
            .one(&Self::card_doc_id(card_uid))
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?;

        Ok(doc.map(|c| c.worker_id))
    }

    async fn field_assignment(&self, worker_id: &str) -> Result<Option<String>> {
        let doc: Option<WorkerDoc> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(worker_id)
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?;

        Ok(doc.and_then(|w| w.assigned_field_id))
    }
}

impl AttendanceStore for FirestoreDb {
    async fn open_sessions(&self, worker_id: &str) -> Result<Vec<AttendanceSession>> {
        // Firestore cannot filter on a missing field, so filter on the worker
        // and drop closed sessions client-side.
        let worker = worker_id.to_string();
        let sessions: Vec<AttendanceSession> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ATTENDANCE)
            .filter(move |q| q.for_all([q.field("worker_id").eq(worker.clone())]))
            .order_by([(
                "check_in_time",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?;

        Ok(sessions.into_iter().filter(|s| s.is_open()).collect())
    }

    async fn latest_session(&self, worker_id: &str) -> Result<Option<AttendanceSession>> {
        let worker = worker_id.to_string();
        let sessions: Vec<AttendanceSession> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ATTENDANCE)
            .filter(move |q| q.for_all([q.field("worker_id").eq(worker.clone())]))
            .order_by([(
                "check_in_time",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?;

        Ok(sessions.into_iter().next())
    }

    async fn create_session_if_none_open(&self, session: &AttendanceSession) -> Result<bool> {
        let client = self.get_client()?;

        // Re-check inside a transaction so a second near-simultaneous writer
        // is rejected instead of opening a concurrent session. The read is
        // routed through the transaction's consistency selector, putting it
        // in the transaction's read set; the loser of a race then fails at
        // commit instead of writing a second open session.
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| EngineError::Database(format!("Failed to begin transaction: {}", e)))?;

        let tx_client = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let worker = session.worker_id.clone();
        let existing: Vec<AttendanceSession> = match tx_client
            .fluent()
            .select()
            .from(collections::ATTENDANCE)
            .filter(move |q| q.for_all([q.field("worker_id").eq(worker.clone())]))
            .obj()
            .query()
            .await
        {
            Ok(sessions) => sessions,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(EngineError::Database(e.to_string()));
            }
        };

        if existing.iter().any(|s| s.is_open()) {
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        if let Err(e) = client
            .fluent()
            .update()
            .in_col(collections::ATTENDANCE)
            .document_id(&session.session_id)
            .object(session)
            .add_to_transaction(&mut transaction)
        {
            let _ = transaction.rollback().await;
            return Err(EngineError::Database(format!(
                "Failed to add session to transaction: {}",
                e
            )));
        }

        transaction
            .commit()
            .await
            .map_err(|e| EngineError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            worker_id = %session.worker_id,
            session_id = %session.session_id,
            "Session created"
        );

        Ok(true)
    }

    async fn close_session(&self, session_id: &str, close: &SessionClose) -> Result<()> {
        let mut session: AttendanceSession = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ATTENDANCE)
            .obj()
            .one(session_id)
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?
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

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ATTENDANCE)
            .document_id(session_id)
            .object(&session)
            .execute()
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?;

        Ok(())
    }
}

impl EventQueue for FirestoreDb {
    async fn next_event(&self) -> Result<Option<RawDeviceEvent>> {
        // Fetch raw documents and decode each one individually. Devices post
        // arbitrary payloads here; a single undecodable entry must be dropped
        // in place, not allowed to fail the whole fetch and wedge the queue.
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::DEVICE_EVENTS)
            .order_by([(
                "received_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .limit(QUEUE_PEEK_LIMIT)
            .query()
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?;

        for doc in docs {
            // Queue entries are keyed by event id
            let event_id = doc.name.rsplit('/').next().unwrap_or_default().to_string();

            let parsed = firestore::FirestoreDb::deserialize_doc_to::<serde_json::Value>(&doc)
                .map_err(|e| e.to_string())
                .and_then(|payload| {
                    RawDeviceEvent::from_value(event_id.clone(), payload)
                        .map_err(|e| e.to_string())
                });

            match parsed {
                Ok(event) => return Ok(Some(event)),
                Err(e) => {
                    // Reject malformed payloads at the boundary; they never
                    // reach the state machine.
                    tracing::warn!(
                        event_id = %event_id,
                        error = %e,
                        "Dropping malformed device event"
                    );
                    self.delete_event(&event_id).await?;
                }
            }
        }

        Ok(None)
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::DEVICE_EVENTS)
            .document_id(event_id)
            .execute()
            .await
            .map_err(|e| EngineError::Database(e.to_string()))?;
        Ok(())
    }
}
