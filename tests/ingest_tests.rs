// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end device-log ingest tests.
//!
//! Drive the full path: queue entry → identity resolution → reconciliation →
//! queue cleanup, including the replay and unknown-card cases.

mod common;

use common::*;
use fieldtrace::error::EngineError;
use fieldtrace::models::CheckMethod;
use fieldtrace::services::{CheckOutcome, ConflictReason};

#[tokio::test]
async fn test_rfid_round_trip() {
    let store = seeded_store();
    let ingestor = ingestor(&store);

    // Morning scan: check-in
    store.push_event(scan_event("ev-1"));
    assert_eq!(ingestor.drain().await.unwrap(), 1);

    let sessions = store.sessions_for_worker(WORKER);
    assert_eq!(sessions.len(), 1);
    let session = &sessions[0];
    assert!(session.is_open());
    assert_eq!(session.check_in_method, CheckMethod::Rfid);
    assert_eq!(session.check_in_device.as_deref(), Some(DEVICE));
    // Device ingestion is a trusted path
    assert!(session.supervisor_verified);
    assert_eq!(store.queue_len(), 0, "queue entry consumed");

    // Evening scan at the same card: check-out of that exact session
    store.push_event(scan_event("ev-2"));
    assert_eq!(ingestor.drain().await.unwrap(), 1);

    let sessions = store.sessions_for_worker(WORKER);
    assert_eq!(sessions.len(), 1, "same session closed, not a new one");
    assert!(!sessions[0].is_open());
    assert_eq!(sessions[0].check_out_method, Some(CheckMethod::Rfid));
    assert_eq!(store.queue_len(), 0);
}

#[tokio::test]
async fn test_unregistered_card_consumed_without_session() {
    let store = seeded_store();
    let engine = engine(&store);
    let ingestor = ingestor(&store);

    let mut event = scan_event("ev-zzzz");
    event.card_uid = "ZZZZ".to_string();

    let outcome = engine.process_device_event(&event).await.unwrap();
    assert_eq!(outcome, CheckOutcome::UnresolvedIdentity);

    store.push_event(event);
    assert_eq!(ingestor.drain().await.unwrap(), 1);

    assert!(store.sessions_for_worker(WORKER).is_empty());
    assert_eq!(store.queue_len(), 0, "unknown cards are consumed, not retried");
}

#[tokio::test]
async fn test_replayed_event_is_conflict_not_toggle() {
    let store = seeded_store();
    let engine = engine(&store);

    let event = scan_event("ev-1");
    let outcome = engine.process_device_event(&event).await.unwrap();
    assert!(matches!(outcome, CheckOutcome::CheckedIn { .. }));

    // Same queue entry delivered again (cleanup crashed before the delete):
    // must not open a duplicate session, and must not close the real one.
    let outcome = engine.process_device_event(&event).await.unwrap();
    assert_eq!(
        outcome,
        CheckOutcome::Conflict {
            reason: ConflictReason::AlreadyCheckedIn
        }
    );

    let sessions = store.sessions_for_worker(WORKER);
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].is_open(), "replay must not toggle the session closed");
}

#[tokio::test]
async fn test_replayed_checkout_event_does_not_reopen() {
    let store = seeded_store();
    let engine = engine(&store);

    engine
        .process_device_event(&scan_event("ev-1"))
        .await
        .unwrap();
    let checkout = scan_event("ev-2");
    let outcome = engine.process_device_event(&checkout).await.unwrap();
    assert!(matches!(outcome, CheckOutcome::CheckedOut { .. }));

    // The check-out's queue entry delivered again (cleanup crashed before
    // the delete): the worker is now checked out, so a naive toggle would
    // open a phantom session.
    let outcome = engine.process_device_event(&checkout).await.unwrap();
    assert_eq!(
        outcome,
        CheckOutcome::Conflict {
            reason: ConflictReason::NoOpenSession
        }
    );

    let sessions = store.sessions_for_worker(WORKER);
    assert_eq!(sessions.len(), 1, "replay must not open a new session");
    assert!(!sessions[0].is_open(), "the closed session stays closed");
    assert_eq!(sessions[0].check_out_event_id.as_deref(), Some("ev-2"));
}

#[tokio::test]
async fn test_distinct_second_scan_still_checks_out() {
    let store = seeded_store();
    let engine = engine(&store);

    engine
        .process_device_event(&scan_event("ev-1"))
        .await
        .unwrap();
    let outcome = engine
        .process_device_event(&scan_event("ev-2"))
        .await
        .unwrap();

    assert!(matches!(outcome, CheckOutcome::CheckedOut { .. }));
}

#[tokio::test]
async fn test_drain_processes_queue_in_order() {
    let store = seeded_store();
    let ingestor = ingestor(&store);

    store.push_event(scan_event("ev-1"));
    store.push_event(scan_event("ev-2"));

    assert_eq!(ingestor.drain().await.unwrap(), 2);

    // First event checked in, second checked out
    let sessions = store.sessions_for_worker(WORKER);
    assert_eq!(sessions.len(), 1);
    assert!(!sessions[0].is_open());
    assert_eq!(store.queue_len(), 0);
}

#[tokio::test]
async fn test_drain_on_empty_queue_is_noop() {
    let store = seeded_store();
    let ingestor = ingestor(&store);
    assert_eq!(ingestor.drain().await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_failure_leaves_event_queued() {
    let store = seeded_store();
    let ingestor = ingestor(&store);

    store.push_event(scan_event("ev-1"));
    store.set_offline(true);

    let result = ingestor.drain().await;
    assert!(matches!(result, Err(EngineError::Database(_))));

    store.set_offline(false);
    assert_eq!(store.queue_len(), 1, "event kept for the next cycle");

    // Next cycle succeeds normally
    assert_eq!(ingestor.drain().await.unwrap(), 1);
    assert_eq!(store.sessions_for_worker(WORKER).len(), 1);
}
