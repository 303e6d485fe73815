// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::Utc;
use fieldtrace::db::MemoryStore;
use fieldtrace::geometry::Coordinate;
use fieldtrace::models::RawDeviceEvent;
use fieldtrace::services::{AttendanceEngine, DeviceLogIngestor};

pub const WORKER: &str = "worker-1";
pub const CARD: &str = "04A1B2C3";
pub const FIELD: &str = "north-orchard";
pub const DEVICE: &str = "gate-1";

/// A small rectangular field boundary near Salinas.
#[allow(dead_code)]
pub fn field_boundary() -> Vec<Coordinate> {
    vec![
        Coordinate::new(36.6000, -121.6000),
        Coordinate::new(36.6000, -121.5960),
        Coordinate::new(36.6032, -121.5960),
        Coordinate::new(36.6032, -121.6000),
    ]
}

/// A point inside [`field_boundary`].
#[allow(dead_code)]
pub fn inside_field() -> Coordinate {
    Coordinate::new(36.6016, -121.5980)
}

/// A point well outside [`field_boundary`].
#[allow(dead_code)]
pub fn outside_field() -> Coordinate {
    Coordinate::new(36.7000, -121.7000)
}

/// A store with one registered worker, card, and field boundary.
#[allow(dead_code)]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.register_card(CARD, WORKER);
    store.assign_field(WORKER, FIELD);
    store.set_boundary(FIELD, field_boundary());
    store
}

/// An engine over clones of the given store.
#[allow(dead_code)]
pub fn engine(store: &MemoryStore) -> AttendanceEngine<MemoryStore, MemoryStore, MemoryStore> {
    AttendanceEngine::new(store.clone(), store.clone(), store.clone())
}

/// An ingestor over clones of the given store.
#[allow(dead_code)]
pub fn ingestor(
    store: &MemoryStore,
) -> DeviceLogIngestor<MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
    DeviceLogIngestor::new(store.clone(), engine(store))
}

/// A device scan event for the seeded card.
#[allow(dead_code)]
pub fn scan_event(event_id: &str) -> RawDeviceEvent {
    RawDeviceEvent {
        event_id: event_id.to_string(),
        card_uid: CARD.to_string(),
        device_id: DEVICE.to_string(),
        received_at: Utc::now(),
    }
}
