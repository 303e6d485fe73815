// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod boundary;
pub mod ingest;
pub mod reconcile;

pub use boundary::{BoundaryError, BoundaryService};
pub use ingest::DeviceLogIngestor;
pub use reconcile::{AttendanceEngine, CheckOutcome, ConflictReason};
