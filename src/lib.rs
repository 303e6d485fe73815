// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fieldtrace: field-boundary geofencing and attendance reconciliation
//!
//! This crate turns raw presence signals (RFID card scans from field devices,
//! GPS check-ins from a mobile client) into a consistent attendance ledger
//! with at most one open session per worker, optionally geofenced against the
//! worker's assigned field boundary.

pub mod config;
pub mod db;
pub mod error;
pub mod geometry;
pub mod models;
pub mod services;
pub mod time_utils;
