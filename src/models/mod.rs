// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the engine.

pub mod event;
pub mod field;
pub mod session;

pub use event::RawDeviceEvent;
pub use field::Field;
pub use session::{AttendanceSession, CheckMethod, SessionClose, SessionStatus};
