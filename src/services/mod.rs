// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Services module - business logic layer.

pub mod milestone;
pub mod progress;
pub mod registry;
pub mod tracker;

pub use progress::ProgressError;
pub use registry::{Tracked, TrackerRegistry, UserTrackers};
pub use tracker::{LogOutcome, Tracker};
