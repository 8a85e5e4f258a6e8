// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Stanford 360: daily activity, hydration and protein tracking
//!
//! This crate provides the backend API that logs entries for the three
//! metrics, buckets them into local days and reports goal progress,
//! streaks and milestones.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::TrackerRegistry;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub trackers: TrackerRegistry,
}
