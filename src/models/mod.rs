// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Data models for the application.

pub mod activity;
pub mod entry;
pub mod hydration;
pub mod metric;
pub mod progress;
pub mod protein;

pub use activity::{ActivityEntry, ActivityType, NewActivity};
pub use entry::{EntryDraft, EntryView, TrackedEntry};
pub use hydration::{HydrationEntry, NewHydration};
pub use metric::{Goal, Metric};
pub use progress::{DailyPoint, DailyProgress, Milestone, ProgressSummary};
pub use protein::{NewMeal, ProteinEntry};
