// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Activity log model for storage and API.

use crate::models::entry::{EntryDraft, EntryView, TrackedEntry};
use crate::models::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Rough steps-per-minute used when the client does not report steps.
pub const ESTIMATED_STEPS_PER_MINUTE: u32 = 100;

/// Stored activity record in Firestore (`users/{uid}/activities/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Document ID
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    pub steps: u32,
    pub active_minutes: u32,
    pub activity_type: ActivityType,
    /// When the activity happened (user-editable, never in the future)
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
}

/// Kinds of activity offered in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivityType {
    Walking,
    Running,
    Swimming,
    Cycling,
    Dancing,
    Sports,
    #[default]
    #[serde(other)]
    Other,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Walking => "Walking",
            ActivityType::Running => "Running",
            ActivityType::Swimming => "Swimming",
            ActivityType::Cycling => "Cycling",
            ActivityType::Dancing => "Dancing",
            ActivityType::Sports => "Sports",
            ActivityType::Other => "Other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TrackedEntry for ActivityEntry {
    const METRIC: Metric = Metric::Activity;
    const COLLECTION: &'static str = "activities";

    type Draft = NewActivity;

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.date
    }

    fn quantity(&self) -> f64 {
        f64::from(self.active_minutes)
    }

    fn view(&self) -> EntryView {
        EntryView {
            label: Some(self.activity_type.to_string()),
            steps: Some(self.steps),
            ..EntryView::common(self)
        }
    }
}

/// Request body for logging activity.
#[derive(Debug, Deserialize, Validate)]
pub struct NewActivity {
    #[validate(range(min = 1, max = 1440, message = "Minutes must be between 1 and 1440"))]
    pub active_minutes: u32,
    #[serde(default)]
    pub activity_type: ActivityType,
    pub steps: Option<u32>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl EntryDraft for NewActivity {
    type Entry = ActivityEntry;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn into_entry(self, id: String, timestamp: DateTime<Utc>) -> ActivityEntry {
        let steps = self
            .steps
            .unwrap_or_else(|| self.active_minutes.saturating_mul(ESTIMATED_STEPS_PER_MINUTE));
        ActivityEntry {
            id,
            steps,
            active_minutes: self.active_minutes,
            activity_type: self.activity_type,
            date: timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::Duration;

    #[test]
    fn test_build_estimates_steps() {
        let now = Utc::now();
        let draft = NewActivity {
            active_minutes: 30,
            activity_type: ActivityType::Running,
            steps: None,
            timestamp: None,
        };

        let entry = draft.build(now).unwrap();

        assert_eq!(entry.steps, 3000);
        assert_eq!(entry.date, now);
        assert_eq!(entry.quantity(), 30.0);
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_build_keeps_reported_steps_and_backdate() {
        let now = Utc::now();
        let earlier = now - Duration::hours(3);
        let draft = NewActivity {
            active_minutes: 10,
            activity_type: ActivityType::Walking,
            steps: Some(1234),
            timestamp: Some(earlier),
        };

        let entry = draft.build(now).unwrap();

        assert_eq!(entry.steps, 1234);
        assert_eq!(entry.date, earlier);
    }

    #[test]
    fn test_build_rejects_zero_minutes() {
        let draft = NewActivity {
            active_minutes: 0,
            activity_type: ActivityType::Other,
            steps: None,
            timestamp: None,
        };

        let err = draft.build(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_build_rejects_future_timestamp() {
        let now = Utc::now();
        let draft = NewActivity {
            active_minutes: 15,
            activity_type: ActivityType::Dancing,
            steps: None,
            timestamp: Some(now + Duration::minutes(5)),
        };

        let err = draft.build(now).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_unknown_activity_type_reads_as_other() {
        let parsed: ActivityType = serde_json::from_str("\"Skateboarding\"").unwrap();
        assert_eq!(parsed, ActivityType::Other);
    }

    #[test]
    fn test_view_includes_type_and_steps() {
        let entry = ActivityEntry {
            id: "a1".to_string(),
            steps: 500,
            active_minutes: 5,
            activity_type: ActivityType::Swimming,
            date: Utc::now(),
        };

        let view = entry.view();
        assert_eq!(view.label.as_deref(), Some("Swimming"));
        assert_eq!(view.steps, Some(500));
        assert_eq!(view.unit, "minutes");
        assert_eq!(view.metric, Metric::Activity);
    }
}
