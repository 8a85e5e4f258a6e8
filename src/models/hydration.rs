// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Hydration log model.
//!
//! Older app versions wrote `{amountOz, lastHydrationDate}`. Those documents
//! are read through serde aliases and rewritten in the current schema the
//! next time the entry is saved.

use crate::models::entry::{EntryDraft, TrackedEntry};
use crate::models::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored hydration record in Firestore (`users/{uid}/hydration/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationEntry {
    /// Document ID
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    #[serde(alias = "amountOz")]
    pub hydration_ounces: f64,
    #[serde(alias = "lastHydrationDate", with = "firestore::serialize_as_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl TrackedEntry for HydrationEntry {
    const METRIC: Metric = Metric::Hydration;
    const COLLECTION: &'static str = "hydration";

    type Draft = NewHydration;

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn quantity(&self) -> f64 {
        self.hydration_ounces
    }
}

/// Request body for logging water.
#[derive(Debug, Deserialize, Validate)]
pub struct NewHydration {
    #[validate(range(
        exclusive_min = 0.0,
        max = 512.0,
        message = "Ounces must be greater than 0 and at most 512"
    ))]
    pub ounces: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl EntryDraft for NewHydration {
    type Entry = HydrationEntry;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn into_entry(self, id: String, timestamp: DateTime<Utc>) -> HydrationEntry {
        HydrationEntry {
            id,
            hydration_ounces: self.ounces,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_build_hydration() {
        let now = Utc::now();
        let entry = NewHydration {
            ounces: 8.5,
            timestamp: None,
        }
        .build(now)
        .unwrap();

        assert_eq!(entry.quantity(), 8.5);
        assert_eq!(entry.timestamp, now);
    }

    #[test]
    fn test_build_rejects_non_positive_ounces() {
        for ounces in [0.0, -4.0] {
            let err = NewHydration {
                ounces,
                timestamp: None,
            }
            .build(Utc::now())
            .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "ounces={}", ounces);
        }
    }

    #[test]
    fn test_build_rejects_nan() {
        let err = NewHydration {
            ounces: f64::NAN,
            timestamp: None,
        }
        .build(Utc::now())
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_view_has_no_label() {
        let entry = HydrationEntry {
            id: "h1".to_string(),
            hydration_ounces: 12.0,
            timestamp: Utc::now(),
        };

        let view = entry.view();
        assert_eq!(view.unit, "oz");
        assert!(view.label.is_none());
        assert!(view.steps.is_none());
    }
}
