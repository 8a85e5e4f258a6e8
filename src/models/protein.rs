// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Protein (meal) log model.

use crate::models::entry::{EntryDraft, EntryView, TrackedEntry};
use crate::models::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Stored meal record in Firestore (`users/{uid}/meals/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinEntry {
    /// Document ID
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// Meal name (e.g. "Chicken sandwich")
    pub name: String,
    pub protein_grams: f64,
    /// Photo of the meal, if one was uploaded
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl TrackedEntry for ProteinEntry {
    const METRIC: Metric = Metric::Protein;
    const COLLECTION: &'static str = "meals";

    type Draft = NewMeal;

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn quantity(&self) -> f64 {
        self.protein_grams
    }

    fn view(&self) -> EntryView {
        EntryView {
            label: Some(self.name.clone()),
            image_url: self.image_url.clone(),
            ..EntryView::common(self)
        }
    }
}

/// Request body for logging a meal.
#[derive(Debug, Deserialize, Validate)]
pub struct NewMeal {
    #[validate(
        length(min = 1, max = 100, message = "Meal name must be 1-100 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(range(
        exclusive_min = 0.0,
        max = 500.0,
        message = "Protein must be greater than 0 and at most 500 grams"
    ))]
    pub grams: f64,
    #[validate(url(message = "Image URL is not a valid URL"))]
    pub image_url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

fn not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Meal name cannot be blank".into()));
    }
    Ok(())
}

impl EntryDraft for NewMeal {
    type Entry = ProteinEntry;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn into_entry(self, id: String, timestamp: DateTime<Utc>) -> ProteinEntry {
        ProteinEntry {
            id,
            name: self.name.trim().to_string(),
            protein_grams: self.grams,
            image_url: self.image_url,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn draft(name: &str, grams: f64) -> NewMeal {
        NewMeal {
            name: name.to_string(),
            grams,
            image_url: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_build_meal_trims_name() {
        let entry = draft("  Eggs ", 12.0).build(Utc::now()).unwrap();
        assert_eq!(entry.name, "Eggs");
        assert_eq!(entry.quantity(), 12.0);
    }

    #[test]
    fn test_build_rejects_empty_name() {
        let err = draft("", 10.0).build(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_build_rejects_blank_name() {
        let err = draft("   ", 10.0).build(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_build_rejects_zero_grams() {
        let err = draft("Tofu", 0.0).build(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_build_rejects_bad_image_url() {
        let mut meal = draft("Beans", 9.0);
        meal.image_url = Some("not a url".to_string());
        let err = meal.build(Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_view_carries_name_and_image() {
        let entry = ProteinEntry {
            id: "p1".to_string(),
            name: "Yogurt".to_string(),
            protein_grams: 15.0,
            image_url: Some("https://example.com/yogurt.jpg".to_string()),
            timestamp: Utc::now(),
        };

        let view = entry.view();
        assert_eq!(view.label.as_deref(), Some("Yogurt"));
        assert_eq!(
            view.image_url.as_deref(),
            Some("https://example.com/yogurt.jpg")
        );
        assert_eq!(view.unit, "g");
    }
}
