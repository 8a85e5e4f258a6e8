// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Behaviour shared by every logged entry, whatever it measures.

use crate::error::AppError;
use crate::models::Metric;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single logged measurement stored as one Firestore document.
///
/// The business rules (bucketing, streaks, milestones) only look at
/// `timestamp()` and `quantity()`, so they are written once against this
/// trait instead of once per metric.
pub trait TrackedEntry: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const METRIC: Metric;
    /// Subcollection under `users/{user_id}`.
    const COLLECTION: &'static str;

    /// Request body that creates this entry.
    type Draft: EntryDraft<Entry = Self>;

    fn id(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
    /// Minutes, ounces or grams. Never negative once validated.
    fn quantity(&self) -> f64;

    fn view(&self) -> EntryView {
        EntryView::common(self)
    }
}

/// Client-supplied fields for a new entry.
pub trait EntryDraft: DeserializeOwned + Validate + Send + 'static {
    type Entry: TrackedEntry;

    /// Back-dated time chosen by the user, if any.
    fn timestamp(&self) -> Option<DateTime<Utc>>;

    fn into_entry(self, id: String, timestamp: DateTime<Utc>) -> Self::Entry;

    /// Validate the draft and turn it into an entry with a fresh id.
    ///
    /// Rejects out-of-range quantities and timestamps after `now`.
    fn build(self, now: DateTime<Utc>) -> Result<Self::Entry, AppError>
    where
        Self: Sized,
    {
        self.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let timestamp = self.timestamp().unwrap_or(now);
        if timestamp > now {
            return Err(AppError::BadRequest(
                "Entry time cannot be in the future".to_string(),
            ));
        }

        let entry = self.into_entry(uuid::Uuid::new_v4().to_string(), timestamp);
        if !entry.quantity().is_finite() {
            return Err(AppError::BadRequest("Quantity must be a number".to_string()));
        }

        Ok(entry)
    }
}

/// Entry as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EntryView {
    pub id: String,
    pub metric: Metric,
    pub timestamp: String,
    pub quantity: f64,
    pub unit: String,
    /// Activity type or meal name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl EntryView {
    /// Fields every metric has.
    pub fn common<E: TrackedEntry>(entry: &E) -> Self {
        Self {
            id: entry.id().to_string(),
            metric: E::METRIC,
            timestamp: format_utc_rfc3339(entry.timestamp()),
            quantity: entry.quantity(),
            unit: E::METRIC.unit().to_string(),
            label: None,
            steps: None,
            image_url: None,
        }
    }
}
