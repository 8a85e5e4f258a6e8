//! Per-day progress aggregates and derived progress views.
//!
//! `DailyProgress` is the only derived value that is persisted: it keeps the
//! milestone watermark next to the day's total so a restarted session does
//! not re-announce milestones the child already saw.

use crate::models::Metric;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Aggregate for one metric on one local day.
///
/// Stored at: `users/{user_id}/daily_progress/{metric}_{YYYY-MM-DD}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub metric: Metric,
    /// Local calendar day ("YYYY-MM-DD")
    pub date: NaiveDate,
    /// Sum of quantities logged for the day
    #[serde(default)]
    pub total: f64,
    /// Highest milestone already announced (watermark)
    #[serde(default)]
    pub last_milestone: f64,
    #[serde(default)]
    pub goal_met: bool,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl DailyProgress {
    pub fn new(metric: Metric, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            metric,
            date,
            total: 0.0,
            last_milestone: 0.0,
            goal_met: false,
            updated_at: now,
        }
    }

    pub fn document_id(&self) -> String {
        Self::document_id_for(self.metric, self.date)
    }

    pub fn document_id_for(metric: Metric, date: NaiveDate) -> String {
        format!("{}_{}", metric, date.format("%Y-%m-%d"))
    }

    /// Record a freshly computed total for the day.
    pub fn record_total(&mut self, total: f64, now: DateTime<Utc>) {
        self.total = total;
        self.goal_met = total >= self.metric.goal().daily_target;
        self.updated_at = now;
    }

    /// Raise the watermark. It never moves down within a day.
    pub fn raise_watermark(&mut self, threshold: f64) {
        if threshold > self.last_milestone {
            self.last_milestone = threshold;
        }
    }
}

/// A milestone announcement produced by logging an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Milestone {
    pub threshold: f64,
    /// True when the daily goal itself was reached
    pub is_special: bool,
    pub message: String,
}

/// One point of the chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyPoint {
    /// Local calendar day ("YYYY-MM-DD")
    pub date: String,
    pub total: f64,
    pub goal_met: bool,
}

/// Progress ring, streak and chart data for one metric.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressSummary {
    pub metric: Metric,
    pub unit: String,
    pub goal: f64,
    pub today_total: f64,
    /// `today_total / goal`, clamped to [0, 1] for the ring
    pub progress: f64,
    pub streak: u32,
    pub last_milestone: f64,
    /// Oldest day first
    pub days: Vec<DailyPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn test_document_id() {
        let progress = DailyProgress::new(Metric::Hydration, day(), Utc::now());
        assert_eq!(progress.document_id(), "hydration_2024-05-02");
    }

    #[test]
    fn test_watermark_never_decreases() {
        let mut progress = DailyProgress::new(Metric::Protein, day(), Utc::now());
        progress.raise_watermark(40.0);
        progress.raise_watermark(20.0);
        assert_eq!(progress.last_milestone, 40.0);
    }

    #[test]
    fn test_record_total_sets_goal_met() {
        let mut progress = DailyProgress::new(Metric::Activity, day(), Utc::now());
        progress.record_total(59.0, Utc::now());
        assert!(!progress.goal_met);
        progress.record_total(60.0, Utc::now());
        assert!(progress.goal_met);
    }
}
