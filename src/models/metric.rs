// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Tracked metrics and their fixed daily goals.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Daily goal shared by every metric (60 minutes / 60 oz / 60 g).
pub const DAILY_GOAL: f64 = 60.0;
/// Interval between celebrated milestones.
pub const MILESTONE_INTERVAL: f64 = 20.0;

/// One of the three things a child logs during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Metric {
    Activity,
    Hydration,
    Protein,
}

/// Thresholds that drive streaks and milestone announcements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    /// A day qualifies for the streak when its total reaches this.
    pub daily_target: f64,
    /// Milestones fire at every multiple of this.
    pub milestone_interval: f64,
    /// The milestone that gets the "goal reached" message.
    pub special_threshold: f64,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Activity, Metric::Hydration, Metric::Protein];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Activity => "activity",
            Metric::Hydration => "hydration",
            Metric::Protein => "protein",
        }
    }

    pub fn goal(&self) -> Goal {
        Goal {
            daily_target: DAILY_GOAL,
            milestone_interval: MILESTONE_INTERVAL,
            special_threshold: DAILY_GOAL,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Activity => "minutes",
            Metric::Hydration => "oz",
            Metric::Protein => "g",
        }
    }

    /// Celebration text for a crossed milestone.
    pub fn milestone_message(&self, threshold: f64, is_special: bool) -> String {
        let amount = format_amount(threshold);
        match (self, is_special) {
            (Metric::Activity, true) => format!(
                "🎉 Amazing! You reached your goal of {} minutes of activity today!",
                amount
            ),
            (Metric::Activity, false) => {
                format!("Great job! You've been active for {} minutes today!", amount)
            }
            (Metric::Hydration, true) => format!(
                "💧 You did it! You drank {} oz of water and hit today's goal!",
                amount
            ),
            (Metric::Hydration, false) => {
                format!("Nice! You've had {} oz of water so far today!", amount)
            }
            (Metric::Protein, true) => format!(
                "💪 Goal reached! You've eaten {} g of protein today!",
                amount
            ),
            (Metric::Protein, false) => {
                format!("Keep it up! You're at {} g of protein today!", amount)
            }
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render whole amounts without a trailing ".0".
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
