// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Milestone detection for a day's running total.

use crate::models::{Goal, Metric, Milestone};

/// Milestone crossed by moving a day's total past the last watermark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Threshold to announce: the special threshold if it was crossed,
    /// otherwise the highest crossed multiple.
    pub threshold: f64,
    pub is_special: bool,
    /// Highest multiple of the interval that was crossed. Callers store
    /// this as their new watermark.
    pub highest: f64,
}

impl Crossing {
    pub fn announce(&self, metric: Metric) -> Milestone {
        Milestone {
            threshold: self.threshold,
            is_special: self.is_special,
            message: metric.milestone_message(self.threshold, self.is_special),
        }
    }
}

/// Find the milestone crossed when the total moves from `last` to `total`.
///
/// Candidates are `interval * k` for `k = 1, 2, ...` up to and including
/// `total`; only those above `last` count. When several are crossed in one
/// update only one is reported: the special threshold wins, otherwise the
/// highest. Returns `None` when nothing lies in `(last, total]`.
pub fn detect(total: f64, last: f64, goal: &Goal) -> Option<Crossing> {
    let interval = goal.milestone_interval;
    if interval.is_nan() || interval <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut highest = None;
    let mut special = false;
    let mut k = 1.0;
    loop {
        let threshold = interval * k;
        if threshold > total {
            break;
        }
        if threshold > last {
            highest = Some(threshold);
            if threshold == goal.special_threshold {
                special = true;
            }
        }
        k += 1.0;
    }

    highest.map(|highest| Crossing {
        threshold: if special {
            goal.special_threshold
        } else {
            highest
        },
        is_special: special,
        highest,
    })
}
