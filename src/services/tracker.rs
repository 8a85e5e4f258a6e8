// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! In-memory manager for one metric of one user.
//!
//! The in-memory list is authoritative for the session. Every mutation also
//! spawns a write to the store; that write is never awaited by the caller,
//! never retried and never cancelled. A failed write is logged and
//! otherwise ignored.

use crate::db::EntryStore;
use crate::models::{DailyProgress, Milestone, ProgressSummary, TrackedEntry};
use crate::services::milestone;
use crate::services::progress::{
    daily_series, day_buckets, history, streak_from_buckets, total_on, ProgressError,
};
use crate::time_utils::local_day;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;

/// Result of logging one entry.
#[derive(Debug, Clone)]
pub struct LogOutcome<E> {
    pub entry: E,
    /// Total of the local day the entry landed on
    pub day_total: f64,
    pub streak: u32,
    /// Only produced for entries that land on today
    pub milestone: Option<Milestone>,
}

/// Entries of one metric plus today's milestone watermark.
pub struct Tracker<E, S> {
    entries: Vec<E>,
    /// Aggregate for the most recent day a log touched
    progress: Option<DailyProgress>,
    store: S,
    tz: Tz,
    pending: Vec<JoinHandle<()>>,
    /// Latest aggregate write; each one waits for the one before it
    progress_write: Option<JoinHandle<()>>,
}

impl<E, S> Tracker<E, S>
where
    E: TrackedEntry,
    S: EntryStore<E>,
{
    /// Empty tracker (nothing loaded from the store).
    pub fn new(store: S, tz: Tz) -> Self {
        Self {
            entries: Vec::new(),
            progress: None,
            store,
            tz,
            pending: Vec::new(),
            progress_write: None,
        }
    }

    /// Load a session from the store.
    ///
    /// A failed fetch starts the session empty; a missing or unreadable
    /// progress document starts today's watermark at zero.
    pub async fn load(store: S, tz: Tz, now: DateTime<Utc>) -> Self {
        let mut entries = match store.fetch_all().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    metric = %E::METRIC,
                    error = %e,
                    "Failed to fetch entries, starting with an empty list"
                );
                Vec::new()
            }
        };
        entries.sort_by_key(|e| e.timestamp());

        let today = local_day(now, &tz);
        let progress = match store.fetch_progress(today).await {
            Ok(progress) => progress,
            Err(e) => {
                tracing::warn!(
                    metric = %E::METRIC,
                    error = %e,
                    "Failed to fetch daily progress, watermark starts at zero"
                );
                None
            }
        };

        tracing::debug!(
            metric = %E::METRIC,
            count = entries.len(),
            watermark = ?progress.as_ref().map(|p| p.last_milestone),
            "Tracker loaded"
        );

        Self {
            entries,
            progress,
            store,
            tz,
            pending: Vec::new(),
            progress_write: None,
        }
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// Entries newest first.
    pub fn history(&self) -> Vec<&E> {
        history(&self.entries)
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        local_day(now, &self.tz)
    }

    pub fn total_on(&self, day: NaiveDate) -> f64 {
        total_on(&day_buckets(&self.entries, &self.tz), day)
    }

    pub fn streak(&self, now: DateTime<Utc>) -> Result<u32, ProgressError> {
        let buckets = day_buckets(&self.entries, &self.tz);
        streak_from_buckets(&buckets, E::METRIC.goal().daily_target, self.today(now))
    }

    /// Highest milestone already announced today.
    pub fn watermark(&self, now: DateTime<Utc>) -> f64 {
        let today = self.today(now);
        self.progress
            .as_ref()
            .filter(|p| p.date == today)
            .map(|p| p.last_milestone)
            .unwrap_or(0.0)
    }

    /// Append an entry and persist it.
    ///
    /// Entries for today also run milestone detection against today's
    /// watermark. Back-dated entries never announce a milestone.
    pub fn log(
        &mut self,
        entry: E,
        now: DateTime<Utc>,
    ) -> Result<LogOutcome<E>, ProgressError> {
        self.entries.push(entry.clone());
        self.spawn_save(entry.clone());

        let today = self.today(now);
        let day = local_day(entry.timestamp(), &self.tz);
        let buckets = day_buckets(&self.entries, &self.tz);
        let day_total = total_on(&buckets, day);
        let streak = streak_from_buckets(&buckets, E::METRIC.goal().daily_target, today)?;

        let milestone = if day == today {
            self.update_today(day_total, now)
        } else {
            None
        };

        tracing::debug!(
            metric = %E::METRIC,
            entry_id = entry.id(),
            day_total,
            streak,
            milestone = ?milestone.as_ref().map(|m| m.threshold),
            "Entry logged"
        );

        Ok(LogOutcome {
            entry,
            day_total,
            streak,
            milestone,
        })
    }

    /// Remove an entry by id. Returns `None` if no such entry exists.
    pub fn delete(&mut self, entry_id: &str, now: DateTime<Utc>) -> Option<E> {
        let index = self.entries.iter().position(|e| e.id() == entry_id)?;
        let removed = self.entries.remove(index);
        self.after_remove(&removed, now);
        Some(removed)
    }

    /// Remove the most recently logged entry.
    pub fn undo_last(&mut self, now: DateTime<Utc>) -> Option<E> {
        let removed = self.entries.pop()?;
        self.after_remove(&removed, now);
        Some(removed)
    }

    /// Ring, streak and chart data for the `days` days ending today.
    pub fn summary(
        &self,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<ProgressSummary, ProgressError> {
        let goal = E::METRIC.goal().daily_target;
        let today = self.today(now);
        let buckets = day_buckets(&self.entries, &self.tz);
        let today_total = total_on(&buckets, today);

        Ok(ProgressSummary {
            metric: E::METRIC,
            unit: E::METRIC.unit().to_string(),
            goal,
            today_total,
            progress: (today_total / goal).clamp(0.0, 1.0),
            streak: streak_from_buckets(&buckets, goal, today)?,
            last_milestone: self.watermark(now),
            days: daily_series(&self.entries, goal, today, days, &self.tz)?,
        })
    }

    /// Whether any write spawned by this tracker has not been awaited yet.
    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty() || self.progress_write.is_some()
    }

    /// Wait for every outstanding write. Used at shutdown and in tests.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(metric = %E::METRIC, error = %e, "Persistence task failed to run");
            }
        }
        if let Some(handle) = self.progress_write.take() {
            if let Err(e) = handle.await {
                tracing::warn!(metric = %E::METRIC, error = %e, "Progress write failed to run");
            }
        }
    }

    // ─── Internals ───────────────────────────────────────────────

    /// Record today's total, detect a milestone and persist the aggregate.
    fn update_today(&mut self, total: f64, now: DateTime<Utc>) -> Option<Milestone> {
        let today = self.today(now);
        if self.progress.as_ref().is_some_and(|p| p.date != today) {
            self.progress = None;
        }
        let progress = self
            .progress
            .get_or_insert_with(|| DailyProgress::new(E::METRIC, today, now));

        progress.record_total(total, now);
        let crossing = milestone::detect(total, progress.last_milestone, &E::METRIC.goal());
        if let Some(crossing) = &crossing {
            progress.raise_watermark(crossing.highest);
        }

        let snapshot = progress.clone();
        self.spawn_save_progress(snapshot);

        crossing.map(|c| c.announce(E::METRIC))
    }

    fn after_remove(&mut self, removed: &E, now: DateTime<Utc>) {
        self.spawn_delete(removed.id().to_string());

        let today = self.today(now);
        if local_day(removed.timestamp(), &self.tz) != today {
            return;
        }

        let total = self.total_on(today);
        if let Some(progress) = self.progress.as_mut().filter(|p| p.date == today) {
            // The watermark stays: a milestone is announced at most once a day.
            progress.record_total(total, now);
            let snapshot = progress.clone();
            self.spawn_save_progress(snapshot);
        }
    }

    fn spawn_save(&mut self, entry: E) {
        let store = self.store.clone();
        self.track(tokio::spawn(async move {
            if let Err(e) = store.save(&entry).await {
                tracing::warn!(
                    metric = %E::METRIC,
                    entry_id = entry.id(),
                    error = %e,
                    "Failed to persist entry"
                );
            }
        }));
    }

    fn spawn_delete(&mut self, entry_id: String) {
        let store = self.store.clone();
        self.track(tokio::spawn(async move {
            if let Err(e) = store.delete(&entry_id).await {
                tracing::warn!(
                    metric = %E::METRIC,
                    entry_id = %entry_id,
                    error = %e,
                    "Failed to delete entry from store"
                );
            }
        }));
    }

    /// Aggregate writes for a day share one document, so they land in order.
    fn spawn_save_progress(&mut self, progress: DailyProgress) {
        let store = self.store.clone();
        let previous = self.progress_write.take();
        self.progress_write = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    tracing::warn!(metric = %E::METRIC, error = %e, "Progress write failed to run");
                }
            }
            if let Err(e) = EntryStore::<E>::save_progress(&store, &progress).await {
                tracing::warn!(
                    metric = %E::METRIC,
                    date = %progress.date,
                    error = %e,
                    "Failed to persist daily progress"
                );
            }
        }));
    }

    fn track(&mut self, handle: JoinHandle<()>) {
        self.pending.retain(|h| !h.is_finished());
        self.pending.push(handle);
    }
}
