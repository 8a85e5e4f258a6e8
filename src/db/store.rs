// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Persistence seam between trackers and the document store.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{DailyProgress, TrackedEntry};
use chrono::NaiveDate;
use std::future::Future;

/// Remote storage for one user's entries of one metric.
///
/// Every operation reports failure; callers decide whether that matters.
/// Writes are keyed by entry id, so repeating one is harmless.
pub trait EntryStore<E: TrackedEntry>: Clone + Send + Sync + 'static {
    fn save(&self, entry: &E) -> impl Future<Output = Result<()>> + Send;

    fn delete(&self, entry_id: &str) -> impl Future<Output = Result<()>> + Send;

    fn fetch_all(&self) -> impl Future<Output = Result<Vec<E>>> + Send;

    fn save_progress(&self, progress: &DailyProgress) -> impl Future<Output = Result<()>> + Send;

    fn fetch_progress(
        &self,
        day: NaiveDate,
    ) -> impl Future<Output = Result<Option<DailyProgress>>> + Send;
}

/// Firestore-backed store bound to one user.
#[derive(Clone)]
pub struct UserStore {
    db: FirestoreDb,
    user_id: String,
}

impl UserStore {
    pub fn new(db: FirestoreDb, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }
}

impl<E: TrackedEntry> EntryStore<E> for UserStore {
    async fn save(&self, entry: &E) -> Result<()> {
        self.db.set_entry(&self.user_id, entry).await
    }

    async fn delete(&self, entry_id: &str) -> Result<()> {
        self.db.delete_entry::<E>(&self.user_id, entry_id).await
    }

    async fn fetch_all(&self) -> Result<Vec<E>> {
        self.db.list_entries(&self.user_id).await
    }

    async fn save_progress(&self, progress: &DailyProgress) -> Result<()> {
        self.db.set_daily_progress(&self.user_id, progress).await
    }

    async fn fetch_progress(&self, day: NaiveDate) -> Result<Option<DailyProgress>> {
        self.db
            .get_daily_progress(&self.user_id, E::METRIC, day)
            .await
    }
}
