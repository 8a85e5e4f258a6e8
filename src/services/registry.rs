// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Per-user tracker sessions.
//!
//! The first request for a user loads all three trackers from Firestore.
//! Later requests reuse the in-memory session until it is evicted, either
//! explicitly or by the idle sweep.

use crate::db::{FirestoreDb, UserStore};
use crate::models::{ActivityEntry, HydrationEntry, ProteinEntry, TrackedEntry};
use crate::services::tracker::Tracker;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// The three trackers of one user.
pub struct UserTrackers {
    pub activity: Tracker<ActivityEntry, UserStore>,
    pub hydration: Tracker<HydrationEntry, UserStore>,
    pub protein: Tracker<ProteinEntry, UserStore>,
}

impl UserTrackers {
    /// Load all three trackers concurrently.
    pub async fn load(store: UserStore, tz: Tz, now: DateTime<Utc>) -> Self {
        let (activity, hydration, protein) = tokio::join!(
            Tracker::load(store.clone(), tz, now),
            Tracker::load(store.clone(), tz, now),
            Tracker::load(store, tz, now),
        );
        Self {
            activity,
            hydration,
            protein,
        }
    }

    pub fn has_pending_writes(&self) -> bool {
        self.activity.has_pending_writes()
            || self.hydration.has_pending_writes()
            || self.protein.has_pending_writes()
    }

    /// Wait for outstanding writes of every tracker.
    pub async fn flush(&mut self) {
        self.activity.flush().await;
        self.hydration.flush().await;
        self.protein.flush().await;
    }
}

/// Entry types that have a tracker in [`UserTrackers`].
pub trait Tracked: TrackedEntry {
    fn tracker(trackers: &mut UserTrackers) -> &mut Tracker<Self, UserStore>;
}

impl Tracked for ActivityEntry {
    fn tracker(trackers: &mut UserTrackers) -> &mut Tracker<Self, UserStore> {
        &mut trackers.activity
    }
}

impl Tracked for HydrationEntry {
    fn tracker(trackers: &mut UserTrackers) -> &mut Tracker<Self, UserStore> {
        &mut trackers.hydration
    }
}

impl Tracked for ProteinEntry {
    fn tracker(trackers: &mut UserTrackers) -> &mut Tracker<Self, UserStore> {
        &mut trackers.protein
    }
}

/// Shared session handle.
pub type Session = Arc<Mutex<UserTrackers>>;

struct SessionSlot {
    session: Session,
    last_access: Instant,
}

/// Sessions keyed by user id, shared across requests.
#[derive(Clone)]
pub struct TrackerRegistry {
    db: FirestoreDb,
    tz: Tz,
    sessions: Arc<DashMap<String, SessionSlot>>,
}

impl TrackerRegistry {
    pub fn new(db: FirestoreDb, tz: Tz) -> Self {
        Self {
            db,
            tz,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Get the user's session, loading it on first access.
    pub async fn session(&self, user_id: &str) -> Session {
        if let Some(mut slot) = self.sessions.get_mut(user_id) {
            slot.last_access = Instant::now();
            return slot.session.clone();
        }

        tracing::debug!(user_id, "Loading tracker session");
        let store = UserStore::new(self.db.clone(), user_id);
        let trackers = UserTrackers::load(store, self.tz, Utc::now()).await;

        // Another request may have loaded the same user meanwhile; keep the first.
        self.sessions
            .entry(user_id.to_string())
            .or_insert_with(|| SessionSlot {
                session: Arc::new(Mutex::new(trackers)),
                last_access: Instant::now(),
            })
            .session
            .clone()
    }

    /// Drop the user's session and hand it back so callers can flush it.
    /// Outstanding writes still complete.
    pub fn evict(&self, user_id: &str) -> Option<Session> {
        self.sessions.remove(user_id).map(|(_, slot)| slot.session)
    }

    /// Flush and drop sessions not used for `max_idle` as of `now`.
    /// Returns how many were dropped.
    ///
    /// A session touched again while it was being flushed stays.
    pub async fn evict_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let is_idle =
            |slot: &SessionSlot| now.saturating_duration_since(slot.last_access) >= max_idle;

        let idle: Vec<(String, Session)> = self
            .sessions
            .iter()
            .filter(|entry| is_idle(entry.value()))
            .map(|entry| (entry.key().clone(), entry.value().session.clone()))
            .collect();

        let mut evicted = 0;
        for (user_id, session) in idle {
            session.lock().await.flush().await;
            if self
                .sessions
                .remove_if(&user_id, |_, slot| is_idle(slot))
                .is_some()
            {
                evicted += 1;
            }
        }

        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Run [`evict_idle`](Self::evict_idle) every `period` until the task is aborted.
    pub fn spawn_idle_sweep(&self, period: Duration, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                let now = interval.tick().await;
                registry.evict_idle(now, max_idle).await;
            }
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Wait for outstanding writes in every session (graceful shutdown).
    pub async fn flush_all(&self) {
        let sessions: Vec<Session> = self
            .sessions
            .iter()
            .map(|s| s.value().session.clone())
            .collect();
        for session in sessions {
            session.lock().await.flush().await;
        }
    }
}
