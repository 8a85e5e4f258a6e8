// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! API routes for authenticated users.
//!
//! Every metric gets the same five routes under `/api/{metric}`; the
//! handlers are generic over the entry type.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    ActivityEntry, EntryDraft, EntryView, HydrationEntry, Milestone, ProgressSummary,
    ProteinEntry, TrackedEntry,
};
use crate::services::Tracked;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_SUMMARY_DAYS: u32 = 7;
const MAX_SUMMARY_DAYS: u32 = 31;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api/activity", metric_routes::<ActivityEntry>())
        .nest("/api/hydration", metric_routes::<HydrationEntry>())
        .nest("/api/protein", metric_routes::<ProteinEntry>())
        .route("/api/account", delete(delete_account))
}

fn metric_routes<E: Tracked>() -> Router<Arc<AppState>> {
    Router::new()
        .route("/entries", get(list_entries::<E>).post(log_entry::<E>))
        .route("/entries/undo", post(undo_last::<E>))
        .route("/entries/{id}", delete(delete_entry::<E>))
        .route("/summary", get(get_summary::<E>))
}

// ─── Entries ─────────────────────────────────────────────────

/// Response for a newly logged entry.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogResponse {
    pub entry: EntryView,
    /// Total of the local day the entry landed on
    pub day_total: f64,
    pub streak: u32,
    pub milestone: Option<Milestone>,
}

/// History, newest first.
async fn list_entries<E: Tracked>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<EntryView>>> {
    let session = state.trackers.session(&user.user_id).await;
    let mut trackers = session.lock().await;
    let entries = E::tracker(&mut trackers)
        .history()
        .into_iter()
        .map(|entry| entry.view())
        .collect();

    Ok(Json(entries))
}

async fn log_entry<E: Tracked>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(draft), _): WithRejection<Json<E::Draft>, AppError>,
) -> Result<Json<LogResponse>> {
    let now = Utc::now();
    let entry = draft.build(now)?;

    let session = state.trackers.session(&user.user_id).await;
    let mut trackers = session.lock().await;
    let outcome = E::tracker(&mut trackers).log(entry, now)?;

    if let Some(milestone) = &outcome.milestone {
        tracing::info!(
            user_id = %user.user_id,
            metric = %E::METRIC,
            threshold = milestone.threshold,
            is_special = milestone.is_special,
            "Milestone reached"
        );
    }

    Ok(Json(LogResponse {
        entry: outcome.entry.view(),
        day_total: outcome.day_total,
        streak: outcome.streak,
        milestone: outcome.milestone,
    }))
}

async fn delete_entry<E: Tracked>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(entry_id): Path<String>,
) -> Result<Json<EntryView>> {
    let session = state.trackers.session(&user.user_id).await;
    let mut trackers = session.lock().await;
    let removed = E::tracker(&mut trackers)
        .delete(&entry_id, Utc::now())
        .ok_or_else(|| {
            AppError::NotFound(format!("{} entry {} not found", E::METRIC, entry_id))
        })?;

    Ok(Json(removed.view()))
}

/// Remove the most recently logged entry.
async fn undo_last<E: Tracked>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<EntryView>> {
    let session = state.trackers.session(&user.user_id).await;
    let mut trackers = session.lock().await;
    let removed = E::tracker(&mut trackers)
        .undo_last(Utc::now())
        .ok_or_else(|| AppError::NotFound(format!("No {} entry to undo", E::METRIC)))?;

    Ok(Json(removed.view()))
}

// ─── Summary ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct SummaryQuery {
    /// Number of days in the chart series, ending today
    days: Option<u32>,
}

fn summary_days(requested: Option<u32>) -> Result<u32> {
    let days = requested.unwrap_or(DEFAULT_SUMMARY_DAYS);
    if !(1..=MAX_SUMMARY_DAYS).contains(&days) {
        return Err(AppError::BadRequest(format!(
            "'days' must be between 1 and {MAX_SUMMARY_DAYS}"
        )));
    }
    Ok(days)
}

async fn get_summary<E: Tracked>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(params), _): WithRejection<Query<SummaryQuery>, AppError>,
) -> Result<Json<ProgressSummary>> {
    let days = summary_days(params.days)?;

    let session = state.trackers.session(&user.user_id).await;
    let mut trackers = session.lock().await;
    let summary = E::tracker(&mut trackers).summary(Utc::now(), days)?;

    Ok(Json(summary))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub deleted: usize,
}

/// Delete every stored document of the user.
///
/// The session is evicted and flushed first so that no in-flight write
/// recreates a document after the purge.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(user_id = %user.user_id, "User-initiated account deletion");

    if let Some(session) = state.trackers.evict(&user.user_id) {
        session.lock().await.flush().await;
    }

    let deleted = state.db.delete_user_data(&user.user_id).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_days_default() {
        assert_eq!(summary_days(None).unwrap(), DEFAULT_SUMMARY_DAYS);
    }

    #[test]
    fn test_summary_days_bounds() {
        assert_eq!(summary_days(Some(1)).unwrap(), 1);
        assert_eq!(summary_days(Some(31)).unwrap(), 31);
        assert!(matches!(summary_days(Some(0)), Err(AppError::BadRequest(_))));
        assert!(matches!(summary_days(Some(32)), Err(AppError::BadRequest(_))));
    }
}
