// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Firestore client wrapper with typed operations.
//!
//! All documents live under the owning user:
//! - `users/{user_id}/activities/{id}`
//! - `users/{user_id}/hydration/{id}`
//! - `users/{user_id}/meals/{id}`
//! - `users/{user_id}/daily_progress/{metric}_{YYYY-MM-DD}`

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    ActivityEntry, DailyProgress, HydrationEntry, Metric, ProteinEntry, TrackedEntry,
};
use chrono::NaiveDate;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Parent path `users/{user_id}` for per-user subcollections.
    fn user_parent(&self, user_id: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Entry Operations ────────────────────────────────────────

    /// Fetch every entry of one metric for a user.
    pub async fn list_entries<E: TrackedEntry>(
        &self,
        user_id: &str,
    ) -> Result<Vec<E>, AppError> {
        let parent = self.user_parent(user_id)?;

        self.get_client()?
            .fluent()
            .select()
            .from(E::COLLECTION)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite an entry, keyed by its id.
    pub async fn set_entry<E: TrackedEntry>(
        &self,
        user_id: &str,
        entry: &E,
    ) -> Result<(), AppError> {
        let parent = self.user_parent(user_id)?;

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(E::COLLECTION)
            .document_id(entry.id())
            .parent(&parent)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an entry by id. Deleting a missing document is not an error.
    pub async fn delete_entry<E: TrackedEntry>(
        &self,
        user_id: &str,
        entry_id: &str,
    ) -> Result<(), AppError> {
        let parent = self.user_parent(user_id)?;

        self.get_client()?
            .fluent()
            .delete()
            .from(E::COLLECTION)
            .document_id(entry_id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Daily Progress Operations ───────────────────────────────

    /// Get the per-day aggregate for one metric.
    pub async fn get_daily_progress(
        &self,
        user_id: &str,
        metric: Metric,
        date: NaiveDate,
    ) -> Result<Option<DailyProgress>, AppError> {
        let parent = self.user_parent(user_id)?;

        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_PROGRESS)
            .parent(&parent)
            .obj()
            .one(&DailyProgress::document_id_for(metric, date))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the per-day aggregate (total + milestone watermark).
    pub async fn set_daily_progress(
        &self,
        user_id: &str,
        progress: &DailyProgress,
    ) -> Result<(), AppError> {
        let parent = self.user_parent(user_id)?;

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::DAILY_PROGRESS)
            .document_id(progress.document_id())
            .parent(&parent)
            .object(progress)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete a user's documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        user_id: &str,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;
        let parent = self.user_parent(user_id)?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .parent(&parent)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    async fn delete_all_entries<E: TrackedEntry>(
        &self,
        user_id: &str,
    ) -> Result<usize, AppError> {
        let entries: Vec<E> = self.list_entries(user_id).await?;
        let count = entries.len();
        self.batch_delete(user_id, &entries, E::COLLECTION, |e: &E| e.id().to_string())
            .await?;
        tracing::debug!(user_id, count, collection = E::COLLECTION, "Deleted entries");
        Ok(count)
    }

    // ─── User Data Deletion ──────────────────────────────────────

    /// Delete ALL data for a user.
    ///
    /// Removes activities, hydration, meals and daily progress documents.
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let (activities, hydration, meals) = futures_util::try_join!(
            self.delete_all_entries::<ActivityEntry>(user_id),
            self.delete_all_entries::<HydrationEntry>(user_id),
            self.delete_all_entries::<ProteinEntry>(user_id),
        )?;

        let parent = self.user_parent(user_id)?;
        let progress: Vec<DailyProgress> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::DAILY_PROGRESS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.batch_delete(
            user_id,
            &progress,
            collections::DAILY_PROGRESS,
            DailyProgress::document_id,
        )
        .await?;

        let deleted_count = activities + hydration + meals + progress.len();
        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
