//! Database layer (Firestore).

pub mod firestore;
pub mod store;

pub use firestore::FirestoreDb;
pub use store::{EntryStore, UserStore};

/// Collection names as constants.
///
/// Entry collections are named by `TrackedEntry::COLLECTION` and live under
/// `users/{user_id}` next to `daily_progress`.
pub mod collections {
    pub const USERS: &str = "users";
    /// Per-day aggregates with the milestone watermark
    pub const DAILY_PROGRESS: &str = "daily_progress";
}
