//! Record store trait for bucketed score tables
//!
//! Defines the interface the aggregation engine and leaderboard reader use to
//! reach durable bucket contents. Nothing above this layer holds rows across
//! calls.

use crate::bucket::BucketKey;
use crate::record::ScoreRecord;
use async_trait::async_trait;

#[derive(Debug)]
pub enum StoreError {
    Database(String),
    Serialization(serde_json::Error),
    Timeout(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                StoreError::Timeout(err.to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::Timeout(e) => write!(f, "Storage timeout: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result of a conditional best-score write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row for the player existed
    Inserted,
    /// Incoming score was strictly higher and replaced the row
    Updated,
    /// Stored score was higher or equal; row left as is
    Unchanged,
}

/// Durable per-bucket table of score records keyed by player id
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the bucket table if absent. "Already exists" is success.
    async fn ensure_table(&self, bucket: &BucketKey) -> Result<(), StoreError>;

    /// Point lookup of one player's record
    async fn get(
        &self,
        bucket: &BucketKey,
        player_id: &str,
    ) -> Result<Option<ScoreRecord>, StoreError>;

    /// Insert or overwrite the row keyed by `record.id`
    async fn put(&self, bucket: &BucketKey, record: &ScoreRecord) -> Result<(), StoreError>;

    /// Atomic monotonic-maximum write
    ///
    /// Inserts when the player has no row, overwrites only when
    /// `record.score` is strictly greater than the stored score. The whole
    /// (fetch, compare, write) sequence is serialized per store.
    async fn upsert_max(
        &self,
        bucket: &BucketKey,
        record: &ScoreRecord,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Every record in the bucket, in insertion order
    ///
    /// A bucket that was never created reads as empty.
    async fn list_all(&self, bucket: &BucketKey) -> Result<Vec<ScoreRecord>, StoreError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
