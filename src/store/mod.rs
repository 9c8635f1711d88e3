//! Durable bucket storage
//!
//! ```text
//! AggregationEngine ─┐
//!                    ├─> dyn RecordStore ─> SqliteRecordStore ─> leaderboard.db
//! LeaderboardReader ─┘                        (one table per bucket key)
//! ```

pub mod backend;
pub mod sqlite_store;

pub use backend::{RecordStore, StoreError, UpsertOutcome};
pub use sqlite_store::SqliteRecordStore;
