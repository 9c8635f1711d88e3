//! Score submission and ranking service
//!
//! ```text
//! POST /take ─> AggregationEngine ─┐
//!                                  ├─> RecordStore (one table per bucket)
//! GET /leaderboard ─> LeaderboardReader ─┘
//! ```
//!
//! Every submission lands in three calendar buckets (day, week-of-month,
//! month) derived from the submission time; each bucket keeps only the best
//! score per player.

pub mod aggregation;
pub mod api;
pub mod bucket;
pub mod config;
pub mod leaderboard;
pub mod record;
pub mod sqlite_pragma;
pub mod state;
pub mod store;

pub use aggregation::{AggregationEngine, SubmitSummary};
pub use bucket::{BucketKey, Period};
pub use leaderboard::{CurrentLeaderboards, LeaderboardError, LeaderboardReader};
pub use record::{ScoreRecord, ScoreSubmission};
pub use store::{RecordStore, SqliteRecordStore, StoreError, UpsertOutcome};
