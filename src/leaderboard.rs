//! Leaderboard reader - ranked views over bucket tables
//!
//! Rankings are recomputed from storage on every call; nothing is cached.

use crate::bucket::{BucketKey, Period};
use crate::record::{rank, ScoreRecord};
use crate::store::{RecordStore, StoreError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug)]
pub enum LeaderboardError {
    InvalidPeriod(String),
    InvalidDate(String),
    Storage(StoreError),
}

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        LeaderboardError::Storage(err)
    }
}

impl std::fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderboardError::InvalidPeriod(p) => write!(
                f,
                "Invalid period '{}'. Use \"day\", \"week\" or \"month\".",
                p
            ),
            LeaderboardError::InvalidDate(d) => write!(f, "Invalid date: {}", d),
            LeaderboardError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for LeaderboardError {}

/// The three boards a submission made now would land in
#[derive(Debug, Clone, Default, Serialize)]
pub struct CurrentLeaderboards {
    pub day: Vec<ScoreRecord>,
    pub week: Vec<ScoreRecord>,
    pub month: Vec<ScoreRecord>,
}

/// Parse a reference date from a path segment
///
/// Accepts `2024-01-05`, `2024-01-05T10:30:00` and RFC 3339. For RFC 3339 the
/// calendar date is taken in the string's own offset.
pub fn parse_reference_date(s: &str) -> Result<NaiveDate, LeaderboardError> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.date());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| LeaderboardError::InvalidDate(s.to_string()))
}

pub struct LeaderboardReader {
    store: Arc<dyn RecordStore>,
}

impl LeaderboardReader {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All records of one bucket, best score first
    pub async fn read(&self, bucket: &BucketKey) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        let mut records = self.store.list_all(bucket).await?;
        rank(&mut records);
        Ok(records)
    }

    /// Ranked board for `period` on `date`, or on `now` when no date is given
    pub async fn read_current(
        &self,
        period: &str,
        date: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        let period = Period::from_str(period)
            .ok_or_else(|| LeaderboardError::InvalidPeriod(period.to_string()))?;

        let date = match date {
            Some(s) => parse_reference_date(s)?,
            None => now.date(),
        };

        self.read(&period.bucket_for(date)).await
    }

    /// Day, week and month boards for `now`
    ///
    /// A failing sub-read degrades to an empty board.
    pub async fn read_all_current(&self, now: NaiveDateTime) -> CurrentLeaderboards {
        let [day, week, month] = BucketKey::current(now.date());

        CurrentLeaderboards {
            day: self.read_or_empty(&day).await,
            week: self.read_or_empty(&week).await,
            month: self.read_or_empty(&month).await,
        }
    }

    async fn read_or_empty(&self, bucket: &BucketKey) -> Vec<ScoreRecord> {
        match self.read(bucket).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!("⚠️  Reading {} failed, serving empty board: {}", bucket, e);
                Vec::new()
            }
        }
    }
}
