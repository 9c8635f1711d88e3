//! Aggregation Engine - best-score fan-out into day / week / month buckets
//!
//! ```text
//! [ScoreSubmission] + now
//!     ↓
//! BucketKey::current(now)  →  day_YYYY_MM_DD, week_YYYY_MM_WW, month_YYYY_MM
//!     ↓
//! RecordStore::ensure_table (per bucket, best effort)
//!     ↓
//! RecordStore::upsert_max (per bucket × player)
//! ```
//!
//! Buckets are independent: a failure in one never stops attempts on the
//! other two. Failures are logged here and only counted in the summary.

use crate::bucket::BucketKey;
use crate::record::{ScoreRecord, ScoreSubmission};
use crate::store::{RecordStore, UpsertOutcome};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Per-batch counters, one unit per (bucket, record) write attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    /// Entries dropped for a missing player id or an unparsable shape
    pub skipped: usize,
}

impl SubmitSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

pub struct AggregationEngine {
    store: Arc<dyn RecordStore>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Apply raw JSON player entries
    ///
    /// Each entry is parsed on its own; malformed ones are skipped so the
    /// rest of the batch still lands.
    pub async fn submit_entries(&self, entries: &[Value], now: NaiveDateTime) -> SubmitSummary {
        let mut malformed = 0;
        let submissions: Vec<ScoreSubmission> = entries
            .iter()
            .filter_map(|entry| match ScoreSubmission::deserialize(entry) {
                Ok(submission) => Some(submission),
                Err(e) => {
                    log::warn!("⚠️  Skipping malformed submission {}: {}", entry, e);
                    malformed += 1;
                    None
                }
            })
            .collect();

        let mut summary = self.submit_batch(&submissions, now).await;
        summary.skipped += malformed;
        summary
    }

    /// Apply a batch against the three buckets derived from `now`
    pub async fn submit_batch(
        &self,
        submissions: &[ScoreSubmission],
        now: NaiveDateTime,
    ) -> SubmitSummary {
        let buckets = BucketKey::current(now.date());
        let mut summary = SubmitSummary::default();

        for bucket in &buckets {
            if let Err(e) = self.store.ensure_table(bucket).await {
                log::warn!("⚠️  Failed to create table {}: {}", bucket, e);
            }
        }

        let records: Vec<ScoreRecord> = submissions
            .iter()
            .filter_map(|submission| {
                let record = submission.to_record(now);
                if record.is_none() {
                    log::debug!("Skipping submission without player id: {:?}", submission);
                    summary.skipped += 1;
                }
                record
            })
            .collect();

        for bucket in &buckets {
            for record in &records {
                match self.store.upsert_max(bucket, record).await {
                    Ok(outcome) => {
                        if outcome != UpsertOutcome::Unchanged {
                            log::debug!(
                                "✅ {:?} record in {} for player {} (score {})",
                                outcome,
                                bucket,
                                record.id,
                                record.score
                            );
                        }
                        summary.record(outcome);
                    }
                    Err(e) => {
                        log::error!(
                            "❌ Failed to upsert player {} into {}: {}",
                            record.id,
                            bucket,
                            e
                        );
                        summary.failed += 1;
                    }
                }
            }
        }

        log::info!(
            "📥 Batch applied ({} via {}): {} inserted, {} updated, {} unchanged, {} failed, {} skipped",
            buckets[0],
            self.store.backend_type(),
            summary.inserted,
            summary.updated,
            summary.unchanged,
            summary.failed,
            summary.skipped
        );

        summary
    }
}
