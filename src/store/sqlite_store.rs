//! SQLite record store
//!
//! One table per bucket key (`day_2024_01_05`, ...), each row keyed by player
//! id with the JSON-serialized record in `value` and the score mirrored into a
//! REAL column so best-score comparisons happen inside SQLite.

use super::backend::{RecordStore, StoreError, UpsertOutcome};
use crate::bucket::BucketKey;
use crate::record::ScoreRecord;
use crate::sqlite_pragma::apply_optimized_pragmas;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// SQLite implementation of RecordStore
///
/// All statements run on a single connection behind a mutex, so a conditional
/// upsert never interleaves with another write in this process. IMMEDIATE
/// transactions extend that to other processes sharing the file.
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    pub fn new(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Database(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(db_path)?;
        apply_optimized_pragmas(&conn, busy_timeout)?;

        log::info!("✅ SQLite record store initialized: {}", db_path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))
    }

    fn table_exists(conn: &Connection, bucket: &BucketKey) -> Result<bool, StoreError> {
        let mut stmt =
            conn.prepare_cached("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        Ok(stmt.exists([bucket.table_name()])?)
    }
}

fn quoted(bucket: &BucketKey) -> String {
    format!("\"{}\"", bucket.table_name())
}

fn decode(value: &str) -> Result<ScoreRecord, StoreError> {
    Ok(serde_json::from_str(value)?)
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn ensure_table(&self, bucket: &BucketKey) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id    TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    score REAL NOT NULL
                )",
                quoted(bucket)
            ),
            [],
        )?;
        Ok(())
    }

    async fn get(
        &self,
        bucket: &BucketKey,
        player_id: &str,
    ) -> Result<Option<ScoreRecord>, StoreError> {
        let conn = self.lock()?;
        if !Self::table_exists(&conn, bucket)? {
            return Ok(None);
        }

        let value: Option<String> = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE id = ?1", quoted(bucket)),
                [player_id],
                |row| row.get(0),
            )
            .optional()?;

        value.as_deref().map(decode).transpose()
    }

    async fn put(&self, bucket: &BucketKey, record: &ScoreRecord) -> Result<(), StoreError> {
        let value = serde_json::to_string(record)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, value, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    value = excluded.value,
                    score = excluded.score",
                quoted(bucket)
            ),
            params![record.id, value, record.score],
        )?;
        Ok(())
    }

    async fn upsert_max(
        &self,
        bucket: &BucketKey,
        record: &ScoreRecord,
    ) -> Result<UpsertOutcome, StoreError> {
        let value = serde_json::to_string(record)?;
        let table = quoted(bucket);

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<f64> = tx
            .query_row(
                &format!("SELECT score FROM {} WHERE id = ?1", table),
                [&record.id],
                |row| row.get(0),
            )
            .optional()?;

        let changed = tx.execute(
            &format!(
                "INSERT INTO {table} (id, value, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    value = excluded.value,
                    score = excluded.score
                 WHERE excluded.score > {table}.score"
            ),
            params![record.id, value, record.score],
        )?;

        tx.commit()?;

        Ok(match (existing, changed) {
            (None, _) => UpsertOutcome::Inserted,
            (Some(_), 0) => UpsertOutcome::Unchanged,
            (Some(_), _) => UpsertOutcome::Updated,
        })
    }

    async fn list_all(&self, bucket: &BucketKey) -> Result<Vec<ScoreRecord>, StoreError> {
        let conn = self.lock()?;
        if !Self::table_exists(&conn, bucket)? {
            log::debug!("📥 Bucket {} has no table yet, reading as empty", bucket);
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT value FROM {} ORDER BY rowid ASC",
            quoted(bucket)
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for value in rows {
            records.push(decode(&value?)?);
        }

        Ok(records)
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
