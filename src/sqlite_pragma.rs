//! Shared SQLite connection tuning

use rusqlite::Connection;
use std::time::Duration;

/// Apply the PRAGMAs every leaderboard connection runs with
///
/// - WAL journal so readers do not block the writer
/// - NORMAL sync, in-memory temp store, 64MB mmap, ~8MB page cache
/// - autocheckpoint every 1000 pages
/// - busy timeout, after which a locked database surfaces as an error
pub fn apply_optimized_pragmas(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;

    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    log::debug!("📊 SQLite journal_mode = {}", mode);

    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "mmap_size", 67_108_864i64)?;
    conn.pragma_update(None, "cache_size", -8_000i64)?;
    conn.pragma_update(None, "wal_autocheckpoint", 1_000i64)?;

    Ok(())
}
