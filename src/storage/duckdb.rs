use super::traits::{Storage, StorageError};
use crate::ingest::{Batch, Entry};
use async_trait::async_trait;
use chrono::DateTime;
use duckdb::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Whether a process with the given PID is still alive
fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        std::process::Command::new("ps")
            .arg("-p")
            .arg(pid.to_string())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}

/// DuckDB reports the lock holder as "... (PID 12345) ..."
fn lock_holder_pid(error_msg: &str) -> Option<u32> {
    let start = error_msg.find("(PID ")? + "(PID ".len();
    let len = error_msg[start..].find(')')?;
    error_msg[start..start + len].parse().ok()
}

fn remove_stale_lock_files(db_path: &Path) -> std::io::Result<()> {
    for suffix in ["wal", "lock"] {
        let stale = PathBuf::from(format!("{}.{}", db_path.display(), suffix));
        if stale.exists() {
            std::fs::remove_file(&stale)?;
            tracing::info!(path = %stale.display(), "Removed stale database file");
        }
    }
    Ok(())
}

/// Row layout shared by every batch query
const SELECT_BATCH: &str = "SELECT CAST(id AS VARCHAR), epoch_us(created), expected_schema, CAST(logs AS VARCHAR) FROM batches";

fn batch_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<(String, i64, bool, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_batch(
    (id, created_us, expected_schema, logs): (String, i64, bool, String),
) -> Result<Batch, StorageError> {
    let id = Uuid::parse_str(&id)
        .map_err(|e| StorageError::Database(format!("invalid batch id '{}': {}", id, e)))?;
    let created = DateTime::from_timestamp_micros(created_us).ok_or_else(|| {
        StorageError::Database(format!("invalid created timestamp for batch {}", id))
    })?;
    let entries: Vec<Entry> = serde_json::from_str(&logs)?;

    Ok(Batch {
        id,
        entries,
        created,
        expected_schema,
    })
}

/// DuckDB-backed batch store
pub struct DuckDbStorage {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbStorage {
    /// Open (or create) a database file, clearing locks left by a dead process
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();

        let err = match Connection::open(path) {
            Ok(conn) => return Ok(Self::from_connection(conn)),
            Err(e) => e,
        };

        let error_msg = err.to_string();
        if !error_msg.contains("Could not set lock") {
            return Err(err.into());
        }

        tracing::warn!(error = %error_msg, "Database lock detected");
        let Some(pid) = lock_holder_pid(&error_msg) else {
            return Err(err.into());
        };

        if is_process_running(pid) {
            tracing::error!(pid, "Database is locked by a running process");
            return Err(err.into());
        }

        tracing::warn!(pid, "Lock holder is gone, removing stale lock files");
        if let Err(io_err) = remove_stale_lock_files(path) {
            tracing::error!(error = %io_err, "Failed to remove stale lock files");
            return Err(err.into());
        }

        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// In-memory database, contents are lost on drop
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StorageError> {
    conn.lock()
        .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
}

fn join_error(e: tokio::task::JoinError) -> StorageError {
    StorageError::Database(format!("Task join error: {}", e))
}

#[async_trait]
impl Storage for DuckDbStorage {
    async fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;

            conn.execute(
                "CREATE TABLE IF NOT EXISTS batches (
                    id UUID PRIMARY KEY,
                    created TIMESTAMPTZ NOT NULL,
                    expected_schema BOOLEAN NOT NULL,
                    logs JSON NOT NULL
                )",
                [],
            )?;

            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_batches_created ON batches(created)",
                [],
            )?;

            Ok::<(), StorageError>(())
        })
        .await
        .map_err(join_error)?
    }

    async fn write_batch(&self, batch: &Batch) -> Result<(), StorageError> {
        let conn = self.conn.clone();
        let id = batch.id.to_string();
        let created_us = batch.created.timestamp_micros();
        let expected_schema = batch.expected_schema;
        let logs = serde_json::to_string(&batch.entries)?;

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            conn.execute(
                "INSERT INTO batches (id, created, expected_schema, logs)
                 VALUES (?, to_timestamp(? / 1000000.0), ?, ?)",
                duckdb::params![id, created_us, expected_schema, logs],
            )?;
            Ok::<(), StorageError>(())
        })
        .await
        .map_err(join_error)?
    }

    async fn get_batch(&self, id: Uuid) -> Result<Option<Batch>, StorageError> {
        let conn = self.conn.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            let mut stmt = conn.prepare(&format!("{SELECT_BATCH} WHERE id = ?"))?;
            let mut rows = stmt.query(duckdb::params![id])?;

            match rows.next()? {
                Some(row) => Ok(Some(decode_batch(batch_from_row(row)?)?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(join_error)?
    }

    async fn list_batches(&self, limit: usize, offset: usize) -> Result<Vec<Batch>, StorageError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            let mut stmt = conn.prepare(&format!(
                "{SELECT_BATCH} ORDER BY created DESC, id LIMIT ? OFFSET ?"
            ))?;
            let rows = stmt.query_map(
                duckdb::params![limit as i64, offset as i64],
                batch_from_row,
            )?;

            let mut batches = Vec::new();
            for row in rows {
                batches.push(decode_batch(row?)?);
            }
            Ok(batches)
        })
        .await
        .map_err(join_error)?
    }
}
