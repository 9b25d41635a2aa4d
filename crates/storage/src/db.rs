// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Database handle: schema, connections, and the shared write path.
//!
//! Connections are opened per operation against a single file, relying on
//! SQLite's single-writer discipline for cross-process safety. Writers
//! retry on busy/locked with bounded exponential backoff; readers never
//! retry; a failed read logs and surfaces as empty.

use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Bounded backoff for contended writes: five attempts starting at 100 ms,
/// doubling each time.
const WRITE_ATTEMPTS: u32 = 5;
const WRITE_BACKOFF: Duration = Duration::from_millis(100);

/// The five uniform buckets.
pub(crate) const TABLES: [&str; 5] = [
    "WorkflowStore",
    "JobStatusStore",
    "EventStore",
    "MetasheetStore",
    "LoggingStore",
];

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] lwf_core::CodecError),
}

/// Handle on the lwf database file.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (creating if needed) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self { path };
        db.create_schema()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        for table in TABLES {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} ( \
                 id INTEGER PRIMARY KEY, \
                 ts INTEGER, \
                 site TEXT, \
                 pillar TEXT, \
                 key TEXT, \
                 data TEXT)",
            ))?;
        }
        Ok(())
    }

    /// Open a connection with the `regexp()` scalar function registered.
    pub(crate) fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.create_scalar_function(
            "regexp",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let re = ctx.get_or_create_aux(0, |vr| -> Result<Regex, regex::Error> {
                    Regex::new(vr.as_str().unwrap_or(""))
                })?;
                let value = match ctx.get_raw(1).as_str_or_null()? {
                    Some(v) => v,
                    None => return Ok(false),
                };
                Ok(re.is_match(value))
            },
        )?;
        Ok(conn)
    }

    /// Shared insert path for all buckets, with bounded busy retry.
    ///
    /// An empty key defaults to the timestamp, so every row is addressable.
    pub(crate) async fn put(
        &self,
        table: &str,
        site: &str,
        pillar: &str,
        key: &str,
        data: &str,
    ) -> Result<(), StoreError> {
        let ts = now_ts();
        let ts_key;
        let key = if key.is_empty() {
            ts_key = ts.to_string();
            &ts_key
        } else {
            key
        };
        let sql =
            format!("INSERT INTO {table} (ts, site, pillar, key, data) VALUES (?1, ?2, ?3, ?4, ?5)");
        self.retrying(|conn| {
            conn.execute(&sql, rusqlite::params![ts, site, pillar, key, data])?;
            Ok(())
        })
        .await
    }

    /// Run a write closure, retrying on busy/locked with backoff. The wait
    /// yields the task, not the thread; emitters share their worker with
    /// the processor loop. No connection is held across a wait.
    pub(crate) async fn retrying<T>(
        &self,
        mut op: impl FnMut(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut delay = WRITE_BACKOFF;
        let mut attempt = 1;
        loop {
            let result = {
                let conn = self.connect()?;
                op(&conn)
            };
            match result {
                Ok(v) => return Ok(v),
                Err(e) if is_busy(&e) && attempt < WRITE_ATTEMPTS => {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run a read closure; errors are logged and mapped to the bucket's
    /// empty value by callers.
    pub(crate) fn reading<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.connect()?;
        op(&conn)
    }

    /// Log a swallowed write failure; the emit path must not fail callers.
    pub(crate) fn log_write_error(&self, what: &str, err: &StoreError) {
        error!(what, error = %err, "store write failed");
    }
}

/// Monotonic-enough row timestamp: epoch nanoseconds.
pub(crate) fn now_ts() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

fn is_busy(err: &StoreError) -> bool {
    match err {
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
            e.code,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
        ),
        _ => false,
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
