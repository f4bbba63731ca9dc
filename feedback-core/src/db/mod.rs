//! SQLite persistence.
//!
//! A [`Database`] wraps a single connection shared behind a mutex. Row-level
//! helpers live next to each model (`Feedback::insert`, `Comment::find_in_feedback`,
//! ...) and take a plain `&Connection`, so they compose inside
//! [`Database::transaction`].

mod comments;
mod feedback;
mod requests;
mod schema;
mod users;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, TransactionBehavior};
use serde::de::DeserializeOwned;

pub use feedback::NewFeedback;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::configure(conn)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "feedback-tracker")
            .context("Could not determine data directory")?;
        Ok(dirs.data_dir().join("feedback.db"))
    }

    fn configure(conn: Connection) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        self.lock()
            .execute_batch(schema::SCHEMA)
            .context("Failed to apply schema")?;
        tracing::debug!("Database schema is up to date");
        Ok(())
    }

    /// Round-trip a trivial query; used by health checks.
    pub fn ping(&self) -> crate::Result<()> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    /// Run read-only work against the connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> crate::Result<T>,
    ) -> crate::Result<T> {
        let conn = self.lock();
        f(&*conn)
    }

    /// Run `f` inside an immediate transaction. The transaction commits only
    /// if `f` returns `Ok`; any error rolls every statement back.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> crate::Result<T>,
    ) -> crate::Result<T> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&*tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves no transaction open (it is
        // rolled back on drop), so the connection is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_time(idx, &raw)
}

pub(crate) fn optional_time_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| parse_time(idx, &raw)).transpose()
}

fn parse_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a text column through one of the models' `from_str` lookups.
pub(crate) fn enum_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl FnOnce(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value {raw:?}").into(),
        )
    })
}
