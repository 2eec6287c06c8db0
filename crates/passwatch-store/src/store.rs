//! SQLite notification store.
//!
//! Timestamps are stored as RFC 3339 text and compared after parsing, so
//! equality does not depend on formatting details. The connection is owned
//! by a single writer; the daemon never opens the database twice.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use passwatch_core::error::{StoreError, StoreResult};
use passwatch_core::traits::NotificationStore;
use passwatch_core::types::NotificationEntry;

/// Notification store backed by a local SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and prepare the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            StoreError::open_with_source(
                format!("failed to open state database at {}", path.display()),
                e,
            )
        })?;

        let store = Self { conn };
        store.migrate()?;

        debug!(path = %path.display(), "notification store opened");
        Ok(store)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            StoreError::open_with_source("failed to open in-memory state database", e)
        })?;

        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS notifications (
                    user_id           TEXT PRIMARY KEY,
                    password_last_set TEXT,
                    last_notified     TEXT NOT NULL
                )",
            )
            .map_err(|e| StoreError::open_with_source("failed to prepare store schema", e))
    }

    /// Fetch the stored entry for an account.
    pub fn get(&self, user_id: &str) -> StoreResult<Option<NotificationEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT password_last_set, last_notified
                 FROM notifications WHERE user_id = ?1",
            )
            .map_err(|e| StoreError::io_with_source("failed to prepare lookup", e))?;

        let result = stmt.query_row(params![user_id], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, String>(1)?,
            ))
        });

        match result {
            Ok((password_last_set, last_notified)) => Ok(Some(NotificationEntry {
                user_id: user_id.to_string(),
                password_last_set: parse_optional(user_id, password_last_set)?,
                last_notified: parse_required(user_id, &last_notified)?,
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::io_with_source(
                format!("failed to look up notification for {user_id}"),
                e,
            )),
        }
    }
}

impl NotificationStore for SqliteStore {
    fn has_been_notified(
        &self,
        user_id: &str,
        current_password_last_set: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        match self.get(user_id)? {
            Some(entry) => Ok(entry.password_last_set == current_password_last_set),
            None => Ok(false),
        }
    }

    fn record_notification(
        &mut self,
        user_id: &str,
        password_last_set: Option<DateTime<Utc>>,
        sent_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO notifications (user_id, password_last_set, last_notified)
                 VALUES (?1, ?2, ?3)",
                params![
                    user_id,
                    password_last_set.map(|ts| ts.to_rfc3339()),
                    sent_at.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                StoreError::io_with_source(
                    format!("failed to record notification for {user_id}"),
                    e,
                )
            })?;
        Ok(())
    }

    fn prune(&mut self, active_user_ids: &HashSet<String>) -> StoreResult<usize> {
        let stale: Vec<String> = {
            let mut stmt = self
                .conn
                .prepare("SELECT user_id FROM notifications")
                .map_err(|e| StoreError::io_with_source("failed to prepare prune scan", e))?;

            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| StoreError::io_with_source("failed to scan stored accounts", e))?;

            let mut stale = Vec::new();
            for row in rows {
                let user_id =
                    row.map_err(|e| StoreError::io_with_source("failed to read stored row", e))?;
                if !active_user_ids.contains(&user_id) {
                    stale.push(user_id);
                }
            }
            stale
        };

        let mut removed = 0;
        for user_id in &stale {
            removed += self
                .conn
                .execute(
                    "DELETE FROM notifications WHERE user_id = ?1",
                    params![user_id],
                )
                .map_err(|e| {
                    StoreError::io_with_source(format!("failed to prune entry for {user_id}"), e)
                })?;
        }

        if removed > 0 {
            debug!(removed, "pruned entries for accounts no longer in scope");
        }

        Ok(removed)
    }
}

fn parse_required(user_id: &str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            StoreError::corrupt(format!("unparseable timestamp for user {user_id}: {raw}"))
        })
}

fn parse_optional(user_id: &str, raw: Option<String>) -> StoreResult<Option<DateTime<Utc>>> {
    match raw {
        Some(raw) => parse_required(user_id, &raw).map(Some),
        None => Ok(None),
    }
}
