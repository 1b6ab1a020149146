//! Persistent storage for check-in state.
//!
//! Three independent named slots live in the `slots` table, each holding a
//! JSON value:
//!
//! - `venue.current`: the open [`VenueRecord`], if any
//! - `venue.visited`: the closed records, oldest first
//! - `reminder.last`: when the last check-in reminder was sent
//!
//! [`VenueRecordRepository`] and [`ReminderRepository`] are the seams the
//! lifecycle engine and the command surface depend on; [`SqliteStore`] is
//! the production implementation and [`crate::store::InMemoryStore`] the
//! deterministic double.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::venue::error::{CheckInError, CheckInResult};
use crate::venue::types::VenueRecord;

pub const CURRENT_VENUE_KEY: &str = "venue.current";
pub const VISITED_KEY: &str = "venue.visited";
pub const LAST_REMINDER_KEY: &str = "reminder.last";

/// Current-venue and visited-history slots.
///
/// `save_visit` is read-append-write; implementations that cannot make it
/// atomic rely on callers holding the lifecycle lock. `open_check_in` and
/// `check_out` are conditional on the current slot, and [`SqliteStore`]
/// makes each one atomic so separate processes sharing the database file
/// cannot interleave them.
#[async_trait]
pub trait VenueRecordRepository {
    async fn get_current_venue(&self) -> CheckInResult<Option<VenueRecord>>;

    /// Set or replace the current record.
    async fn save_current(&self, current: VenueRecord) -> CheckInResult<VenueRecord>;

    /// `None` when the history has never been written.
    async fn get_visited(&self) -> CheckInResult<Option<Vec<VenueRecord>>>;

    /// Append `visit` to the history and return it.
    async fn save_visit(&self, visit: VenueRecord) -> CheckInResult<VenueRecord>;

    async fn remove_current(&self) -> CheckInResult<()>;

    async fn remove_visited(&self) -> CheckInResult<()>;

    /// Store `record` as the current check-in unless one is already open.
    async fn open_check_in(&self, record: VenueRecord) -> CheckInResult<VenueRecord> {
        if let Some(open) = self.get_current_venue().await? {
            return Err(CheckInError::AlreadyCheckedIn { venue: open.name });
        }
        self.save_current(record).await
    }

    /// Move a closed record out of the current slot and into the history.
    ///
    /// Fails with `NoOpenCheckIn`, changing nothing, when the current slot
    /// no longer holds the check-in `closed` was made from. Remove happens
    /// before append. If the append fails the error is returned and the
    /// history may be missing this visit.
    async fn check_out(&self, closed: VenueRecord) -> CheckInResult<VenueRecord> {
        match self.get_current_venue().await? {
            Some(open) if open.is_same_check_in(&closed) => {}
            _ => return Err(CheckInError::NoOpenCheckIn),
        }
        self.remove_current().await?;
        self.save_visit(closed).await
    }
}

/// Last-reminder slot
#[async_trait]
pub trait ReminderRepository {
    async fn get_last_reminder(&self) -> CheckInResult<Option<DateTime<Utc>>>;

    async fn save_last_reminder(&self, at: DateTime<Utc>) -> CheckInResult<()>;

    async fn remove_last_reminder(&self) -> CheckInResult<()>;
}

/// SQLite-backed slot store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VenueRecordRepository for SqliteStore {
    async fn get_current_venue(&self) -> CheckInResult<Option<VenueRecord>> {
        let mut conn = self.pool.acquire().await?;
        read_slot(&mut conn, CURRENT_VENUE_KEY).await
    }

    async fn save_current(&self, current: VenueRecord) -> CheckInResult<VenueRecord> {
        let mut conn = self.pool.acquire().await?;
        write_slot(&mut conn, CURRENT_VENUE_KEY, &current).await?;
        Ok(current)
    }

    async fn get_visited(&self) -> CheckInResult<Option<Vec<VenueRecord>>> {
        let mut conn = self.pool.acquire().await?;
        read_slot(&mut conn, VISITED_KEY).await
    }

    async fn save_visit(&self, visit: VenueRecord) -> CheckInResult<VenueRecord> {
        let mut tx = self.pool.begin().await?;
        append_visit(&mut tx, &visit).await?;
        tx.commit().await?;
        Ok(visit)
    }

    async fn remove_current(&self) -> CheckInResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_slot(&mut conn, CURRENT_VENUE_KEY).await
    }

    async fn remove_visited(&self) -> CheckInResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_slot(&mut conn, VISITED_KEY).await
    }

    /// A single insert that only succeeds on an empty current slot.
    async fn open_check_in(&self, record: VenueRecord) -> CheckInResult<VenueRecord> {
        let mut conn = self.pool.acquire().await?;
        let raw = serde_json::to_string(&record)?;

        let inserted = sqlx::query(
            "INSERT INTO slots (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO NOTHING",
        )
        .bind(CURRENT_VENUE_KEY)
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if inserted == 0 {
            let open: Option<VenueRecord> = read_slot(&mut conn, CURRENT_VENUE_KEY).await?;
            return Err(CheckInError::AlreadyCheckedIn {
                venue: open.map(|o| o.name).unwrap_or_default(),
            });
        }
        Ok(record)
    }

    /// Single transaction: either both slots change or neither does.
    ///
    /// The delete is the first statement, so the transaction holds the write
    /// lock before it looks at what it removed. A mismatch rolls back.
    async fn check_out(&self, closed: VenueRecord) -> CheckInResult<VenueRecord> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM slots WHERE key = ? RETURNING value")
            .bind(CURRENT_VENUE_KEY)
            .fetch_optional(&mut *tx)
            .await?;
        let open: Option<VenueRecord> = match removed {
            Some(row) => Some(serde_json::from_str(&row.try_get::<String, _>("value")?)?),
            None => None,
        };

        match open {
            Some(open) if open.is_same_check_in(&closed) => {}
            _ => {
                tx.rollback().await?;
                return Err(CheckInError::NoOpenCheckIn);
            }
        }

        append_visit(&mut tx, &closed).await?;
        tx.commit().await?;
        Ok(closed)
    }
}

#[async_trait]
impl ReminderRepository for SqliteStore {
    async fn get_last_reminder(&self) -> CheckInResult<Option<DateTime<Utc>>> {
        let mut conn = self.pool.acquire().await?;
        read_slot(&mut conn, LAST_REMINDER_KEY).await
    }

    async fn save_last_reminder(&self, at: DateTime<Utc>) -> CheckInResult<()> {
        let mut conn = self.pool.acquire().await?;
        write_slot(&mut conn, LAST_REMINDER_KEY, &at).await
    }

    async fn remove_last_reminder(&self) -> CheckInResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_slot(&mut conn, LAST_REMINDER_KEY).await
    }
}

async fn read_slot<T: DeserializeOwned + Send>(
    conn: &mut SqliteConnection,
    key: &str,
) -> CheckInResult<Option<T>> {
    let row = sqlx::query("SELECT value FROM slots WHERE key = ?")
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => {
            let raw: String = row.try_get("value")?;
            Ok(Some(serde_json::from_str(&raw)?))
        }
        None => Ok(None),
    }
}

async fn write_slot<T: Serialize + Sync + ?Sized>(
    conn: &mut SqliteConnection,
    key: &str,
    value: &T,
) -> CheckInResult<()> {
    let raw = serde_json::to_string(value)?;
    let updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO slots (key, value, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(&raw)
    .bind(&updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn delete_slot(conn: &mut SqliteConnection, key: &str) -> CheckInResult<()> {
    sqlx::query("DELETE FROM slots WHERE key = ?")
        .bind(key)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn append_visit(conn: &mut SqliteConnection, visit: &VenueRecord) -> CheckInResult<()> {
    let mut visited: Vec<VenueRecord> = read_slot(conn, VISITED_KEY).await?.unwrap_or_default();
    visited.push(visit.clone());
    write_slot(conn, VISITED_KEY, &visited).await
}
