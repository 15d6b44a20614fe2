//! SQLite-backed storage for availability markers and the user directory.
//!
//! The store owns all SQL. Callers hand it canonical `YYYY-MM-DD` strings,
//! which compare lexically in date order.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::models::{resolve_user_name, AvailabilityMarker, UnavailabilityEntry};

pub struct AvailabilityStore {
    pool: SqlitePool,
}

/// Month-query row before display-name resolution.
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: i64,
    user_id: String,
    date: String,
    is_available: Option<bool>,
    is_unavailable: Option<bool>,
    display_name: Option<String>,
    email: Option<String>,
}

impl From<EntryRow> for UnavailabilityEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            is_available: row.is_available,
            is_unavailable: row.is_unavailable,
            user_name: resolve_user_name(row.display_name, row.email),
        }
    }
}

impl AvailabilityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every effectively-unavailable marker with `date` in `[start, end]`,
    /// joined with its owner's directory row.
    pub async fn markers_in_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<UnavailabilityEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.user_id, a.date, a.is_available, a.is_unavailable,
                   u.display_name, u.email
            FROM availability a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.date >= ?1 AND a.date <= ?2
              AND (a.is_unavailable = 1 OR a.is_available = 0)
            ORDER BY a.date ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(start, end, count = rows.len(), "loaded unavailability markers");
        Ok(rows.into_iter().map(UnavailabilityEntry::from).collect())
    }

    /// The dates within `[start, end]` on which `user_id` is unavailable.
    pub async fn user_dates_in_range(
        &self,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<String>> {
        let dates: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT date FROM availability
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
              AND (is_unavailable = 1 OR is_available = 0)
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(dates)
    }

    /// Flip `user_id`'s marker for `date` and return the new unavailable
    /// state.
    ///
    /// The read and the write share one transaction; together with the
    /// unique (user_id, date) index this keeps concurrent toggles of the
    /// same key from double-inserting.
    pub async fn toggle(&self, user_id: &str, date: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<AvailabilityMarker> = sqlx::query_as(
            "SELECT id, user_id, date, is_available, is_unavailable, created_at
             FROM availability
             WHERE user_id = ?1 AND date = ?2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?;

        let unavailable = match existing {
            Some(marker) if marker.is_effectively_unavailable() => {
                sqlx::query("DELETE FROM availability WHERE id = ?1")
                    .bind(marker.id)
                    .execute(&mut *tx)
                    .await?;
                false
            }
            Some(marker) => {
                // Row that still reads as available under the legacy
                // representation: normalize it instead of deleting it.
                sqlx::query(
                    "UPDATE availability
                     SET is_unavailable = 1, is_available = NULL
                     WHERE id = ?1",
                )
                .bind(marker.id)
                .execute(&mut *tx)
                .await?;
                true
            }
            None => {
                sqlx::query(
                    "INSERT INTO availability (user_id, date, is_unavailable, created_at)
                     VALUES (?1, ?2, 1, ?3)",
                )
                .bind(user_id)
                .bind(date)
                .bind(Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await?;
                true
            }
        };

        tx.commit().await?;
        Ok(unavailable)
    }

    /// Insert or refresh a directory row for a confirmed user. A
    /// previously chosen non-empty display name wins over a refreshed one.
    pub async fn upsert_user(
        &self,
        id: &str,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                display_name = COALESCE(NULLIF(display_name, ''), excluded.display_name)
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(display_name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
