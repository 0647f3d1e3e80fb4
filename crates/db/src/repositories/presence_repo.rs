//! Repository for the `user_presence` table.
//!
//! Presence writes are last-write-wins per user: the atomic
//! `INSERT ... ON CONFLICT (user_id) DO UPDATE` is the only write path, and
//! `last_seen_at` is always set server-side to `NOW()`. Concurrent
//! heartbeats from the same user (duplicate tabs) simply overwrite each
//! other; the last write observed by the store wins regardless of
//! client-side send order. This is not linearizable across machines, which
//! is acceptable because presence is advisory.

use confab_core::presence::PresenceStatus;
use confab_core::types::DbId;
use sqlx::PgPool;

use crate::models::presence::PresenceRecord;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, status, last_seen_at, current_meeting_id, \
                        created_at, updated_at";

/// Provides read/upsert operations for per-user presence records.
pub struct PresenceRepo;

impl PresenceRepo {
    /// Record a heartbeat: insert or update the user's presence row.
    ///
    /// Always stamps `last_seen_at = NOW()`. Idempotent with respect to
    /// repeated identical heartbeats.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        status: PresenceStatus,
        current_meeting_id: Option<DbId>,
    ) -> Result<PresenceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_presence (user_id, status, current_meeting_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) \
             DO UPDATE SET status = EXCLUDED.status, \
                           last_seen_at = NOW(), \
                           current_meeting_id = EXCLUDED.current_meeting_id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PresenceRecord>(&query)
            .bind(user_id)
            .bind(status.as_str())
            .bind(current_meeting_id)
            .fetch_one(pool)
            .await
    }

    /// Fetch a user's presence row, if one exists.
    pub async fn get(pool: &PgPool, user_id: DbId) -> Result<Option<PresenceRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_presence WHERE user_id = $1");
        sqlx::query_as::<_, PresenceRecord>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a user's presence row, lazily creating a default `online` one
    /// on first read. Idempotent: a second call never creates a duplicate
    /// row, and an existing row is returned untouched.
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<PresenceRecord, sqlx::Error> {
        if let Some(record) = Self::get(pool, user_id).await? {
            return Ok(record);
        }

        let query = format!(
            "INSERT INTO user_presence (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, PresenceRecord>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(record) => Ok(record),
            // Lost a race with a concurrent first read/heartbeat.
            None => {
                let query = format!("SELECT {COLUMNS} FROM user_presence WHERE user_id = $1");
                sqlx::query_as::<_, PresenceRecord>(&query)
                    .bind(user_id)
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Fetch presence rows for a set of users. Users with no row are simply
    /// absent from the result; callers fill them in as offline.
    pub async fn get_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<PresenceRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_presence WHERE user_id = ANY($1)");
        sqlx::query_as::<_, PresenceRecord>(&query)
            .bind(user_ids)
            .fetch_all(pool)
            .await
    }
}
