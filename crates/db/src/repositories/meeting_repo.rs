//! Repository for the `meetings` table.

use confab_core::types::DbId;
use sqlx::PgPool;

use crate::models::meeting::Meeting;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, host_id, title, started_at, created_at, updated_at";

/// Provides CRUD operations for meetings.
pub struct MeetingRepo;

impl MeetingRepo {
    /// Insert a new meeting, returning the created row.
    pub async fn create(pool: &PgPool, host_id: DbId, title: &str) -> Result<Meeting, sqlx::Error> {
        let query = format!(
            "INSERT INTO meetings (host_id, title) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Meeting>(&query)
            .bind(host_id)
            .bind(title)
            .fetch_one(pool)
            .await
    }

    /// Find a meeting by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Meeting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM meetings WHERE id = $1");
        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a meeting as started. Returns the updated row, or `None` if the
    /// meeting does not exist or has already started (start is one-shot).
    pub async fn start(pool: &PgPool, id: DbId) -> Result<Option<Meeting>, sqlx::Error> {
        let query = format!(
            "UPDATE meetings SET started_at = NOW() \
             WHERE id = $1 AND started_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a user is the host of the meeting or one of its invitees.
    /// Used by resource-channel authorization.
    pub async fn is_participant(
        pool: &PgPool,
        meeting_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM meetings WHERE id = $1 AND host_id = $2 \
                 UNION ALL \
                 SELECT 1 FROM meeting_invitations WHERE meeting_id = $1 AND user_id = $2 \
             )",
        )
        .bind(meeting_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
