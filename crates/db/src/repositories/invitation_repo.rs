//! Repository for the `meeting_invitations` table.

use confab_core::types::DbId;
use sqlx::PgPool;

use crate::models::meeting::MeetingInvitation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, meeting_id, user_id, status, responded_at, created_at, updated_at";

/// Provides CRUD operations for meeting invitations.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Invite a user to a meeting. Re-inviting an already-invited user is a
    /// no-op (`None`), backed by the unique (meeting_id, user_id) index.
    pub async fn invite(
        pool: &PgPool,
        meeting_id: DbId,
        user_id: DbId,
    ) -> Result<Option<MeetingInvitation>, sqlx::Error> {
        let query = format!(
            "INSERT INTO meeting_invitations (meeting_id, user_id) \
             VALUES ($1, $2) \
             ON CONFLICT (meeting_id, user_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MeetingInvitation>(&query)
            .bind(meeting_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an invitation by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MeetingInvitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM meeting_invitations WHERE id = $1");
        sqlx::query_as::<_, MeetingInvitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record the invitee's response. Only transitions rows still pending;
    /// the handler verifies the acting user is the invitee beforehand.
    pub async fn respond(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<MeetingInvitation>, sqlx::Error> {
        let query = format!(
            "UPDATE meeting_invitations SET status = $2, responded_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MeetingInvitation>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// List the user ids invited to a meeting (any response status).
    pub async fn invitee_ids(pool: &PgPool, meeting_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM meeting_invitations WHERE meeting_id = $1")
            .bind(meeting_id)
            .fetch_all(pool)
            .await
    }
}
