//! Repository for the `friendships` table.
//!
//! The unordered-pair invariant (at most one row per `{a, b}`) is enforced
//! by the `uq_friendships_pair` index on LEAST/GREATEST of the two ids;
//! `find_between` lets handlers reject duplicates with a friendlier message
//! before hitting the constraint.

use confab_core::friendship::FriendshipStatus;
use confab_core::types::DbId;
use sqlx::PgPool;

use crate::models::friendship::Friendship;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, requester_id, addressee_id, status, created_at, updated_at";

/// Provides CRUD operations for friendships.
pub struct FriendshipRepo;

impl FriendshipRepo {
    /// Insert a new pending friend request.
    pub async fn create(
        pool: &PgPool,
        requester_id: DbId,
        addressee_id: DbId,
    ) -> Result<Friendship, sqlx::Error> {
        let query = format!(
            "INSERT INTO friendships (requester_id, addressee_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(requester_id)
            .bind(addressee_id)
            .fetch_one(pool)
            .await
    }

    /// Find a friendship row by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Friendship>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM friendships WHERE id = $1");
        sqlx::query_as::<_, Friendship>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the relationship between two users, in either direction.
    pub async fn find_between(
        pool: &PgPool,
        a: DbId,
        b: DbId,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM friendships \
             WHERE (requester_id = $1 AND addressee_id = $2) \
                OR (requester_id = $2 AND addressee_id = $1)"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(a)
            .bind(b)
            .fetch_optional(pool)
            .await
    }

    /// Transition a pending request to accepted or declined.
    ///
    /// The caller is responsible for verifying that the acting user is the
    /// addressee; this method only guards against double responses by
    /// requiring the current status to be `pending`.
    pub async fn respond(
        pool: &PgPool,
        id: DbId,
        status: FriendshipStatus,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        let query = format!(
            "UPDATE friendships SET status = $2 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a friendship row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the ids of a user's accepted friends (either direction),
    /// most recently accepted first.
    pub async fn accepted_friend_ids(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT CASE WHEN requester_id = $1 THEN addressee_id ELSE requester_id END \
             FROM friendships \
             WHERE (requester_id = $1 OR addressee_id = $1) AND status = 'accepted' \
             ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// List the pending requests addressed to a user, newest first.
    pub async fn pending_for_addressee(
        pool: &PgPool,
        addressee_id: DbId,
    ) -> Result<Vec<Friendship>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM friendships \
             WHERE addressee_id = $1 AND status = 'pending' \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(addressee_id)
            .fetch_all(pool)
            .await
    }
}
