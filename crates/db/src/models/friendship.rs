//! Friendship (relationship) models and DTOs.

use confab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `friendships` table.
///
/// At most one row exists per unordered `{requester_id, addressee_id}`
/// pair (enforced by a unique index on the LEAST/GREATEST of the pair).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Friendship {
    pub id: DbId,
    pub requester_id: DbId,
    pub addressee_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for sending a friend request.
#[derive(Debug, Deserialize)]
pub struct CreateFriendRequest {
    pub addressee_id: DbId,
}

/// DTO for responding to a pending friend request or meeting invitation.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub accept: bool,
}
