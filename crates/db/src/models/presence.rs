//! Presence models and DTOs.

use confab_core::presence::PresenceStatus;
use confab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_presence` table (one per user, upserted on every
/// heartbeat). `status` holds one of the four recognized values; callers
/// parse it through [`PresenceStatus`] and apply the staleness window
/// before display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PresenceRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub last_seen_at: Timestamp,
    pub current_meeting_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for the heartbeat and beacon endpoints.
#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub status: String,
    pub current_meeting_id: Option<DbId>,
}

/// Staleness-adjusted presence for a single user, as returned by batch
/// reads. Users with no stored record are reported as `offline` with no
/// `last_seen_at` rather than omitted, so callers can always render a
/// status.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceView {
    pub user_id: DbId,
    pub status: PresenceStatus,
    pub last_seen_at: Option<Timestamp>,
    pub current_meeting_id: Option<DbId>,
}

impl PresenceView {
    /// The view reported for a user with no presence record.
    pub fn absent(user_id: DbId) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Offline,
            last_seen_at: None,
            current_meeting_id: None,
        }
    }
}

/// One entry of the friends-with-presence listing. Profile or presence
/// lookup failure for an individual friend degrades that entry to
/// nulls/offline rather than failing the whole call.
#[derive(Debug, Clone, Serialize)]
pub struct FriendPresence {
    pub friend_id: DbId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: PresenceStatus,
    pub last_seen_at: Option<Timestamp>,
    pub current_meeting_id: Option<DbId>,
}
