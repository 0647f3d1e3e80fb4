//! Meeting, invitation, and transcript models and DTOs.

use confab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `meetings` table. `started_at` is null until the host
/// starts the meeting.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Meeting {
    pub id: DbId,
    pub host_id: DbId,
    pub title: String,
    pub started_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `meeting_invitations` table, unique per
/// (meeting, invitee).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MeetingInvitation {
    pub id: DbId,
    pub meeting_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `transcript_lines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TranscriptLine {
    pub id: DbId,
    pub meeting_id: DbId,
    pub speaker_id: DbId,
    pub content: String,
    pub spoken_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a meeting.
#[derive(Debug, Deserialize)]
pub struct CreateMeeting {
    pub title: String,
}

/// DTO for inviting users to a meeting.
#[derive(Debug, Deserialize)]
pub struct InviteUsers {
    pub user_ids: Vec<DbId>,
}

/// DTO for appending a transcript line.
#[derive(Debug, Deserialize)]
pub struct AppendTranscript {
    pub content: String,
    pub spoken_at: Option<Timestamp>,
}
