//! Note, collaborator, and action item models and DTOs.

use confab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub owner_id: DbId,
    pub meeting_id: Option<DbId>,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `note_collaborators` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NoteCollaborator {
    pub id: DbId,
    pub note_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// A row from the `action_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActionItem {
    pub id: DbId,
    pub note_id: DbId,
    pub content: String,
    pub assignee_id: Option<DbId>,
    pub is_done: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a note.
#[derive(Debug, Deserialize)]
pub struct CreateNote {
    pub title: String,
    pub meeting_id: Option<DbId>,
}

/// DTO for sharing a note with another user.
#[derive(Debug, Deserialize)]
pub struct ShareNote {
    pub user_id: DbId,
}

/// DTO for creating an action item on a note.
#[derive(Debug, Deserialize)]
pub struct CreateActionItem {
    pub content: String,
    pub assignee_id: Option<DbId>,
}

/// DTO for updating an action item. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateActionItem {
    pub content: Option<String>,
    pub assignee_id: Option<DbId>,
    pub is_done: Option<bool>,
}
