//! Repository for the `notes` and `note_collaborators` tables.

use confab_core::types::DbId;
use sqlx::PgPool;

use crate::models::note::{Note, NoteCollaborator};

/// Column list for `notes` queries.
const NOTE_COLUMNS: &str = "id, owner_id, meeting_id, title, created_at, updated_at";

/// Column list for `note_collaborators` queries.
const COLLABORATOR_COLUMNS: &str = "id, note_id, user_id, created_at";

/// Provides CRUD operations for notes and their collaborator lists.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a new note, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        title: &str,
        meeting_id: Option<DbId>,
    ) -> Result<Note, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes (owner_id, title, meeting_id) \
             VALUES ($1, $2, $3) \
             RETURNING {NOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(owner_id)
            .bind(title)
            .bind(meeting_id)
            .fetch_one(pool)
            .await
    }

    /// Find a note by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Rename a note. Returns the updated row, or `None` if no note with
    /// the given `id` exists.
    pub async fn rename(pool: &PgPool, id: DbId, title: &str) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET title = $2 WHERE id = $1 RETURNING {NOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Add a collaborator. Re-sharing with an existing collaborator is a
    /// no-op (`None`), backed by the unique (note_id, user_id) index.
    pub async fn add_collaborator(
        pool: &PgPool,
        note_id: DbId,
        user_id: DbId,
    ) -> Result<Option<NoteCollaborator>, sqlx::Error> {
        let query = format!(
            "INSERT INTO note_collaborators (note_id, user_id) \
             VALUES ($1, $2) \
             ON CONFLICT (note_id, user_id) DO NOTHING \
             RETURNING {COLLABORATOR_COLUMNS}"
        );
        sqlx::query_as::<_, NoteCollaborator>(&query)
            .bind(note_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove a collaborator. Returns `true` if a row was removed.
    pub async fn remove_collaborator(
        pool: &PgPool,
        note_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM note_collaborators WHERE note_id = $1 AND user_id = $2")
                .bind(note_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a user is the note's owner or one of its collaborators.
    /// Used by resource-channel authorization.
    pub async fn is_collaborator(
        pool: &PgPool,
        note_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM notes WHERE id = $1 AND owner_id = $2 \
                 UNION ALL \
                 SELECT 1 FROM note_collaborators WHERE note_id = $1 AND user_id = $2 \
             )",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
