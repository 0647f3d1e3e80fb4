//! Repository for the `action_items` table.

use confab_core::types::DbId;
use sqlx::PgPool;

use crate::models::note::{ActionItem, CreateActionItem, UpdateActionItem};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, note_id, content, assignee_id, is_done, created_at, updated_at";

/// Provides CRUD operations for note action items.
pub struct ActionItemRepo;

impl ActionItemRepo {
    /// Insert a new action item, returning the created row.
    pub async fn create(
        pool: &PgPool,
        note_id: DbId,
        input: &CreateActionItem,
    ) -> Result<ActionItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO action_items (note_id, content, assignee_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActionItem>(&query)
            .bind(note_id)
            .bind(&input.content)
            .bind(input.assignee_id)
            .fetch_one(pool)
            .await
    }

    /// Find an action item by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ActionItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM action_items WHERE id = $1");
        sqlx::query_as::<_, ActionItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update an action item. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateActionItem,
    ) -> Result<Option<ActionItem>, sqlx::Error> {
        let query = format!(
            "UPDATE action_items SET \
                content = COALESCE($2, content), \
                assignee_id = COALESCE($3, assignee_id), \
                is_done = COALESCE($4, is_done) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActionItem>(&query)
            .bind(id)
            .bind(&input.content)
            .bind(input.assignee_id)
            .bind(input.is_done)
            .fetch_optional(pool)
            .await
    }

    /// Delete an action item. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM action_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a note's action items, oldest first.
    pub async fn list_for_note(
        pool: &PgPool,
        note_id: DbId,
    ) -> Result<Vec<ActionItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM action_items WHERE note_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ActionItem>(&query)
            .bind(note_id)
            .fetch_all(pool)
            .await
    }
}
