//! Repository for the `transcript_lines` table.

use confab_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::meeting::TranscriptLine;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, meeting_id, speaker_id, content, spoken_at, created_at";

/// Provides append/read operations for meeting transcripts.
pub struct TranscriptRepo;

impl TranscriptRepo {
    /// Append a transcript line, returning the created row.
    pub async fn append(
        pool: &PgPool,
        meeting_id: DbId,
        speaker_id: DbId,
        content: &str,
        spoken_at: Option<Timestamp>,
    ) -> Result<TranscriptLine, sqlx::Error> {
        let query = format!(
            "INSERT INTO transcript_lines (meeting_id, speaker_id, content, spoken_at) \
             VALUES ($1, $2, $3, COALESCE($4, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TranscriptLine>(&query)
            .bind(meeting_id)
            .bind(speaker_id)
            .bind(content)
            .bind(spoken_at)
            .fetch_one(pool)
            .await
    }

    /// List a meeting's transcript in spoken order.
    pub async fn list_for_meeting(
        pool: &PgPool,
        meeting_id: DbId,
    ) -> Result<Vec<TranscriptLine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transcript_lines \
             WHERE meeting_id = $1 \
             ORDER BY spoken_at ASC, id ASC"
        );
        sqlx::query_as::<_, TranscriptLine>(&query)
            .bind(meeting_id)
            .fetch_all(pool)
            .await
    }
}
