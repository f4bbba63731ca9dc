use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{format_time, json_column, time_column};
use crate::models::{Comment, CommentId, FeedbackId, UserId};

const COLUMNS: &str = "id, feedback_id, user_id, comment_text, parent_id, likes, liked_by, \
                       created_at, updated_at";

impl Comment {
    pub fn insert(
        conn: &Connection,
        feedback_id: FeedbackId,
        user_id: UserId,
        comment_text: &str,
        parent_id: Option<CommentId>,
        now: DateTime<Utc>,
    ) -> crate::Result<Self> {
        conn.execute(
            "INSERT INTO feedback_comments
                (feedback_id, user_id, comment_text, parent_id, likes, liked_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, '[]', ?5, ?5)",
            params![
                feedback_id,
                user_id,
                comment_text,
                parent_id,
                format_time(&now)
            ],
        )?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            feedback_id,
            user_id,
            comment_text: comment_text.to_string(),
            parent_id,
            likes: 0,
            liked_by: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Look up a comment, treating one that belongs to another feedback as absent.
    pub fn find_in_feedback(
        conn: &Connection,
        feedback_id: FeedbackId,
        id: CommentId,
    ) -> crate::Result<Option<Self>> {
        let comment = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM feedback_comments WHERE id = ?1 AND feedback_id = ?2"),
                params![id, feedback_id],
                Self::from_row,
            )
            .optional()?;
        Ok(comment)
    }

    /// Every comment of a feedback in creation order.
    pub fn list_for_feedback(conn: &Connection, feedback_id: FeedbackId) -> crate::Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM feedback_comments WHERE feedback_id = ?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map([feedback_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn save(&self, conn: &Connection) -> crate::Result<()> {
        conn.execute(
            "UPDATE feedback_comments
             SET comment_text = ?2, likes = ?3, liked_by = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                self.id,
                self.comment_text,
                i64::try_from(self.liked_by.len()).unwrap_or(i64::MAX),
                serde_json::to_string(&self.liked_by)?,
                format_time(&self.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Delete the given comments. Callers order `ids` leaves first so the
    /// parent_id references stay valid after every statement.
    pub fn delete_all(conn: &Connection, ids: &[CommentId]) -> crate::Result<usize> {
        let mut stmt = conn.prepare("DELETE FROM feedback_comments WHERE id = ?1")?;
        let mut removed = 0;
        for id in ids {
            removed += stmt.execute([id])?;
        }
        Ok(removed)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let liked_by: BTreeSet<UserId> = json_column(row, 6)?;
        Ok(Self {
            id: row.get(0)?,
            feedback_id: row.get(1)?,
            user_id: row.get(2)?,
            comment_text: row.get(3)?,
            parent_id: row.get(4)?,
            // The stored count is derived from the set; trust the set.
            likes: liked_by.len(),
            liked_by,
            created_at: time_column(row, 7)?,
            updated_at: time_column(row, 8)?,
        })
    }
}
