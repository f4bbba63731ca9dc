use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{enum_column, format_time, json_column, time_column};
use crate::models::{Feedback, FeedbackId, Sentiment, UserId};

const COLUMNS: &str = "id, manager_id, employee_id, strengths, areas_to_improve, sentiment, \
                       acknowledged, tags, created_at, updated_at";

/// A validated feedback record that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub manager_id: UserId,
    pub employee_id: UserId,
    pub strengths: String,
    pub areas_to_improve: String,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
}

impl Feedback {
    pub fn insert(conn: &Connection, new: NewFeedback, now: DateTime<Utc>) -> crate::Result<Self> {
        conn.execute(
            "INSERT INTO feedback
                (manager_id, employee_id, strengths, areas_to_improve, sentiment,
                 acknowledged, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?7)",
            params![
                new.manager_id,
                new.employee_id,
                new.strengths,
                new.areas_to_improve,
                new.sentiment.as_str(),
                serde_json::to_string(&new.tags)?,
                format_time(&now),
            ],
        )?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            manager_id: new.manager_id,
            employee_id: new.employee_id,
            strengths: new.strengths,
            areas_to_improve: new.areas_to_improve,
            sentiment: new.sentiment,
            acknowledged: false,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn find_by_id(conn: &Connection, id: FeedbackId) -> crate::Result<Option<Self>> {
        let feedback = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM feedback WHERE id = ?1"),
                [id],
                Self::from_row,
            )
            .optional()?;
        Ok(feedback)
    }

    /// Feedback authored by `manager_id`, oldest first.
    pub fn list_by_manager(conn: &Connection, manager_id: UserId) -> crate::Result<Vec<Self>> {
        Self::list_where(conn, "manager_id", manager_id)
    }

    /// Feedback received by `employee_id`, oldest first.
    pub fn list_by_employee(conn: &Connection, employee_id: UserId) -> crate::Result<Vec<Self>> {
        Self::list_where(conn, "employee_id", employee_id)
    }

    fn list_where(conn: &Connection, column: &str, user_id: UserId) -> crate::Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM feedback WHERE {column} = ?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Persist the mutable fields. Owner columns and `created_at` never change.
    pub fn save(&self, conn: &Connection) -> crate::Result<()> {
        conn.execute(
            "UPDATE feedback
             SET strengths = ?2, areas_to_improve = ?3, sentiment = ?4,
                 acknowledged = ?5, tags = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                self.id,
                self.strengths,
                self.areas_to_improve,
                self.sentiment.as_str(),
                self.acknowledged,
                serde_json::to_string(&self.tags)?,
                format_time(&self.updated_at),
            ],
        )?;
        Ok(())
    }

    /// All comments on this feedback, replies included.
    pub fn comment_count(conn: &Connection, id: FeedbackId) -> crate::Result<usize> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM feedback_comments WHERE feedback_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            manager_id: row.get(1)?,
            employee_id: row.get(2)?,
            strengths: row.get(3)?,
            areas_to_improve: row.get(4)?,
            sentiment: enum_column(row, 5, Sentiment::from_str)?,
            acknowledged: row.get(6)?,
            tags: json_column(row, 7)?,
            created_at: time_column(row, 8)?,
            updated_at: time_column(row, 9)?,
        })
    }
}
