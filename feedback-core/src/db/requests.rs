use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{enum_column, format_time, optional_time_column, time_column};
use crate::models::{FeedbackRequest, RequestId, RequestStatus, UserId};

const COLUMNS: &str = "id, employee_id, manager_id, message, status, created_at, completed_at";

impl FeedbackRequest {
    pub fn insert(
        conn: &Connection,
        employee_id: UserId,
        manager_id: UserId,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> crate::Result<Self> {
        conn.execute(
            "INSERT INTO feedback_requests (employee_id, manager_id, message, status, created_at)
             VALUES (?1, ?2, ?3, 'pending', ?4)",
            params![employee_id, manager_id, message, format_time(&now)],
        )?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            employee_id,
            manager_id,
            message,
            status: RequestStatus::Pending,
            created_at: now,
            completed_at: None,
        })
    }

    pub fn find_by_id(conn: &Connection, id: RequestId) -> crate::Result<Option<Self>> {
        let request = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM feedback_requests WHERE id = ?1"),
                [id],
                Self::from_row,
            )
            .optional()?;
        Ok(request)
    }

    pub fn find_pending(
        conn: &Connection,
        employee_id: UserId,
        manager_id: UserId,
    ) -> crate::Result<Option<Self>> {
        let request = conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM feedback_requests
                     WHERE employee_id = ?1 AND manager_id = ?2 AND status = 'pending'
                     LIMIT 1"
                ),
                params![employee_id, manager_id],
                Self::from_row,
            )
            .optional()?;
        Ok(request)
    }

    /// Requests addressed to `manager_id`, newest first.
    pub fn list_by_manager(conn: &Connection, manager_id: UserId) -> crate::Result<Vec<Self>> {
        Self::list_where(conn, "manager_id", manager_id)
    }

    /// Requests raised by `employee_id`, newest first.
    pub fn list_by_employee(conn: &Connection, employee_id: UserId) -> crate::Result<Vec<Self>> {
        Self::list_where(conn, "employee_id", employee_id)
    }

    fn list_where(conn: &Connection, column: &str, user_id: UserId) -> crate::Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM feedback_requests WHERE {column} = ?1
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn save(&self, conn: &Connection) -> crate::Result<()> {
        conn.execute(
            "UPDATE feedback_requests SET status = ?2, completed_at = ?3 WHERE id = ?1",
            params![
                self.id,
                self.status.as_str(),
                self.completed_at.as_ref().map(format_time),
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            manager_id: row.get(2)?,
            message: row.get(3)?,
            status: enum_column(row, 4, RequestStatus::from_str)?,
            created_at: time_column(row, 5)?,
            completed_at: optional_time_column(row, 6)?,
        })
    }
}
