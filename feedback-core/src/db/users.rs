use rusqlite::{params, Connection, Row};

use super::enum_column;
use crate::models::{Role, User, UserId};

impl User {
    /// Insert the user, or refresh the stored copy when the id already exists.
    pub fn upsert(&self, conn: &Connection) -> crate::Result<()> {
        conn.execute(
            "INSERT INTO users (id, name, email, role, manager_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                role = excluded.role,
                manager_id = excluded.manager_id",
            params![
                self.id,
                self.name,
                self.email,
                self.role.as_str(),
                self.manager_id
            ],
        )?;
        Ok(())
    }

    /// Every stored user, ordered by id.
    pub fn list_all(conn: &Connection) -> crate::Result<Vec<User>> {
        let mut stmt =
            conn.prepare("SELECT id, name, email, role, manager_id FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Swap the stored email for a placeholder no real address can match, so
    /// the address can be claimed by another id in the same transaction.
    pub fn release_email(conn: &Connection, id: UserId) -> crate::Result<()> {
        conn.execute(
            "UPDATE users SET email = ?2 WHERE id = ?1",
            params![id, format!("user-{id}@released.invalid")],
        )?;
        Ok(())
    }

    /// Detach a user from its manager.
    pub fn clear_manager(conn: &Connection, id: UserId) -> crate::Result<()> {
        conn.execute("UPDATE users SET manager_id = NULL WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Delete a user that no feedback, comment or request refers to.
    /// Returns `false` and keeps the row when something still does.
    pub fn delete_if_unreferenced(conn: &Connection, id: UserId) -> crate::Result<bool> {
        let referenced: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM feedback WHERE manager_id = ?1 OR employee_id = ?1)
                 OR EXISTS (SELECT 1 FROM feedback_comments WHERE user_id = ?1)
                 OR EXISTS (SELECT 1 FROM feedback_requests WHERE manager_id = ?1 OR employee_id = ?1)
                 OR EXISTS (SELECT 1 FROM users WHERE manager_id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        if referenced {
            return Ok(false);
        }
        conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(true)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: enum_column(row, 3, Role::from_str)?,
            manager_id: row.get(4)?,
        })
    }
}
