//! User storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::User;

pub struct UserStore<'a> {
    conn: &'a Connection,
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            name: row.get(1)?,
            email: row.get(2)?,
            image_url: row.get(3)?,
            created_at: parse_datetime(&row.get::<_, String>(4)?)?,
            updated_at: parse_datetime(&row.get::<_, String>(5)?)?,
        })
    }

    /// Create a new user
    #[instrument(skip(self, user), fields(user_name = %user.name))]
    pub fn create(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, name, email, image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.image_url,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find user by ID
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, image_url, created_at, updated_at
             FROM users WHERE id = ?1",
        )?;

        let user = stmt
            .query_row(params![id.to_string()], Self::map_user)
            .optional()?;

        Ok(user)
    }

    /// List all users ordered by name
    pub fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, image_url, created_at, updated_at
             FROM users ORDER BY name",
        )?;

        let users = stmt
            .query_map([], Self::map_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// List users a given user can open a direct conversation with
    /// (everyone except themselves)
    pub fn list_peers(&self, user_id: Uuid) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, image_url, created_at, updated_at
             FROM users WHERE id != ?1 ORDER BY name",
        )?;

        let users = stmt
            .query_map(params![user_id.to_string()], Self::map_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Search users by name or email, excluding the searching user
    #[instrument(skip(self))]
    pub fn search(&self, query: &str, exclude: Option<Uuid>) -> Result<Vec<User>> {
        let pattern = format!("%{}%", query.trim());
        let exclude = exclude.map(|id| id.to_string()).unwrap_or_default();

        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, image_url, created_at, updated_at
             FROM users
             WHERE (name LIKE ?1 OR email LIKE ?1) AND id != ?2
             ORDER BY name",
        )?;

        let users = stmt
            .query_map(params![pattern, exclude], Self::map_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Delete a user (their messages cascade away with them)
    #[instrument(skip(self))]
    pub fn delete(&self, user_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM users WHERE id = ?1",
            params![user_id.to_string()],
        )?;
        Ok(())
    }

    /// Count all users
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
