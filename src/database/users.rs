use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;

pub fn insert_user(conn: &mut DbConn, user_id: i64, username: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, username) VALUES (?1, ?2)",
        params![user_id, username],
    )
    .context("Failed to insert user")?;
    Ok(())
}

/// Whether the store has any record of the user, rated or not.
pub fn user_exists(conn: &mut DbConn, user_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to query user by id")?;

    Ok(found.is_some())
}
