use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;

/// Adds one physical copy of a book and returns its inventory id.
pub fn insert_inventory(conn: &mut DbConn, book_id: i64) -> Result<i64> {
    conn.query_row(
        "INSERT INTO inventory (book_id) VALUES (?1) RETURNING inventory_id",
        params![book_id],
        |row| row.get(0),
    )
    .context("Failed to insert inventory")
}

pub fn insert_borrow(conn: &mut DbConn, borrower_id: i64, inventory_id: i64) -> Result<i64> {
    conn.query_row(
        "INSERT INTO borrow_transactions (borrower_id, inventory_id) VALUES (?1, ?2) RETURNING transaction_id",
        params![borrower_id, inventory_id],
        |row| row.get(0),
    )
    .context("Failed to insert borrow transaction")
}

/// Books the user has reviewed or ever borrowed.
pub fn interacted_book_ids(conn: &mut DbConn, user_id: i64) -> Result<HashSet<i64>> {
    let sql = "
        SELECT DISTINCT book_id FROM reviews WHERE reviewer_id = ?1
        UNION
        SELECT DISTINCT i.book_id
        FROM borrow_transactions bt
        JOIN inventory i ON bt.inventory_id = i.inventory_id
        WHERE bt.borrower_id = ?1
    ";

    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map(params![user_id], |row| row.get(0))?
        .collect::<rusqlite::Result<HashSet<i64>>>()
        .context("Failed to list books the user interacted with")?;

    Ok(ids)
}
