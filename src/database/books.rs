use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::models::Book;

pub fn insert_book(
    conn: &mut DbConn,
    book_id: i64,
    title: &str,
    author: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO books (book_id, title, author, category) VALUES (?1, ?2, ?3, ?4)",
        params![book_id, title, author, category],
    )
    .context("Failed to insert book")?;
    Ok(())
}

fn parse_book_row(row: &rusqlite::Row) -> rusqlite::Result<Book> {
    Ok(Book {
        book_id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        category: row.get(3)?,
    })
}

/// The whole catalog ordered by id; these are the recommendation candidates.
pub fn list_all(conn: &mut DbConn) -> Result<Vec<Book>> {
    let sql = "SELECT book_id, title, author, category FROM books ORDER BY book_id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_book_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list books")?;

    Ok(rows)
}
