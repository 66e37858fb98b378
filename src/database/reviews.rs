use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::models::Review;
use crate::dataset::RatingTriple;

pub fn insert_review(
    conn: &mut DbConn,
    reviewer_id: i64,
    book_id: i64,
    rating: f64,
) -> Result<Review> {
    let sql = "INSERT INTO reviews (reviewer_id, book_id, rating) VALUES (?1, ?2, ?3) RETURNING review_id, reviewer_id, book_id, rating, created_at";

    conn.query_row(sql, params![reviewer_id, book_id, rating], parse_review_row)
        .context("Failed to insert review")
}

fn parse_review_row(row: &rusqlite::Row) -> rusqlite::Result<Review> {
    Ok(Review {
        review_id: row.get(0)?,
        reviewer_id: row.get(1)?,
        book_id: row.get(2)?,
        rating: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Every observed rating, oldest first, as training triples.
pub fn list_rating_triples(conn: &mut DbConn) -> Result<Vec<RatingTriple>> {
    let sql = "SELECT reviewer_id, book_id, rating, created_at FROM reviews ORDER BY created_at, review_id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RatingTriple {
                user_id: row.get(0)?,
                item_id: row.get(1)?,
                rating: row.get(2)?,
                timestamp: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read ratings")?;

    Ok(rows)
}
