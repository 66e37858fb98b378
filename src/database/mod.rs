pub mod books;
pub mod borrows;
pub mod connection;
pub mod models;
pub mod reviews;
pub mod setup;
pub mod users;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use models::*;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seeded_connection() -> (DbPool, DbConn) {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        setup::initialize_schema(&mut conn).unwrap();

        users::insert_user(&mut conn, 1, "alice").unwrap();
        users::insert_user(&mut conn, 2, "bob").unwrap();
        books::insert_book(&mut conn, 11, "Dune", Some("Herbert"), Some("sci-fi")).unwrap();
        books::insert_book(&mut conn, 10, "Emma", Some("Austen"), None).unwrap();
        books::insert_book(&mut conn, 12, "Ulysses", None, None).unwrap();
        (pool, conn)
    }

    #[test]
    fn test_user_exists() {
        let (_pool, mut conn) = seeded_connection();
        assert!(users::user_exists(&mut conn, 1).unwrap());
        assert!(!users::user_exists(&mut conn, 999).unwrap());
    }

    #[test]
    fn test_books_are_listed_by_id() {
        let (_pool, mut conn) = seeded_connection();
        let ids: Vec<i64> = books::list_all(&mut conn)
            .unwrap()
            .into_iter()
            .map(|b| b.book_id)
            .collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn test_reviews_become_rating_triples() {
        let (_pool, mut conn) = seeded_connection();
        let review = reviews::insert_review(&mut conn, 1, 10, 4.0).unwrap();
        assert!(review.created_at.is_some());
        reviews::insert_review(&mut conn, 2, 11, 5.0).unwrap();

        let triples = reviews::list_rating_triples(&mut conn).unwrap();
        assert_eq!(triples.len(), 2);
        assert_eq!((triples[0].user_id, triples[0].item_id, triples[0].rating), (1, 10, 4.0));
        assert!(triples[0].timestamp.is_some());
    }

    #[test]
    fn test_interacted_books_combine_reviews_and_borrows() {
        let (_pool, mut conn) = seeded_connection();
        reviews::insert_review(&mut conn, 1, 10, 4.0).unwrap();
        let copy = borrows::insert_inventory(&mut conn, 12).unwrap();
        borrows::insert_borrow(&mut conn, 1, copy).unwrap();

        let ids = borrows::interacted_book_ids(&mut conn, 1).unwrap();
        assert_eq!(ids, HashSet::from([10, 12]));
        assert!(borrows::interacted_book_ids(&mut conn, 2).unwrap().is_empty());
    }
}
