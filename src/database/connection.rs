use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

pub fn create_pool(database_path: &str) -> Result<DbPool> {
    let manager = with_foreign_keys(SqliteConnectionManager::file(database_path));
    r2d2::Pool::builder()
        .build(manager)
        .with_context(|| format!("Failed to open rating store at {}", database_path))
}

/// Single-connection pool over a private in-memory database.
///
/// Every SQLite memory connection is its own database, so the pool never
/// opens a second one.
pub fn create_memory_pool() -> Result<DbPool> {
    let manager = with_foreign_keys(SqliteConnectionManager::memory());
    r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .context("Failed to create in-memory rating store")
}

fn with_foreign_keys(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}
