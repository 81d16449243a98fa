//! Database connection and operations for session.db.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info};

use crate::error::AuthResult;

/// Session database handle.
///
/// Manages the SQLite connection pool for session.db, which stores:
/// - the access token for the logged-in user
/// - the last selected vehicle id
/// - the unseen-reminders flag
#[derive(Debug, Clone)]
pub struct SessionDb {
    pool: SqlitePool,
}

impl SessionDb {
    /// Open or create a session database at the given path.
    ///
    /// This will:
    /// 1. Create the database file if it doesn't exist
    /// 2. Run any pending migrations
    /// 3. Configure SQLite for optimal performance (WAL mode, etc.)
    pub async fn open(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy();
        info!("Opening session database: {}", path_str);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("cache_size", "-8000") // 8MB cache, the state set is tiny
            .pragma("synchronous", "NORMAL") // Safe with WAL
            .pragma("temp_store", "MEMORY")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(3) // Session state has little concurrent access
            .connect_with(options)
            .await?;

        debug!("Session database connection established");

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> AuthResult<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};

        // A process-unique name per call: shared-cache lets every pool
        // connection see the same in-memory database, while the unique name
        // keeps concurrently running tests isolated from each other.
        static NEXT_DB_ID: AtomicU64 = AtomicU64::new(0);
        let id = NEXT_DB_ID.fetch_add(1, Ordering::Relaxed);

        let options = SqliteConnectOptions::new()
            .filename(format!("file:tread_test_mem_{id}?mode=memory"))
            .shared_cache(true)
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("foreign_keys", "ON");

        // Tests run under tokio's paused clock, which auto-advances to any
        // pending timer while the SQLite worker thread is busy. Configure the
        // pool so acquires never have to wait (and thus never register the
        // acquire-timeout timer): no acquire-time ping, no connection
        // reaping, and enough connections that one is always idle even while
        // others are being returned.
        const POOL_SIZE: u32 = 4;
        let pool = SqlitePoolOptions::new()
            .max_connections(POOL_SIZE)
            .test_before_acquire(false)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        // Pre-warm every connection so none has to be established later
        // while the clock is paused.
        let mut warm = Vec::new();
        for _ in 0..POOL_SIZE {
            warm.push(pool.acquire().await?);
        }
        drop(warm);

        Ok(Self { pool })
    }

    /// Run database migrations.
    async fn run_migrations(pool: &SqlitePool) -> AuthResult<()> {
        debug!("Running session database migrations");
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Session database migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database is healthy.
    pub async fn health_check(&self) -> AuthResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = SessionDb::open_in_memory().await.unwrap();
        db.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.db");

        let db = SessionDb::open(&path).await.unwrap();
        db.health_check().await.unwrap();
        db.close().await;

        assert!(path.exists());
    }
}
