//! SQLite access
//!
//! Every operation opens its own pool and closes it before returning, on the
//! success path and the error path alike. Nothing is held across requests.

use crate::core::error::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// How long a connection waits on another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone, Debug)]
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Open a short-lived pool for a single operation
    async fn get_pool(&self) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        Ok(SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?)
    }

    /// Run `op` against a fresh pool, closing it however `op` finishes
    pub async fn scoped<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce(SqlitePool) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let pool = self.get_pool().await?;
        let result = op(pool.clone()).await;
        pool.close().await;
        result
    }

    /// Apply pending schema migrations. Called once at startup.
    pub async fn migrate(&self) -> Result<()> {
        self.scoped(|pool| async move { MIGRATOR.run(&pool).await.map_err(Error::from) })
            .await?;

        info!("[Db] Schema ready at {:?}", self.db_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_migrate_creates_tables() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("passes.sqlite"));
        db.migrate().await.unwrap();

        let tables: Vec<(String,)> = db
            .scoped(|pool| async move {
                sqlx::query_as(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name != 'sqlite_sequence' ORDER BY name",
                )
                .fetch_all(&pool)
                .await
                .map_err(Error::from)
            })
            .await
            .unwrap();

        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["accounts", "pass_requests", "sessions"]);
    }

    #[tokio::test]
    async fn test_migrate_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("passes.sqlite"));

        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
    }
}
