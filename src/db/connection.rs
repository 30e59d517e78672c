/// SQLite history database
///
/// One pool per process. The schema is created on open, so a missing file is
/// never an error.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

const MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl Database {
    /// Open `db_path`, creating the file and its parent directories as needed
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite:{}", db_path.display());
        let db = Self::open(&url, MAX_CONNECTIONS, db_path).await?;
        tracing::debug!(path = %db.db_path.display(), "opened history database");

        Ok(db)
    }

    /// Fresh in-memory database.
    ///
    /// Each connection to `:memory:` sees its own database, so the pool holds
    /// exactly one.
    pub async fn new_in_memory() -> Result<Self> {
        Self::open("sqlite::memory:", 1, PathBuf::from(":memory:")).await
    }

    async fn open(url: &str, max_connections: u32, db_path: PathBuf) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path,
        };
        db.initialize_schema().await?;

        Ok(db)
    }

    async fn initialize_schema(&self) -> Result<()> {
        // sqlx runs one statement per query
        for statement in include_str!("schema.sql").split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(self.pool.as_ref()).await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Row counts shown by `ldapie history --stats`
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let (total_commands, succeeded_commands, sessions): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(succeeded), 0), COUNT(DISTINCT session_id) FROM commands",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        let value_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM query_values")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(DatabaseStats {
            total_commands,
            succeeded_commands,
            sessions,
            stored_values: value_count.0,
            pool_size: self.pool.size(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_commands: i64,
    pub succeeded_commands: i64,
    pub sessions: i64,
    pub stored_values: i64,
    pub pool_size: u32,
}
