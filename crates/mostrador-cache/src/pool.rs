//! # Cache Pool Management
//!
//! Connection pool creation and schema versioning for the local cache.
//!
//! ## Schema Versioning
//! The schema version lives in SQLite's `user_version` pragma. Opening a
//! cache whose version is behind [`SCHEMA_VERSION`] runs each migration
//! step in order; a cache that fails to migrate is unusable and `open`
//! rejects. Steps may create or drop partitions' backing storage.
//!
//! ## WAL Mode
//! WAL journaling is enabled so mirror writes (frequent, small) do not
//! block reads from the UI projections.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{CacheError, CacheResult};

/// Current cache schema version. Bump when adding a migration step.
pub const SCHEMA_VERSION: i64 = 2;

// =============================================================================
// Configuration
// =============================================================================

/// Local cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Path to the SQLite cache file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Connection acquire timeout.
    pub connect_timeout: Duration,
}

impl CacheConfig {
    /// Creates a configuration for an on-disk cache file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CacheConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// In-memory cache for tests. Single connection so the database
    /// survives for the pool's lifetime.
    pub fn in_memory() -> Self {
        CacheConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Local Cache
// =============================================================================

/// Handle to the local durable cache.
///
/// Cloning is cheap; all clones share the same pool.
#[derive(Debug, Clone)]
pub struct LocalCache {
    pool: SqlitePool,
}

impl LocalCache {
    /// Opens (creating if missing) the cache and migrates its schema.
    pub async fn open(config: CacheConfig) -> CacheResult<Self> {
        info!(path = %config.database_path.display(), "Opening local cache");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;

        let cache = LocalCache { pool };
        cache.migrate().await?;
        Ok(cache)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs pending schema migration steps.
    ///
    /// Idempotent: a cache already at [`SCHEMA_VERSION`] is untouched.
    async fn migrate(&self) -> CacheResult<()> {
        let row = sqlx::query("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CacheError::MigrationFailed(e.to_string()))?;
        let mut version: i64 = row.get(0);

        debug!(version, target = SCHEMA_VERSION, "Cache schema check");

        while version < SCHEMA_VERSION {
            let next = version + 1;
            self.apply_step(next)
                .await
                .map_err(|e| CacheError::MigrationFailed(format!("step {}: {}", next, e)))?;

            sqlx::query(&format!("PRAGMA user_version = {}", next))
                .execute(&self.pool)
                .await
                .map_err(|e| CacheError::MigrationFailed(e.to_string()))?;
            version = next;
            info!(version, "Cache schema migrated");
        }

        Ok(())
    }

    async fn apply_step(&self, step: i64) -> Result<(), sqlx::Error> {
        match step {
            // v1: the partitioned key-value table.
            1 => {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS kv_entries (
                        partition  TEXT NOT NULL,
                        key        TEXT NOT NULL,
                        value      TEXT NOT NULL,
                        updated_at TEXT NOT NULL,
                        PRIMARY KEY (partition, key)
                    )
                    "#,
                )
                .execute(&self.pool)
                .await?;
            }
            // v2: scan index for whole-partition reads in write order.
            2 => {
                sqlx::query(
                    "CREATE INDEX IF NOT EXISTS idx_kv_partition_updated
                     ON kv_entries (partition, updated_at)",
                )
                .execute(&self.pool)
                .await?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Checks the cache is responsive.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the pool. All later operations fail.
    pub async fn close(&self) {
        info!("Closing local cache pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_cache_opens_and_migrates() {
        let cache = LocalCache::open(CacheConfig::in_memory()).await.unwrap();
        assert!(cache.health_check().await);

        let row = sqlx::query("PRAGMA user_version")
            .fetch_one(cache.pool())
            .await
            .unwrap();
        let version: i64 = row.get(0);
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_migration_is_idempotent() {
        let cache = LocalCache::open(CacheConfig::in_memory()).await.unwrap();
        cache.migrate().await.unwrap();
        assert!(cache.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::new("/tmp/cache.db").max_connections(2);
        assert_eq!(config.max_connections, 2);
    }
}
