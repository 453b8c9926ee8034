//! Database layer for Cinescope
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Find-or-create resolution for reference entities
//! - Connection pool management

pub mod models;
pub mod resolver;
mod repository;

pub use repository::{
    FavoriteFilter, GenreWithCount, MovieChanges, MovieDetail, MovieFilter, MovieListItem,
    MovieSearch, NewMovie, Repository, SortOrder,
};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct DbPool {
    /// Primary connection (for writes)
    pub primary: DatabaseConnection,

    /// Read replica connection (optional)
    pub replica: Option<DatabaseConnection>,
}

// sea-orm's `mock` feature removes `Clone` from `DatabaseConnection`, so the
// field-wise clone the derive would generate is spelled out here; mock
// connections are shared handles (`Arc`), matching pool-clone semantics.
#[cfg(feature = "mock")]
impl Clone for DbPool {
    fn clone(&self) -> Self {
        fn clone_conn(conn: &DatabaseConnection) -> DatabaseConnection {
            match conn {
                DatabaseConnection::SqlxPostgresPoolConnection(c) => {
                    DatabaseConnection::SqlxPostgresPoolConnection(c.clone())
                }
                DatabaseConnection::MockDatabaseConnection(c) => {
                    DatabaseConnection::MockDatabaseConnection(c.clone())
                }
                DatabaseConnection::Disconnected => DatabaseConnection::Disconnected,
            }
        }

        Self {
            primary: clone_conn(&self.primary),
            replica: self.replica.as_ref().map(clone_conn),
        }
    }
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to primary database...");

        let mut primary_opts = ConnectOptions::new(&config.url);
        primary_opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let primary = Database::connect(primary_opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to primary: {}", e),
            })?;

        // Connect to replica if configured
        let replica = if let Some(ref read_url) = config.read_url {
            info!("Connecting to read replica...");

            let mut replica_opts = ConnectOptions::new(read_url);
            replica_opts
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                .sqlx_logging(true);

            let replica_conn = Database::connect(replica_opts)
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Failed to connect to replica: {}", e),
                })?;

            Some(replica_conn)
        } else {
            None
        };

        info!("Database connections established");

        Ok(Self { primary, replica })
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;

        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Primary ping failed: {}", e),
            })?;

        if let Some(ref replica) = self.replica {
            replica
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Replica ping failed: {}", e),
                })?;
        }

        Ok(())
    }
}
