//! Database connector: pluggable, trait-based backend selection.
//!
//! Every backend hands out the same `Database` handle (an sqlx `AnyPool` tagged
//! with its `Backend`), so repository code is written once against the shared
//! `?`-placeholder dialect. The few engine-specific statements are looked up on
//! `Backend`. `connector_for` picks the implementation from the URL scheme.

use async_trait::async_trait;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;
use thiserror::Error;
use tracing::{error, info};

/// Pooled handle shared by every request. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    backend: Backend,
}

impl Database {
    pub fn new(pool: AnyPool, backend: Backend) -> Self {
        Database { pool, backend }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Unsupported database backend: {0}")]
    UnsupportedBackend(String),

    #[error("Database driver error: {0}")]
    Driver(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    /// Detects the backend from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?;
        match scheme {
            "mysql" | "mariadb" => Some(Backend::MySql),
            "sqlite" => Some(Backend::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::MySql => "mysql",
            Backend::Sqlite => "sqlite",
        }
    }

    /// Reads back the identifier generated by the last INSERT on the same
    /// connection, as text.
    pub fn last_insert_id_query(&self) -> &'static str {
        match self {
            Backend::MySql => "SELECT CAST(LAST_INSERT_ID() AS CHAR)",
            Backend::Sqlite => "SELECT CAST(last_insert_rowid() AS TEXT)",
        }
    }
}

/// The connect capability. Implement this to add a backend without touching
/// handler or repository code.
///
/// Opening a handle is lazy: no round trip is made, so an unreachable server
/// only surfaces on the first query.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    fn backend(&self) -> Backend;

    async fn connect(&self) -> Result<Database, ConnectionError>;
}

pub struct MySqlConnector {
    pub url: String,
    pub max_connections: u32,
}

#[async_trait]
impl DatabaseConnector for MySqlConnector {
    fn backend(&self) -> Backend {
        Backend::MySql
    }

    async fn connect(&self) -> Result<Database, ConnectionError> {
        let pool = lazy_pool(&self.url, self.max_connections)?;
        Ok(Database::new(pool, Backend::MySql))
    }
}

/// SQLite connector. An in-memory URL (`sqlite::memory:`) gives each pooled
/// connection its own database, so the pool is held to one connection there.
pub struct SqliteConnector {
    pub url: String,
    pub max_connections: u32,
}

#[async_trait]
impl DatabaseConnector for SqliteConnector {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn connect(&self) -> Result<Database, ConnectionError> {
        let max_connections = sqlite_max_connections(&self.url, self.max_connections);
        let pool = lazy_pool(&self.url, max_connections)?;
        Ok(Database::new(pool, Backend::Sqlite))
    }
}

fn sqlite_max_connections(url: &str, requested: u32) -> u32 {
    if url.contains(":memory:") || url.contains("mode=memory") {
        1
    } else {
        requested
    }
}

fn lazy_pool(url: &str, max_connections: u32) -> Result<AnyPool, ConnectionError> {
    install_default_drivers();

    Ok(AnyPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_lazy(url)?)
}

/// Selects a connector implementation from the URL scheme.
pub fn connector_for(
    url: &str,
    max_connections: u32,
) -> Result<Box<dyn DatabaseConnector>, ConnectionError> {
    let url = url.to_string();
    match Backend::from_url(&url) {
        Some(Backend::MySql) => Ok(Box::new(MySqlConnector {
            url,
            max_connections,
        })),
        Some(Backend::Sqlite) => Ok(Box::new(SqliteConnector {
            url,
            max_connections,
        })),
        None => {
            let scheme = url.split(':').next().unwrap_or_default().to_string();
            Err(ConnectionError::UnsupportedBackend(scheme))
        }
    }
}

/// Opens the database through the given connector, logging the outcome.
pub async fn open_database(connector: &dyn DatabaseConnector) -> Result<Database, ConnectionError> {
    let backend = connector.backend().as_str();
    match connector.connect().await {
        Ok(db) => {
            info!("Database handle opened (backend: {backend})");
            Ok(db)
        }
        Err(e) => {
            error!("Error connecting to the {backend} database: {e}");
            Err(e)
        }
    }
}

/// Issues a trivial round trip to verify the server is reachable.
pub async fn ping(db: &Database) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(db.pool()).await?;
    Ok(())
}
