use crate::config::Config;
use crate::error::Error;
use anyhow::Result;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Keeps pooled SQLite connections from failing fast when another
/// connection holds the write lock.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Database manager holding the connection pool
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database manager from the global configuration.
    pub fn new() -> Result<Self> {
        let config = Config::get();
        Self::with_url(&config.database.url, config.database.max_connections)
    }

    /// Create a pool for the given SQLite path and run pending migrations.
    pub fn with_url(url: &str, max_connections: u32) -> Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = Pool::builder()
            .max_size(max_connections)
            .connection_customizer(Box::new(ConnectionOptions))
            .build(manager)?;

        let db = Self { pool };
        db.initialize()?;

        Ok(db)
    }

    /// Test the connection and apply pending migrations.
    fn initialize(&self) -> Result<()> {
        let mut conn = self.pool.get()?;
        info!("Successfully connected to the database");

        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))?;
        info!("Database migrations applied successfully");

        Ok(())
    }

    /// Get a database connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection, Error> {
        Ok(self.pool.get()?)
    }

    /// Get the database connection pool reference
    pub fn get_pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Initialize the database pool and run migrations
pub fn init_database() -> Result<Database> {
    Database::new()
}

/// Run a blocking diesel closure on the tokio blocking pool.
pub async fn run<T, F>(pool: &DbPool, f: F) -> Result<T, Error>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await
    .map_err(|e| Error::Internal(format!("blocking task failed: {e}")))?
}
