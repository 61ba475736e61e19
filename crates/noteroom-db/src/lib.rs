//! # noteroom-db
//!
//! PostgreSQL database layer for noteroom.
//!
//! This crate provides:
//! - Connection pool management
//! - The note repository implementation
//! - Embedded schema migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use noteroom_db::{CreateNoteRequest, Database, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/noteroom").await?;
//!
//!     let note = db.notes.insert(CreateNoteRequest {
//!         title: "Standup agenda".to_string(),
//!         content: "- demos\n- blockers".to_string(),
//!         room_id: "team-42".to_string(),
//!         created_by: "alice".to_string(),
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;

// Re-export core types
pub use noteroom_core::*;

pub use notes::PgNoteRepository;
pub use pool::{create_lazy_pool_with_config, create_pool, create_pool_with_config, PoolConfig};

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for CRUD operations.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Create a Database whose pool connects on first use instead of eagerly.
    ///
    /// The URL is parsed immediately, but no connection is attempted until a
    /// query runs — handlers that never touch the store (the realtime
    /// gateway, validation failures) work without a reachable server.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        Self::connect_lazy_with_config(url, PoolConfig::default())
    }

    /// Lazy connection with custom pool configuration.
    pub fn connect_lazy_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = pool::create_lazy_pool_with_config(url, config)?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            notes: PgNoteRepository::new(self.pool.clone()),
        }
    }
}
