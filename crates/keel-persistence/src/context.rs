//! ---
//! keel_section: "04-persistence"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Persistence abstractions and database bindings."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
use keel_common::config::DatabaseConfig;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};

use crate::Result;

/// Handle to the managed persistence context.
///
/// The context owns a connection pool; clones share it. All unit-of-work
/// boundaries and query helpers are derived from this handle, which is the
/// only way the rest of the workspace reaches the database.
#[derive(Debug, Clone)]
pub struct PersistenceContext {
    pool: SqlitePool,
}

impl PersistenceContext {
    /// Connect a pool according to the database configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;
        info!(url = %config.url, max_connections = config.max_connections, "persistence context connected");
        Ok(Self { pool })
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a new unit-of-work boundary.
    pub async fn begin(&self) -> Result<UnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork { tx })
    }

    /// Trivial round-trip used by health checks.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        debug!("closing persistence context");
        self.pool.close().await;
    }

    /// Whether [`close`](Self::close) has completed.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// A transactional unit of work.
///
/// Consumed by [`commit`](Self::commit) or [`rollback`](Self::rollback);
/// dropping it without committing rolls the transaction back when the
/// connection returns to the pool.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Execute a statement inside the transaction, returning affected rows.
    pub async fn execute(&mut self, sql: &str) -> Result<u64> {
        let done = sqlx::query(sql).execute(&mut *self.tx).await?;
        Ok(done.rows_affected())
    }

    /// Fetch all rows for a query inside the transaction.
    pub async fn fetch_all(&mut self, sql: &str) -> Result<Vec<SqliteRow>> {
        Ok(sqlx::query(sql).fetch_all(&mut *self.tx).await?)
    }

    /// Make the unit of work's effects durable.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard the unit of work's effects.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}
