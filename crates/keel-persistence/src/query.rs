//! ---
//! keel_section: "04-persistence"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Context-bound query helper."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
use sqlx::sqlite::SqliteRow;

use crate::context::PersistenceContext;
use crate::Result;

/// Query helper bound to a persistence context.
///
/// Call sites construct their own factory from an explicit context handle;
/// instances are cheap (they share the context's pool) and nothing is
/// registered process-wide. Query construction itself stays with the
/// database driver; this type only routes statements through the context
/// it was built from.
#[derive(Debug, Clone)]
pub struct QueryFactory {
    context: PersistenceContext,
}

impl QueryFactory {
    /// Bind a new factory to the given context.
    pub fn new(context: PersistenceContext) -> Self {
        Self { context }
    }

    /// The context this factory routes through.
    pub fn context(&self) -> &PersistenceContext {
        &self.context
    }

    /// Fetch all rows for a query.
    pub async fn fetch_all(&self, sql: &str) -> Result<Vec<SqliteRow>> {
        Ok(sqlx::query(sql).fetch_all(self.context.pool()).await?)
    }

    /// Fetch at most one row for a query.
    pub async fn fetch_optional(&self, sql: &str) -> Result<Option<SqliteRow>> {
        Ok(sqlx::query(sql)
            .fetch_optional(self.context.pool())
            .await?)
    }

    /// Execute a statement, returning affected rows.
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        let done = sqlx::query(sql).execute(self.context.pool()).await?;
        Ok(done.rows_affected())
    }
}
