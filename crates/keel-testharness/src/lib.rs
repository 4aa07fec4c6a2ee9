//! ---
//! keel_section: "06-test-harness"
//! keel_subsection: "01-bootstrap"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Transactional test-wrapping support."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
//! Test support for persistence-context suites.
//!
//! Each test provisions an isolated in-memory context and runs its database
//! work inside a unit of work that is rolled back after the test body,
//! whatever the outcome. Nothing a wrapped test writes survives it.

use std::future::Future;
use std::time::Duration;

use keel_common::config::DatabaseConfig;
use keel_persistence::{PersistenceContext, Result, UnitOfWork};

/// An isolated, managed persistence context for one test.
#[derive(Debug, Clone)]
pub struct TestContext {
    context: PersistenceContext,
}

impl TestContext {
    /// Provision an in-memory context with a single pooled connection, so
    /// every statement in the test observes the same database instance.
    pub async fn provision() -> Result<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        };
        let context = PersistenceContext::connect(&config).await?;
        Ok(Self { context })
    }

    /// The managed context injected into the test.
    pub fn context(&self) -> &PersistenceContext {
        &self.context
    }

    /// Run `f` inside a unit of work and roll it back afterwards.
    ///
    /// The closure receives the unit of work by value and must hand it back
    /// alongside its result; the harness then discards the transaction. A
    /// closure that errors out forfeits the unit of work, which rolls back
    /// on drop.
    pub async fn with_rollback<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(UnitOfWork) -> Fut,
        Fut: Future<Output = Result<(UnitOfWork, T)>>,
    {
        let uow = self.context.begin().await?;
        let (uow, value) = f(uow).await?;
        uow.rollback().await?;
        Ok(value)
    }
}
