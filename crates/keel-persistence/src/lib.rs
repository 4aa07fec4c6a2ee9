//! ---
//! keel_section: "04-persistence"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Persistence abstractions and database bindings."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
#![warn(missing_docs)]

/// Result alias used throughout the persistence crate.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Error type for the persistence subsystem.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Wrapper for failures raised by the underlying database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub mod context;
pub mod query;

pub use context::{PersistenceContext, UnitOfWork};
pub use query::QueryFactory;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_wrapped() {
        let err = PersistenceError::from(sqlx::Error::RowNotFound);
        assert!(format!("{err}").starts_with("database error:"));
    }
}
