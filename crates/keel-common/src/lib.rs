//! ---
//! keel_section: "01-core-functionality"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Shared primitives and utilities for the scaffold runtime."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
//! Core shared primitives for the Keel workspace.
//! This crate exposes configuration loading, logging, and version metadata
//! utilities consumed across the workspace.

pub mod config;
pub mod logging;
pub mod version;

pub use config::{AppConfig, DatabaseConfig, LoggingConfig, ServerConfig};
pub use logging::{init_tracing, LogFormat};
pub use version::VersionInfo;
