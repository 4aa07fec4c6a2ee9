//! ---
//! keel_section: "01-core-functionality"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Runtime assembly and lifecycle management."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
//! Runtime assembly for the Keel scaffold. The bootstrap binary hands the
//! loaded configuration to [`runtime::Runtime`] and keeps control only for
//! signal handling.

pub mod runtime;

pub use runtime::{Runtime, RuntimeHandle};
