//! NeuroArc E2E Common Library
//!
//! Shared types, configuration, and error taxonomy for the NeuroArc
//! UI regression harness.

pub mod config;
pub mod error;
pub mod ident;
pub mod types;

// Re-export commonly used types
pub use config::HarnessConfig;
pub use error::{Error, Result};
pub use ident::{unique_name, NameGenerator};
pub use types::{EntityKind, EntityRecord, Experiment, Project, ScopePath, Subject};

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
