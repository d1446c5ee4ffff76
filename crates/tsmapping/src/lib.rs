//! ## Crate layout
//! - `schema`: mapping tree, routing_path patterns and index-creation validation.
//! - `core`: index registry, ingestion-time checks, routing and bulk handling.
//! - `config`: TOML configuration.
//!
//! The `prelude` module carries the types most callers need.

pub use tsmapping_config as config;
pub use tsmapping_core as core;
pub use tsmapping_schema as schema;

pub use tsmapping_core::{Error, db, ingest, query, routing};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::Config,
        core::prelude::*,
        schema::{
            build::parse_mapping,
            error::{ValidationError, ValidationErrorKind},
            prelude::*,
            validate::{ValidationStrategy, validate_index},
        },
    };
}
