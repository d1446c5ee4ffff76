//! Ingestion-time handling of fields a document introduces.

mod event;
mod flatten;
mod infer;
mod matcher;

pub use event::{DynamicFieldEvent, FieldOrigin};
pub use flatten::{for_each_value, scan_document};
pub use infer::{is_date, value_kind};
pub use matcher::{check_event, check_events};

use crate::routing::RoutingError;
use thiserror::Error as ThisError;
use tsmapping_schema::{
    error::{MappingError, ValidationError},
    types::FieldType,
};

///
/// DocumentError
/// Why a single document was rejected.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DocumentError {
    #[error("failed to parse: {0}")]
    Malformed(String),

    #[error(
        "mapping set to strict, dynamic introduction of [{name}] within [{parent}] is not allowed"
    )]
    StrictDynamic { name: String, parent: String },

    #[error("failed to parse field [{path}] of type [{ty}]: tried to parse an object")]
    LeafGotObject { path: String, ty: FieldType },

    #[error(
        "object mapping for [{path}] tried to parse field [{path}] as object, but found a concrete value"
    )]
    ObjectGotValue { path: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}
