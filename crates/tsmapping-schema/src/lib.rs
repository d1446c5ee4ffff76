//! Mapping tree, routing_path matching and index-creation validation for
//! time-series indices.

pub mod build;
pub mod error;
pub mod node;
pub mod routing;
pub mod types;
pub mod validate;
pub mod visit;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        node::*,
        routing::{Pattern, RoutingPath},
        types::{DynamicMode, FieldType, IndexMode, MetricKind},
    };
    pub use derive_more::Display;
    pub use serde::{Deserialize, Serialize};
}
