//! Runtime side of tsmapping: index registry, settings, ingestion-time
//! field checks, routing and bulk handling.

pub mod db;
pub mod error;
pub mod ingest;
pub mod query;
pub mod routing;

pub use error::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        db::{BulkRequest, BulkResponse, Db, Index, IndexSettings, IndexedDocument},
        ingest::{DynamicFieldEvent, FieldOrigin},
        routing::RoutingKey,
    };
}
