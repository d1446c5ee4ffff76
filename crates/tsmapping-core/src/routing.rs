//! Routing key extraction for time-series documents.

use crate::ingest::for_each_value;
use serde_json::{Map, Value};
use thiserror::Error as ThisError;
use tsmapping_schema::routing::RoutingPath;
use xxhash_rust::xxh3::{Xxh3, xxh3_64};

///
/// RoutingError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RoutingError {
    #[error("Error extracting routing: source didn't contain any routing fields")]
    NoRoutingFields,

    #[error("Error extracting routing: Routing values must be strings but found [{token}]")]
    NotString { path: String, token: &'static str },
}

///
/// RoutingKey
/// The routing fields of one document, sorted, and their hash.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingKey {
    pub fields: Vec<(String, String)>,
    pub hash: u64,
}

impl RoutingKey {
    /// Shard this key lands on.
    #[must_use]
    pub fn shard(&self, number_of_shards: u32) -> u32 {
        shard_for(self.hash, number_of_shards)
    }
}

/// Collect every string value selected by the routing path and hash them.
///
/// The hash only depends on the set of (path, value) pairs, not on the key
/// order inside the source.
pub fn extract(routing: &RoutingPath, doc: &Map<String, Value>) -> Result<RoutingKey, RoutingError> {
    let mut fields = Vec::new();
    let mut failure = None;

    for_each_value(doc, |path, value| {
        if failure.is_some() || !routing.matches(path) {
            return;
        }
        match value {
            Value::String(s) => fields.push((path.to_string(), s.clone())),
            other => {
                failure = Some(RoutingError::NotString {
                    path: path.to_string(),
                    token: token_name(other),
                });
            }
        }
    });

    if let Some(err) = failure {
        return Err(err);
    }
    if fields.is_empty() {
        return Err(RoutingError::NoRoutingFields);
    }

    fields.sort();

    let mut hasher = Xxh3::new();
    for (path, value) in &fields {
        hasher.update(path.as_bytes());
        hasher.update(&[0]);
        hasher.update(value.as_bytes());
        hasher.update(&[0]);
    }

    Ok(RoutingKey {
        fields,
        hash: hasher.digest(),
    })
}

/// Shard for a document routed by its id.
#[must_use]
pub fn shard_for_id(id: &str, number_of_shards: u32) -> u32 {
    shard_for(xxh3_64(id.as_bytes()), number_of_shards)
}

#[must_use]
pub fn shard_for(hash: u64, number_of_shards: u32) -> u32 {
    let shards = u64::from(number_of_shards.max(1));

    // the remainder is below number_of_shards
    u32::try_from(hash % shards).unwrap_or(0)
}

const fn token_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "VALUE_BOOLEAN",
        Value::Number(_) => "VALUE_NUMBER",
        Value::Null => "VALUE_NULL",
        Value::String(_) => "VALUE_STRING",
        Value::Array(_) => "START_ARRAY",
        Value::Object(_) => "START_OBJECT",
    }
}
