//! Search-request checks against an index's routing path.

use crate::error::{Error, ErrorOrigin};
use serde_json::Value;
use tsmapping_schema::{
    build::parse_runtime_field, node::RuntimeField, routing::RoutingPath,
    validate::check_search_runtime_fields,
};

///
/// SearchRequest
/// The parts of a search body that can collide with the routing path.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchRequest {
    pub runtime_mappings: Vec<RuntimeField>,
}

impl SearchRequest {
    /// Read `runtime_mappings` from a search body; other keys are ignored.
    pub fn from_json(body: &Value) -> Result<Self, Error> {
        let body = match body {
            Value::Null => return Ok(Self::default()),
            Value::Object(body) => body,
            _ => return Err(Error::request("search request body must be an object")),
        };

        let runtime_mappings = match body.get("runtime_mappings") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(fields)) => fields
                .iter()
                .map(|(name, def)| parse_runtime_field(name, def))
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(Error::request("[runtime_mappings] must be an object")),
        };

        Ok(Self { runtime_mappings })
    }

    /// Fails when any search-time runtime field matches the routing path.
    pub fn check(&self, routing: Option<&RoutingPath>) -> Result<(), Error> {
        let Some(routing) = routing else {
            return Ok(());
        };

        check_search_runtime_fields(
            routing,
            self.runtime_mappings.iter().map(|field| field.path.as_str()),
        )
        .map_err(|err| Error::from_validation(ErrorOrigin::Query, err))
    }
}
