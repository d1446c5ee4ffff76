//! Index registry and request entry points.

mod bulk;
mod index;
mod settings;

pub use bulk::{BulkAction, BulkItem, BulkOp, BulkRequest, BulkResponse};
pub use index::{Index, IndexedDocument};
pub use settings::IndexSettings;

use crate::error::{Error, ErrorOrigin};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
    time::Instant,
};
use tsmapping_config::Config;
use tsmapping_schema::{build::parse_mapping, node::Mapping};

///
/// Db
///
/// Registry of named indices. Index creation is all-or-nothing: a rejected
/// request leaves no partial index behind.
///

#[derive(Debug, Default)]
pub struct Db {
    config: Config,
    indices: RwLock<BTreeMap<String, Arc<Index>>>,
}

impl Db {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            indices: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // create_index
    pub fn create_index(&self, name: &str, body: &Value) -> Result<Arc<Index>, Error> {
        check_index_name(name)?;
        if self.contains(name)? {
            return Err(Error::index_exists(name));
        }

        let empty = Map::new();
        let body = match body {
            Value::Null => &empty,
            Value::Object(body) => body,
            _ => return Err(Error::request("create index body must be an object")),
        };

        let settings = IndexSettings::parse(
            settings_section(body)?.as_ref(),
            &self.config.index,
        )?;
        let mapping = match body.get("mappings") {
            None | Some(Value::Null) => self.default_mapping(),
            Some(value) => {
                let mut mapping = parse_mapping(value)?;
                if value.get("date_detection").is_none() {
                    mapping.date_detection = self.config.index.date_detection;
                }
                mapping
            }
        };

        let index = Arc::new(Index::create(
            name,
            settings,
            mapping,
            self.config.validation.strategy,
        )?);

        let mut indices = self
            .indices
            .write()
            .map_err(|_| Error::lock_poisoned(ErrorOrigin::Registry))?;
        if indices.contains_key(name) {
            return Err(Error::index_exists(name));
        }
        indices.insert(name.to_string(), Arc::clone(&index));

        tracing::info!(
            index = name,
            mode = %index.settings().mode,
            shards = index.settings().number_of_shards,
            "index created"
        );

        Ok(index)
    }

    fn default_mapping(&self) -> Mapping {
        let mut mapping = Mapping::default();
        mapping.date_detection = self.config.index.date_detection;

        mapping
    }

    pub fn index(&self, name: &str) -> Result<Arc<Index>, Error> {
        self.indices
            .read()
            .map_err(|_| Error::lock_poisoned(ErrorOrigin::Registry))?
            .get(name)
            .cloned()
            .ok_or_else(|| Error::index_not_found(name))
    }

    fn contains(&self, name: &str) -> Result<bool, Error> {
        Ok(self
            .indices
            .read()
            .map_err(|_| Error::lock_poisoned(ErrorOrigin::Registry))?
            .contains_key(name))
    }

    pub fn delete_index(&self, name: &str) -> Result<(), Error> {
        let removed = self
            .indices
            .write()
            .map_err(|_| Error::lock_poisoned(ErrorOrigin::Registry))?
            .remove(name);

        match removed {
            Some(_) => {
                tracing::info!(index = name, "index deleted");
                Ok(())
            }
            None => Err(Error::index_not_found(name)),
        }
    }

    pub fn index_names(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .indices
            .read()
            .map_err(|_| Error::lock_poisoned(ErrorOrigin::Registry))?
            .keys()
            .cloned()
            .collect())
    }

    /// Parse and run a newline-delimited bulk body.
    pub fn bulk_ndjson(&self, body: &str, default_index: Option<&str>) -> Result<BulkResponse, Error> {
        let request = BulkRequest::from_ndjson(body, default_index)?;

        self.bulk(&request)
    }

    // bulk
    // Items are independent; the response keeps request order.
    pub fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse, Error> {
        let max = self.config.bulk.max_actions;
        if request.len() > max {
            return Err(Error::request(format!(
                "bulk request has [{}] actions, more than the limit of [{max}]",
                request.len()
            )));
        }

        let started = Instant::now();
        let run = |action: &BulkAction| self.execute(action);
        let items: Vec<BulkItem> = if self.config.bulk.parallel {
            request.actions.par_iter().map(run).collect()
        } else {
            request.actions.iter().map(run).collect()
        };
        let took = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = BulkResponse::new(took, items);
        tracing::debug!(
            actions = request.len(),
            failures = response.failures(),
            took,
            "bulk complete"
        );

        Ok(response)
    }

    fn execute(&self, action: &BulkAction) -> BulkItem {
        let result = self
            .index(&action.index)
            .and_then(|index| index.index_document(action.id.as_deref(), &action.source));

        if let Err(err) = &result {
            tracing::debug!(
                index = %action.index,
                error = %err.display_with_class(),
                "document rejected"
            );
        }

        BulkItem {
            op: action.op,
            index: action.index.clone(),
            result,
            requested_id: action.id.clone(),
        }
    }

    /// Check a search body against the target index.
    pub fn check_search(&self, name: &str, body: &Value) -> Result<(), Error> {
        self.index(name)?.check_search(body)
    }
}

// settings_section
// `settings` may be given explicitly or inline next to `mappings`.
fn settings_section(body: &Map<String, Value>) -> Result<Option<Value>, Error> {
    const SECTIONS: [&str; 3] = ["aliases", "mappings", "settings"];

    if let Some(settings) = body.get("settings") {
        if let Some(key) = body.keys().find(|key| !SECTIONS.contains(&key.as_str())) {
            return Err(Error::request(format!(
                "unknown key [{key}] for create index"
            )));
        }

        return Ok(Some(settings.clone()));
    }

    let inline: Map<String, Value> = body
        .iter()
        .filter(|(key, _)| !SECTIONS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok((!inline.is_empty()).then_some(Value::Object(inline)))
}

fn check_index_name(name: &str) -> Result<(), Error> {
    const FORBIDDEN: [char; 11] = ['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#'];

    let invalid = |reason: &str| Err(Error::request(format!("Invalid index name [{name}], {reason}")));

    if name.is_empty() || name == "." || name == ".." {
        return invalid("must not be empty, '.' or '..'");
    }
    if name.starts_with(['_', '-', '+']) {
        return invalid("must not start with '_', '-', or '+'");
    }
    if name.chars().any(char::is_uppercase) {
        return invalid("must be lowercase");
    }
    if name.contains(FORBIDDEN) {
        return invalid("must not contain the following characters [\\, /, *, ?, \", <, >, |, ' ', ',', #]");
    }

    Ok(())
}
