use crate::{
    db::settings::IndexSettings,
    error::{Error, ErrorOrigin},
    ingest::{
        DocumentError, DynamicFieldEvent, FieldOrigin, check_events, scan_document,
    },
    query::SearchRequest,
    routing::{RoutingKey, extract, shard_for_id},
};
use serde_json::Value;
use std::sync::{
    RwLock, RwLockReadGuard,
    atomic::{AtomicU64, Ordering},
};
use tsmapping_schema::{
    node::{Mapping, RuntimeField},
    validate::{ValidationStrategy, validate_index_with},
};
use xxhash_rust::xxh3::xxh3_64_with_seed;

///
/// Index
///
/// A named index: immutable settings plus a mapping that grows as documents
/// introduce new fields. Readers scan against a shared snapshot; updates are
/// applied under the write lock all-or-nothing per document.
///

#[derive(Debug)]
pub struct Index {
    name: String,
    settings: IndexSettings,
    mapping: RwLock<Mapping>,
    mapping_version: AtomicU64,
}

///
/// IndexedDocument
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexedDocument {
    pub id: String,
    pub shard: u32,
    pub routing: Option<RoutingKey>,

    /// Fields this document added to the mapping.
    pub new_fields: usize,
}

impl Index {
    /// Validate the mapping against the settings and build the index.
    pub fn create(
        name: impl Into<String>,
        settings: IndexSettings,
        mapping: Mapping,
        strategy: ValidationStrategy,
    ) -> Result<Self, Error> {
        validate_index_with(
            settings.mode,
            settings.routing_path.as_ref(),
            &mapping,
            strategy,
        )
        .map_err(|errs| Error::from_validation_errors(ErrorOrigin::Mapping, errs))?;

        Ok(Self {
            name: name.into(),
            settings,
            mapping: RwLock::new(mapping),
            mapping_version: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Snapshot of the current mapping.
    pub fn mapping(&self) -> Result<Mapping, Error> {
        Ok(self.read_mapping()?.clone())
    }

    /// Bumped once per document that changed the mapping.
    #[must_use]
    pub fn mapping_version(&self) -> u64 {
        self.mapping_version.load(Ordering::Acquire)
    }

    fn read_mapping(&self) -> Result<RwLockReadGuard<'_, Mapping>, Error> {
        self.mapping
            .read()
            .map_err(|_| Error::lock_poisoned(ErrorOrigin::Ingest))
    }

    // index_document
    pub fn index_document(&self, id: Option<&str>, source: &Value) -> Result<IndexedDocument, Error> {
        let doc = source.as_object().ok_or_else(|| {
            DocumentError::Malformed("document source must be a JSON object".to_string())
        })?;

        // Phase 1: find the fields this document introduces.
        let events = {
            let mapping = self.read_mapping()?;
            scan_document(&mapping, doc)?
        };

        // Phase 2: new fields may not break the routing_path rules.
        if let Some(routing) = &self.settings.routing_path {
            check_events(routing, &events).map_err(DocumentError::from)?;
        }

        // Phase 3: route.
        let routing = match &self.settings.routing_path {
            Some(routing) if self.settings.mode.is_time_series() => Some(extract(routing, doc)?),
            _ => None,
        };
        let id = match id {
            Some(id) => id.to_string(),
            None => generate_id(routing.as_ref(), source),
        };
        let shards = self.settings.number_of_shards;
        let shard = routing
            .as_ref()
            .map_or_else(|| shard_for_id(&id, shards), |key| key.shard(shards));

        // Phase 4: publish the mapping updates.
        let new_fields = self.apply(&events)?;

        tracing::trace!(index = %self.name, %id, shard, new_fields, "document accepted");

        Ok(IndexedDocument {
            id,
            shard,
            routing,
            new_fields,
        })
    }

    // apply
    // Stage every update on a copy so a conflict leaves the mapping untouched.
    fn apply(&self, events: &[DynamicFieldEvent]) -> Result<usize, Error> {
        if !events.iter().any(DynamicFieldEvent::updates_mapping) {
            return Ok(0);
        }

        let mut mapping = self
            .mapping
            .write()
            .map_err(|_| Error::lock_poisoned(ErrorOrigin::Ingest))?;
        let mut staged = mapping.clone();
        let mut added = 0;

        for event in events {
            let changed = match &event.origin {
                FieldOrigin::Mapped(leaf) => {
                    let segments: Vec<&str> = event.path.split('.').collect();
                    staged.insert_leaf(&segments, leaf.clone())?
                }
                FieldOrigin::Runtime => {
                    staged.add_runtime_field(RuntimeField::new(event.path.clone(), event.ty))?
                }
                FieldOrigin::Unmapped => false,
            };
            added += usize::from(changed);
        }

        if added > 0 {
            *mapping = staged;
            let version = self.mapping_version.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::debug!(index = %self.name, added, version, "mapping updated");
        }

        Ok(added)
    }

    /// Check a search body against the routing path.
    pub fn check_search(&self, body: &Value) -> Result<(), Error> {
        SearchRequest::from_json(body)?.check(self.settings.routing_path.as_ref())
    }
}

// generate_id
// Time-series ids derive from the routing hash so equal documents collide.
fn generate_id(routing: Option<&RoutingKey>, source: &Value) -> String {
    let seed = routing.map_or(0, |key| key.hash);

    format!("{:016x}", xxh3_64_with_seed(source.to_string().as_bytes(), seed))
}
