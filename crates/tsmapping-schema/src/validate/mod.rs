//! Index-creation validation of a mapping against its routing path.

mod dimension;
mod runtime;

pub use dimension::{check_dimension_leaf, check_matched_field};
pub use runtime::{check_mapping_runtime_field, check_search_runtime_fields};

use crate::{
    error::{ValidationError, ValidationErrors},
    node::{Mapping, MappingNode},
    routing::RoutingPath,
    types::{DynamicMode, IndexMode},
    visit::{collect_matching_leaves, nested_dimension_paths},
};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;

///
/// ValidationStrategy
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStrategy {
    /// Stop at the first violation in mapping definition order.
    #[default]
    FailFast,

    /// Report every violation, still in definition order.
    CollectAll,
}

///
/// Sink
/// Collects violations and tells the caller when to stop.
///

struct Sink {
    strategy: ValidationStrategy,
    errors: ValidationErrors,
}

impl Sink {
    fn report(&mut self, result: Result<(), ValidationError>) -> ControlFlow<()> {
        let Err(err) = result else {
            return ControlFlow::Continue(());
        };
        self.errors.add(err);

        match self.strategy {
            ValidationStrategy::FailFast => ControlFlow::Break(()),
            ValidationStrategy::CollectAll => ControlFlow::Continue(()),
        }
    }
}

/// Validate at index creation and fail on the first violation.
pub fn validate_index(
    mode: IndexMode,
    routing: Option<&RoutingPath>,
    mapping: &Mapping,
) -> Result<(), ValidationError> {
    match validate_index_with(mode, routing, mapping, ValidationStrategy::FailFast) {
        Ok(()) => Ok(()),
        Err(errors) => match errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        },
    }
}

/// Validate at index creation with an explicit strategy.
pub fn validate_index_with(
    mode: IndexMode,
    routing: Option<&RoutingPath>,
    mapping: &Mapping,
    strategy: ValidationStrategy,
) -> Result<(), ValidationErrors> {
    let mut sink = Sink {
        strategy,
        errors: ValidationErrors::new(),
    };

    let _ = run(mode, routing, mapping, &mut sink);

    if let Some(first) = sink.errors.first() {
        tracing::debug!(
            %mode,
            violations = sink.errors.len(),
            path = first.path(),
            kind = %first.kind(),
            "mapping rejected"
        );
    }

    sink.errors.result()
}

// run
fn run(
    mode: IndexMode,
    routing: Option<&RoutingPath>,
    mapping: &Mapping,
    sink: &mut Sink,
) -> ControlFlow<()> {
    // Phase 1: time-series indices cannot hold nested documents at all.
    if mode.is_time_series() {
        sink.report(check_no_nested(mapping))?;
    }

    // Phase 2: dimension flags below a nested object, whatever the mode.
    for path in nested_dimension_paths(mapping) {
        sink.report(Err(ValidationError::DimensionInNestedField { path }))?;
    }

    let Some(routing) = routing else {
        return ControlFlow::Continue(());
    };

    // Phase 3: every declared field the routing path selects.
    for matched in collect_matching_leaves(mapping, routing) {
        sink.report(check_matched_field(&matched))?;
    }

    // Phase 4: literal patterns that can never be mapped.
    for path in routing.exact_paths() {
        sink.report(check_literal_path_mapped(mapping, path))?;
    }

    // Phase 5: runtime section of the mapping.
    for field in &mapping.runtime {
        sink.report(check_mapping_runtime_field(routing, field))?;
    }

    ControlFlow::Continue(())
}

fn check_no_nested(mapping: &Mapping) -> Result<(), ValidationError> {
    match mapping.first_nested_path() {
        Some(path) => Err(ValidationError::NestedFieldsForbidden { path }),
        None => Ok(()),
    }
}

// A literal routing field that is undeclared below a `dynamic: false` object
// can never be mapped by a document.
fn check_literal_path_mapped(mapping: &Mapping, path: &str) -> Result<(), ValidationError> {
    if mapping.resolve(path).is_some() || mapping.runtime_field(path).is_some() {
        return Ok(());
    }

    let segments: Vec<&str> = path.split('.').collect();
    let lookup = mapping.effective_dynamic(&segments);
    let parent_is_object = lookup.declared == 0
        || matches!(
            mapping.resolve_segments(&segments[..lookup.declared]),
            Some(MappingNode::Object(_) | MappingNode::Nested(_))
        );

    if parent_is_object && lookup.mode == DynamicMode::False {
        return Err(ValidationError::UnmappedDynamicFalseField {
            path: path.to_string(),
        });
    }

    Ok(())
}
