use crate::ingest::{DynamicFieldEvent, FieldOrigin};
use tsmapping_schema::{
    error::{DimensionViolation, ValidationError},
    routing::RoutingPath,
    validate::check_dimension_leaf,
};

/// Check one newly observed field against the routing path.
///
/// Fields the routing path does not select pass untouched.
pub fn check_event(routing: &RoutingPath, event: &DynamicFieldEvent) -> Result<(), ValidationError> {
    if !routing.matches(&event.path) {
        return Ok(());
    }

    match &event.origin {
        FieldOrigin::Mapped(leaf) => check_dimension_leaf(&event.path, leaf),
        FieldOrigin::Runtime => Err(ValidationError::invalid_dimension(
            event.path.clone(),
            DimensionViolation::Runtime(event.ty.to_string()),
        )),
        FieldOrigin::Unmapped => Err(ValidationError::UnmappedDynamicFalseField {
            path: event.path.clone(),
        }),
    }
}

/// Check a document's events; the first failure in document order wins.
pub fn check_events(
    routing: &RoutingPath,
    events: &[DynamicFieldEvent],
) -> Result<(), ValidationError> {
    events.iter().try_for_each(|event| check_event(routing, event))
}
