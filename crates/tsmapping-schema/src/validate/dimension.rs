use crate::{
    error::{DimensionViolation, ValidationError},
    node::{Leaf, MappingNode},
    types::FieldType,
    visit::MatchedField,
};

/// Check one field selected by the routing path at index creation.
pub fn check_matched_field(matched: &MatchedField<'_>) -> Result<(), ValidationError> {
    match matched.node {
        MappingNode::Object(_) | MappingNode::Nested(_) => Err(ValidationError::invalid_dimension(
            matched.path.clone(),
            DimensionViolation::Object,
        )),
        MappingNode::Leaf(leaf) => check_dimension_leaf(&matched.path, leaf),
    }
}

/// A routing field must be a scriptless keyword flagged as a dimension.
pub fn check_dimension_leaf(path: &str, leaf: &Leaf) -> Result<(), ValidationError> {
    if leaf.is_routable() {
        return Ok(());
    }

    let violation = if leaf.ty != FieldType::Keyword {
        DimensionViolation::WrongType(leaf.ty.to_string())
    } else if !leaf.dimension {
        DimensionViolation::NotDimension
    } else {
        DimensionViolation::Script
    };

    Err(ValidationError::invalid_dimension(path, violation))
}
