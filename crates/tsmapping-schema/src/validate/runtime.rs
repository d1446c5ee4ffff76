use crate::{
    error::{DimensionViolation, ValidationError},
    node::RuntimeField,
    routing::RoutingPath,
};

/// A runtime field declared in the mapping cannot serve as a routing field.
pub fn check_mapping_runtime_field(
    routing: &RoutingPath,
    field: &RuntimeField,
) -> Result<(), ValidationError> {
    if routing.matches(&field.path) {
        return Err(ValidationError::invalid_dimension(
            field.path.clone(),
            DimensionViolation::Runtime(field.ty.to_string()),
        ));
    }

    Ok(())
}

/// Search-time runtime fields may not shadow anything the routing path selects.
pub fn check_search_runtime_fields<'a, I>(
    routing: &RoutingPath,
    paths: I,
) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    match paths.into_iter().find(|path| routing.matches(path)) {
        Some(path) => Err(ValidationError::RuntimeFieldMatchesRoutingPath {
            path: path.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn search_runtime_field_matching_routing_path_fails() {
        let routing = RoutingPath::new(["dim.*"]).expect("routing");

        assert!(check_search_runtime_fields(&routing, ["tx_kb", "day"]).is_ok());

        let err = check_search_runtime_fields(&routing, ["tx_kb", "dim.made_up"])
            .expect_err("collides with routing path");
        assert_eq!(
            err.to_string(),
            "runtime fields may not match [routing_path] but [dim.made_up] matched"
        );
    }

    #[test]
    fn mapping_runtime_field_reports_its_type() {
        let routing = RoutingPath::new(["uid"]).expect("routing");
        let field = RuntimeField::new("uid", FieldType::Keyword);

        let err = check_mapping_runtime_field(&routing, &field).expect_err("runtime routing field");
        assert!(err.to_string().ends_with("[uid] was a runtime [keyword]."));
    }
}
