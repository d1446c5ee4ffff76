//! Turn a JSON mapping definition into a [`Mapping`] tree.

mod field;
mod template;

use crate::{error::MappingError, prelude::*};
use serde_json::{Map, Value};

pub(crate) use field::{parse_field_type, parse_leaf};
pub use template::parse_dynamic_templates;

/// Root keys that carry no meaning for validation but are legal.
const IGNORED_ROOT_KEYS: &[&str] = &["_source", "_meta", "_routing", "numeric_detection"];

/// Parse a full mapping definition (`{"properties": .., "runtime": .., ..}`).
///
/// `null` and `{}` both yield an empty mapping with `dynamic: true`.
pub fn parse_mapping(value: &Value) -> Result<Mapping, MappingError> {
    let root = match value {
        Value::Null => return Ok(Mapping::default()),
        Value::Object(map) => map,
        other => {
            return Err(MappingError::malformed(format!(
                "expected an object for the root mapping but got [{}]",
                json_kind(other)
            )));
        }
    };

    let mut mapping = Mapping::default();
    let mut path = Vec::new();

    for (key, def) in root {
        match key.as_str() {
            "dynamic" => mapping.root.dynamic = Some(parse_dynamic(def, "_doc")?),
            "properties" => mapping.root.fields = parse_properties(def, &mut path)?,
            "runtime" => mapping.runtime = parse_runtime_section(def)?,
            "dynamic_templates" => mapping.dynamic_templates = parse_dynamic_templates(def)?,
            "date_detection" => {
                mapping.date_detection = def.as_bool().ok_or_else(|| {
                    MappingError::malformed("[date_detection] must be a boolean")
                })?;
            }
            key if IGNORED_ROOT_KEYS.contains(&key) => {}
            key => {
                return Err(MappingError::malformed(format!(
                    "Root mapping definition has unsupported parameters: [{key}]"
                )));
            }
        }
    }

    tracing::debug!(
        fields = mapping.leaf_count(),
        runtime = mapping.runtime.len(),
        templates = mapping.dynamic_templates.len(),
        "parsed mapping"
    );

    Ok(mapping)
}

/// `dynamic` accepts booleans and the strings `true|false|runtime|strict`.
pub(crate) fn parse_dynamic(value: &Value, path: &str) -> Result<DynamicMode, MappingError> {
    let parsed = match value {
        Value::Bool(true) => Ok(DynamicMode::True),
        Value::Bool(false) => Ok(DynamicMode::False),
        Value::String(s) => s.parse::<DynamicMode>(),
        other => Err(other.to_string()),
    };

    parsed.map_err(|raw| {
        MappingError::malformed(format!(
            "Unknown value [{raw}] for [dynamic] on [{path}], accepted values are [true, false, runtime, strict]"
        ))
    })
}

// parse_properties
fn parse_properties(value: &Value, path: &mut Vec<String>) -> Result<FieldList, MappingError> {
    let props = value.as_object().ok_or_else(|| {
        MappingError::malformed(format!(
            "expected an object for [properties] on [{}]",
            render_parent(path)
        ))
    })?;

    let mut list = FieldList::new();
    for (key, def) in props {
        let segments = split_field_name(key)?;
        let depth = path.len();
        path.extend(segments.iter().map(ToString::to_string));
        let node = parse_field(def, path);
        path.truncate(depth);

        place(&mut list, &segments, node?, path)?;
    }

    Ok(list)
}

// A dotted property name is shorthand for a chain of objects. Definitions
// that reach the same object from both spellings are merged.
fn place(
    list: &mut FieldList,
    segments: &[&str],
    node: MappingNode,
    parent: &[String],
) -> Result<(), MappingError> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(());
    };

    let mut path = parent.to_vec();
    path.push((*first).to_string());

    if rest.is_empty() {
        return match list.get_mut(first) {
            Some(field) => merge(&mut field.node, node, &path),
            None => {
                list.insert(*first, node);
                Ok(())
            }
        };
    }

    if list.get(first).is_none() {
        list.insert(*first, MappingNode::Object(Object::new()));
    }
    let Some(field) = list.get_mut(first) else {
        return Ok(());
    };
    let type_name = field.node.type_name();
    let child = field
        .node
        .as_object_mut()
        .ok_or_else(|| conflict(&path, type_name, "object"))?;

    place(&mut child.fields, rest, node, &path)
}

// merge
fn merge(
    existing: &mut MappingNode,
    node: MappingNode,
    path: &[String],
) -> Result<(), MappingError> {
    match (existing, node) {
        (MappingNode::Object(into), MappingNode::Object(from))
        | (MappingNode::Nested(into), MappingNode::Nested(from)) => {
            if from.dynamic.is_some() {
                into.dynamic = from.dynamic;
            }
            for field in from.fields.fields {
                let segments = [field.name.as_str()];
                place(&mut into.fields, &segments, field.node, path)?;
            }

            Ok(())
        }
        (existing, node) if *existing == node => Ok(()),
        (existing, node) => Err(conflict(path, existing.type_name(), &node.type_name())),
    }
}

fn conflict(path: &[String], from: String, to: &str) -> MappingError {
    MappingError::Conflict {
        path: path.join("."),
        from,
        to: to.to_string(),
    }
}

// parse_field
fn parse_field(value: &Value, path: &mut Vec<String>) -> Result<MappingNode, MappingError> {
    let full_path = path.join(".");
    let def = value.as_object().ok_or_else(|| {
        MappingError::malformed(format!(
            "expected an object for field [{full_path}] but got [{}]",
            json_kind(value)
        ))
    })?;

    let ty = match def.get("type") {
        None => "object",
        Some(Value::String(ty)) => ty.as_str(),
        Some(other) => {
            return Err(MappingError::malformed(format!(
                "[type] on field [{full_path}] must be a string but got [{}]",
                json_kind(other)
            )));
        }
    };

    match ty {
        "object" => Ok(MappingNode::Object(parse_object(def, path, "object")?)),
        "nested" => Ok(MappingNode::Nested(parse_object(def, path, "nested")?)),
        other => {
            let ty = parse_field_type(other, &full_path)?;
            Ok(MappingNode::Leaf(parse_leaf(ty, def, &full_path)?))
        }
    }
}

// parse_object
fn parse_object(
    def: &Map<String, Value>,
    path: &mut Vec<String>,
    ty: &str,
) -> Result<Object, MappingError> {
    let mut object = Object::new();

    for (key, value) in def {
        match key.as_str() {
            "type" | "enabled" => {}
            "dynamic" => object.dynamic = Some(parse_dynamic(value, &path.join("."))?),
            "properties" => object.fields = parse_properties(value, path)?,
            param => {
                return Err(MappingError::UnknownParameter {
                    path: path.join("."),
                    param: param.to_string(),
                    ty: ty.to_string(),
                });
            }
        }
    }

    Ok(object)
}

// parse_runtime_section
fn parse_runtime_section(value: &Value) -> Result<Vec<RuntimeField>, MappingError> {
    let section = value
        .as_object()
        .ok_or_else(|| MappingError::malformed("expected an object for [runtime]"))?;

    section
        .iter()
        .map(|(name, def)| parse_runtime_field(name, def))
        .collect()
}

/// Parse one runtime field definition (`{"type": "keyword", "script": ..}`).
pub fn parse_runtime_field(name: &str, def: &Value) -> Result<RuntimeField, MappingError> {
    split_field_name(name)?;

    let def = def.as_object().ok_or_else(|| {
        MappingError::malformed(format!("expected an object for runtime field [{name}]"))
    })?;
    let ty = def
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| MappingError::malformed(format!("No type specified for field [{name}]")))?;
    let ty = parse_field_type(ty, name)?;

    if !ty.supports_runtime() {
        return Err(MappingError::UnknownType {
            path: name.to_string(),
            ty: ty.to_string(),
        });
    }

    let script = match def.get("script") {
        None | Some(Value::Null) => None,
        Some(script) => Some(field::script_source(script, name, ty)?),
    };

    Ok(RuntimeField {
        path: name.to_string(),
        ty,
        script,
    })
}

// split_field_name
pub(crate) fn split_field_name(name: &str) -> Result<Vec<&str>, MappingError> {
    if name.is_empty() {
        return Err(MappingError::malformed("field name cannot be an empty string"));
    }

    let segments: Vec<&str> = name.split('.').collect();
    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(MappingError::malformed(format!(
            "field name [{name}] cannot contain only whitespace or empty path segments"
        )));
    }

    Ok(segments)
}

fn render_parent(path: &[String]) -> String {
    if path.is_empty() {
        "_doc".to_string()
    } else {
        path.join(".")
    }
}

pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_objects_leaves_and_flags() {
        let mapping = parse_mapping(&json!({
            "properties": {
                "@timestamp": { "type": "date" },
                "metricset": { "type": "keyword", "time_series_dimension": true },
                "k8s": {
                    "properties": {
                        "pod": {
                            "dynamic": false,
                            "properties": {
                                "uid": { "type": "keyword", "time_series_dimension": true },
                                "network": {
                                    "properties": {
                                        "tx": { "type": "long", "time_series_metric": "counter" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }))
        .expect("valid mapping");

        let names: Vec<&str> = mapping.root.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["@timestamp", "metricset", "k8s"]);
        assert!(matches!(
            mapping.resolve("k8s.pod.network.tx"),
            Some(MappingNode::Leaf(Leaf { metric: Some(MetricKind::Counter), .. }))
        ));
        assert_eq!(
            mapping.effective_dynamic(&["k8s", "pod", "x"]).mode,
            DynamicMode::False
        );
    }

    #[test]
    fn dotted_names_expand_into_objects() {
        let mapping = parse_mapping(&json!({
            "properties": {
                "dim.foo": { "type": "keyword", "time_series_dimension": true },
                "dim.bar": { "type": "keyword" }
            }
        }))
        .expect("valid mapping");

        let dim = mapping.resolve("dim").and_then(MappingNode::as_object);
        assert_eq!(dim.map(|o| o.fields.len()), Some(2));
        assert!(mapping.resolve("dim.foo").is_some());
    }

    #[test]
    fn dotted_and_plain_spellings_merge_in_either_order() {
        let dotted_first = json!({
            "properties": {
                "dim.foo": { "type": "keyword", "time_series_dimension": true },
                "dim": { "properties": { "bar": { "type": "keyword" } } }
            }
        });
        let plain_first = json!({
            "properties": {
                "dim": { "dynamic": false, "properties": { "bar": { "type": "keyword" } } },
                "dim.foo": { "type": "keyword", "time_series_dimension": true }
            }
        });

        for value in [dotted_first, plain_first] {
            let mapping = parse_mapping(&value).expect("valid mapping");

            assert!(matches!(
                mapping.resolve("dim.foo"),
                Some(MappingNode::Leaf(Leaf { dimension: true, .. }))
            ));
            assert!(mapping.resolve("dim.bar").is_some());
        }
    }

    #[test]
    fn dotted_spelling_cannot_turn_a_leaf_into_an_object() {
        let err = parse_mapping(&json!({
            "properties": {
                "dim.foo": { "type": "keyword" },
                "dim": { "properties": { "foo": { "type": "long" } } }
            }
        }))
        .expect_err("keyword then long");
        assert_eq!(
            err.to_string(),
            "mapper [dim.foo] cannot be changed from type [keyword] to [long]"
        );

        let err = parse_mapping(&json!({
            "properties": {
                "dim": { "type": "keyword" },
                "dim.foo": { "type": "keyword" }
            }
        }))
        .expect_err("leaf then object");
        assert!(matches!(err, MappingError::Conflict { .. }));
    }

    #[test]
    fn nested_type_is_kept_distinct() {
        let mapping = parse_mapping(&json!({
            "properties": {
                "nested": {
                    "type": "nested",
                    "properties": { "foo": { "type": "keyword" } }
                }
            }
        }))
        .expect("valid mapping");

        assert!(mapping.has_nested());
        assert_eq!(mapping.first_nested_path().as_deref(), Some("nested"));
    }

    #[test]
    fn rejects_unknown_types_and_root_parameters() {
        assert_eq!(
            parse_mapping(&json!({ "properties": { "loc": { "type": "geo_shape" } } })),
            Err(MappingError::UnknownType {
                path: "loc".to_string(),
                ty: "geo_shape".to_string()
            })
        );

        let err = parse_mapping(&json!({ "bogus": true })).expect_err("unsupported root key");
        assert_eq!(
            err.to_string(),
            "Failed to parse mapping: Root mapping definition has unsupported parameters: [bogus]"
        );
    }

    #[test]
    fn parses_runtime_section_and_dynamic_strings() {
        let mapping = parse_mapping(&json!({
            "dynamic": "runtime",
            "runtime": {
                "day_of_week": { "type": "keyword", "script": { "source": "emit('x')" } }
            }
        }))
        .expect("valid mapping");

        assert_eq!(mapping.root_dynamic(), DynamicMode::Runtime);
        let field = mapping.runtime_field("day_of_week").expect("runtime field");
        assert_eq!(field.ty, FieldType::Keyword);
        assert_eq!(field.script.as_deref(), Some("emit('x')"));

        assert!(parse_mapping(&json!({ "dynamic": "sometimes" })).is_err());
    }
}
