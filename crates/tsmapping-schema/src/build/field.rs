use crate::{error::MappingError, prelude::*};
use serde_json::{Map, Value};

/// Mapper parameters that are legal on every leaf but do not affect validation.
const PASSTHROUGH_PARAMS: &[&str] = &[
    "coerce",
    "doc_values",
    "fields",
    "format",
    "ignore_above",
    "ignore_malformed",
    "index",
    "meta",
    "null_value",
    "on_script_error",
    "scaling_factor",
    "store",
];

pub(crate) fn parse_field_type(raw: &str, path: &str) -> Result<FieldType, MappingError> {
    raw.parse::<FieldType>()
        .map_err(|ty| MappingError::UnknownType {
            path: path.to_string(),
            ty,
        })
}

/// Parse the parameters of a leaf mapper whose type is already known.
pub(crate) fn parse_leaf(
    ty: FieldType,
    def: &Map<String, Value>,
    path: &str,
) -> Result<Leaf, MappingError> {
    let mut leaf = Leaf::new(ty);
    let unknown = |param: &str| MappingError::UnknownParameter {
        path: path.to_string(),
        param: param.to_string(),
        ty: ty.to_string(),
    };

    for (param, value) in def {
        let param = param.as_str();
        match param {
            "type" => {}
            "time_series_dimension" => {
                if !ty.supports_dimension() {
                    return Err(unknown(param));
                }
                leaf.dimension = value.as_bool().ok_or_else(|| {
                    MappingError::malformed(format!(
                        "[time_series_dimension] on field [{path}] must be a boolean"
                    ))
                })?;
            }
            "time_series_metric" => {
                if !ty.supports_metric() {
                    return Err(unknown(param));
                }
                leaf.metric = parse_metric(value, path)?;
            }
            "script" => {
                if !ty.supports_runtime() {
                    return Err(unknown(param));
                }
                leaf.script = Some(script_source(value, path, ty)?);
            }
            other if PASSTHROUGH_PARAMS.contains(&other) => {}
            other => return Err(unknown(other)),
        }
    }

    if leaf.dimension && leaf.metric.is_some() {
        return Err(MappingError::DimensionWithMetric {
            path: path.to_string(),
        });
    }

    Ok(leaf)
}

pub(crate) fn parse_metric(value: &Value, path: &str) -> Result<Option<MetricKind>, MappingError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => raw
            .parse::<MetricKind>()
            .map(Some)
            .map_err(|value| MappingError::UnknownMetric {
                path: path.to_string(),
                value,
            }),
        other => Err(MappingError::UnknownMetric {
            path: path.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Scripts may be given inline as a string or as `{"source": ..}`.
pub(crate) fn script_source(
    value: &Value,
    path: &str,
    ty: FieldType,
) -> Result<String, MappingError> {
    let source = match value {
        Value::String(source) => Some(source.clone()),
        Value::Object(script) => script
            .get("source")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        _ => None,
    };

    source.ok_or_else(|| {
        MappingError::malformed(format!(
            "[script] on field [{path}] of type [{ty}] must be a string or an object with [source]"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(ty: FieldType, def: &Value) -> Result<Leaf, MappingError> {
        parse_leaf(ty, def.as_object().expect("object"), "f")
    }

    #[test]
    fn dimension_is_only_registered_on_dimension_types() {
        assert!(leaf(FieldType::Keyword, &json!({ "time_series_dimension": true })).is_ok());
        assert_eq!(
            leaf(FieldType::Date, &json!({ "time_series_dimension": true })),
            Err(MappingError::UnknownParameter {
                path: "f".to_string(),
                param: "time_series_dimension".to_string(),
                ty: "date".to_string(),
            })
        );
    }

    #[test]
    fn metric_values_are_checked() {
        let parsed = leaf(FieldType::Double, &json!({ "time_series_metric": "gauge" }));
        assert_eq!(parsed.map(|l| l.metric), Ok(Some(MetricKind::Gauge)));

        let err = leaf(FieldType::Double, &json!({ "time_series_metric": "histogram" }))
            .expect_err("unknown metric");
        assert_eq!(
            err.to_string(),
            "Unknown value [histogram] for field [time_series_metric] - accepted values are [gauge, counter]"
        );

        assert!(matches!(
            leaf(FieldType::Keyword, &json!({ "time_series_metric": "gauge" })),
            Err(MappingError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn dimension_and_metric_are_exclusive() {
        let err = leaf(
            FieldType::Long,
            &json!({ "time_series_dimension": true, "time_series_metric": "counter" }),
        )
        .expect_err("conflicting flags");

        assert_eq!(
            err.to_string(),
            "Field [time_series_dimension] cannot be set in conjunction with field [time_series_metric]"
        );
    }

    #[test]
    fn scripts_accept_both_shapes() {
        let inline = leaf(FieldType::Keyword, &json!({ "script": "emit('a')" })).expect("inline");
        let object = leaf(
            FieldType::Keyword,
            &json!({ "script": { "source": "emit('a')", "lang": "painless" } }),
        )
        .expect("object");

        assert_eq!(inline.script, object.script);
        assert!(leaf(FieldType::Text, &json!({ "script": "emit('a')" })).is_err());
    }

    #[test]
    fn passthrough_parameters_are_accepted() {
        assert!(leaf(FieldType::Keyword, &json!({ "ignore_above": 1024, "store": true })).is_ok());
        assert!(matches!(
            leaf(FieldType::Keyword, &json!({ "analyzer_x": 1 })),
            Err(MappingError::UnknownParameter { param, .. }) if param == "analyzer_x"
        ));
    }
}
