use super::field::{parse_field_type, parse_metric};
use crate::{error::MappingError, prelude::*, routing::Pattern};
use serde_json::{Map, Value};

/// Parse `dynamic_templates`: an array of single-entry objects keyed by template name.
pub fn parse_dynamic_templates(value: &Value) -> Result<Vec<DynamicTemplate>, MappingError> {
    let entries = value
        .as_array()
        .ok_or_else(|| MappingError::malformed("[dynamic_templates] must be an array"))?;

    let mut templates = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry
            .as_object()
            .filter(|entry| entry.len() == 1)
            .ok_or_else(|| {
                MappingError::malformed("each dynamic template must be an object with a single name")
            })?;

        for (name, body) in entry {
            templates.push(parse_template(name, body)?);
        }
    }

    Ok(templates)
}

// parse_template
fn parse_template(name: &str, body: &Value) -> Result<DynamicTemplate, MappingError> {
    let body = body.as_object().ok_or_else(|| {
        MappingError::malformed(format!("dynamic template [{name}] must be an object"))
    })?;

    let pattern = |key: &str| -> Result<Option<Pattern>, MappingError> {
        body.get(key)
            .map(|raw| {
                let raw = raw.as_str().ok_or_else(|| {
                    MappingError::malformed(format!(
                        "[{key}] of dynamic template [{name}] must be a string"
                    ))
                })?;
                Pattern::parse(raw).map_err(|err| {
                    MappingError::malformed(format!("dynamic template [{name}]: {err}"))
                })
            })
            .transpose()
    };

    let match_name = pattern("match")?;
    let path_match = pattern("path_match")?;
    let match_mapping_type = match body.get("match_mapping_type").and_then(Value::as_str) {
        None | Some("*") => None,
        Some(raw) => Some(raw.parse::<ValueKind>().map_err(|raw| {
            MappingError::malformed(format!(
                "No mapping type found for [match_mapping_type] [{raw}] in dynamic template [{name}]"
            ))
        })?),
    };

    let target = match (body.get("mapping"), body.get("runtime")) {
        (Some(mapping), None) => parse_mapped_target(name, mapping)?,
        (None, Some(runtime)) => parse_runtime_target(name, runtime)?,
        _ => {
            return Err(MappingError::malformed(format!(
                "dynamic template [{name}] must define exactly one of [mapping] or [runtime]"
            )));
        }
    };

    Ok(DynamicTemplate {
        name: name.to_string(),
        match_name,
        path_match,
        match_mapping_type,
        target,
    })
}

// parse_mapped_target
fn parse_mapped_target(name: &str, mapping: &Value) -> Result<TemplateTarget, MappingError> {
    let mapping = object(name, mapping)?;
    let ty = template_type(name, mapping)?;
    let dimension = mapping
        .get("time_series_dimension")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let metric = match mapping.get("time_series_metric") {
        Some(value) => parse_metric(value, name)?,
        None => None,
    };

    if let Some(ty) = ty {
        let unknown = |param: &str| MappingError::UnknownParameter {
            path: name.to_string(),
            param: param.to_string(),
            ty: ty.to_string(),
        };
        if dimension && !ty.supports_dimension() {
            return Err(unknown("time_series_dimension"));
        }
        if metric.is_some() && !ty.supports_metric() {
            return Err(unknown("time_series_metric"));
        }
    }
    if dimension && metric.is_some() {
        return Err(MappingError::DimensionWithMetric {
            path: name.to_string(),
        });
    }

    Ok(TemplateTarget::Mapped {
        ty,
        dimension,
        metric,
    })
}

// parse_runtime_target
fn parse_runtime_target(name: &str, runtime: &Value) -> Result<TemplateTarget, MappingError> {
    let runtime = object(name, runtime)?;
    let ty = template_type(name, runtime)?;

    if let Some(ty) = ty.filter(|ty| !ty.supports_runtime()) {
        return Err(MappingError::UnknownType {
            path: name.to_string(),
            ty: ty.to_string(),
        });
    }

    Ok(TemplateTarget::Runtime { ty })
}

fn object<'a>(name: &str, value: &'a Value) -> Result<&'a Map<String, Value>, MappingError> {
    value.as_object().ok_or_else(|| {
        MappingError::malformed(format!("dynamic template [{name}] has a malformed mapping"))
    })
}

fn template_type(name: &str, def: &Map<String, Value>) -> Result<Option<FieldType>, MappingError> {
    def.get("type")
        .and_then(Value::as_str)
        .map(|raw| parse_field_type(raw, name))
        .transpose()
}
