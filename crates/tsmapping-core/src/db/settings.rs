use crate::error::Error;
use serde::Serialize;
use serde_json::{Map, Value};
use tsmapping_config::IndexConfig;
use tsmapping_schema::{routing::RoutingPath, types::IndexMode};

///
/// IndexSettings
/// Settings fixed at index creation.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndexSettings {
    pub mode: IndexMode,
    pub routing_path: Option<RoutingPath>,
    pub number_of_shards: u32,
}

impl IndexSettings {
    #[must_use]
    pub const fn new(mode: IndexMode, routing_path: Option<RoutingPath>) -> Self {
        Self {
            mode,
            routing_path,
            number_of_shards: 1,
        }
    }

    /// Parse create-index settings.
    ///
    /// Accepts `{"index": {"mode": ..}}`, `{"index.mode": ..}` and the bare
    /// `{"mode": ..}` form. Unrelated settings are ignored.
    pub fn parse(value: Option<&Value>, defaults: &IndexConfig) -> Result<Self, Error> {
        let mut flat = Map::new();
        match value {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => flatten("", map, &mut flat),
            Some(_) => return Err(Error::settings("[settings] must be an object")),
        }

        let get = |key: &str| {
            flat.get(&format!("index.{key}"))
                .or_else(|| flat.get(key))
                .filter(|value| !value.is_null())
        };

        let mode = match get("mode") {
            None => IndexMode::default(),
            Some(Value::String(raw)) => raw.parse().map_err(|_| {
                Error::settings(format!(
                    "unknown index mode [{raw}], expected one of [standard, time_series]"
                ))
            })?,
            Some(other) => {
                return Err(Error::settings(format!(
                    "[index.mode] must be a string but was [{other}]"
                )));
            }
        };

        let routing_path = get("routing_path").map(parse_routing_path).transpose()?;

        let number_of_shards = match get("number_of_shards") {
            None => defaults.number_of_shards,
            Some(value) => parse_shards(value)?,
        };

        if mode.is_time_series() && routing_path.is_none() {
            return Err(Error::settings(
                "[index.mode=time_series] requires a non-empty [index.routing_path]",
            ));
        }

        Ok(Self {
            mode,
            routing_path,
            number_of_shards,
        })
    }
}

// flatten
// Nested setting objects become dotted keys.
fn flatten(prefix: &str, map: &Map<String, Value>, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(child) => flatten(&key, child, out),
            other => {
                out.insert(key, other.clone());
            }
        }
    }
}

fn parse_routing_path(value: &Value) -> Result<RoutingPath, Error> {
    let raw: Vec<&str> = match value {
        Value::String(raw) => raw.split(',').map(str::trim).collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    Error::settings(format!(
                        "[index.routing_path] entries must be strings but found [{item}]"
                    ))
                })
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(Error::settings(format!(
                "[index.routing_path] must be a string or an array but was [{other}]"
            )));
        }
    };

    Ok(RoutingPath::new(raw)?)
}

fn parse_shards(value: &Value) -> Result<u32, Error> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse::<u32>().ok(),
        _ => None,
    };

    match parsed {
        Some(0) => Err(Error::settings(
            "Failed to parse value [0] for setting [index.number_of_shards] must be >= 1",
        )),
        Some(n) => Ok(n),
        None => Err(Error::settings(format!(
            "Failed to parse value [{value}] for setting [index.number_of_shards]"
        ))),
    }
}
