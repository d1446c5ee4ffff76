use crate::{
    db::index::IndexedDocument,
    error::{Error, ErrorBody},
};
use derive_more::Display;
use serde::{
    Serialize,
    ser::{SerializeMap, Serializer},
};
use serde_json::{Map, Value};

///
/// BulkOp
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOp {
    #[display("index")]
    Index,
    #[display("create")]
    Create,
}

///
/// BulkAction
/// One action line plus its source line.
///

#[derive(Clone, Debug, PartialEq)]
pub struct BulkAction {
    pub op: BulkOp,
    pub index: String,
    pub id: Option<String>,
    pub source: Value,
}

///
/// BulkRequest
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BulkRequest {
    pub actions: Vec<BulkAction>,
}

impl BulkRequest {
    /// Parse a newline-delimited bulk body.
    ///
    /// `default_index` applies to actions without `_index`.
    pub fn from_ndjson(body: &str, default_index: Option<&str>) -> Result<Self, Error> {
        let mut lines = body
            .lines()
            .enumerate()
            .map(|(n, line)| (n + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());
        let mut actions = Vec::new();

        while let Some((line_no, line)) = lines.next() {
            let (op, index, id) = parse_action_line(line_no, line, default_index)?;

            let Some((_, source)) = lines.next() else {
                return Err(Error::request(format!(
                    "Validation Failed: 1: source is missing for the action on line [{line_no}];"
                )));
            };
            let source: Value = serde_json::from_str(source).map_err(|err| {
                Error::request(format!(
                    "Malformed source for the action on line [{line_no}]: {err}"
                ))
            })?;

            actions.push(BulkAction {
                op,
                index,
                id,
                source,
            });
        }

        Ok(Self { actions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// parse_action_line
fn parse_action_line(
    line_no: usize,
    line: &str,
    default_index: Option<&str>,
) -> Result<(BulkOp, String, Option<String>), Error> {
    let value: Value = serde_json::from_str(line).map_err(|err| {
        Error::request(format!("Malformed action/metadata line [{line_no}]: {err}"))
    })?;
    let Some((op, meta)) = value
        .as_object()
        .filter(|action| action.len() == 1)
        .and_then(|action| action.iter().next())
    else {
        return Err(Error::request(format!(
            "Malformed action/metadata line [{line_no}], expected a single action object"
        )));
    };

    let op = match op.as_str() {
        "index" => BulkOp::Index,
        "create" => BulkOp::Create,
        other => {
            return Err(Error::request(format!(
                "Malformed action/metadata line [{line_no}], expected one of [create, index] but found [{other}]"
            )));
        }
    };

    let empty = Map::new();
    let meta = match meta {
        Value::Object(meta) => meta,
        Value::Null => &empty,
        _ => {
            return Err(Error::request(format!(
                "Malformed action/metadata line [{line_no}], expected START_OBJECT"
            )));
        }
    };

    let mut index = default_index.map(str::to_string);
    let mut id = None;
    for (key, value) in meta {
        let text = || {
            value.as_str().map(str::to_string).ok_or_else(|| {
                Error::request(format!(
                    "Action/metadata line [{line_no}]: [{key}] must be a string"
                ))
            })
        };
        match key.as_str() {
            "_index" => index = Some(text()?),
            "_id" => id = Some(text()?),
            other => {
                return Err(Error::request(format!(
                    "Action/metadata line [{line_no}] contains an unknown parameter [{other}]"
                )));
            }
        }
    }

    let index = index.ok_or_else(|| {
        Error::request(format!(
            "Validation Failed: 1: index is missing for the action on line [{line_no}];"
        ))
    })?;

    Ok((op, index, id))
}

///
/// BulkItem
/// Outcome of one action; failures never affect the other items.
///

#[derive(Clone, Debug)]
pub struct BulkItem {
    pub op: BulkOp,
    pub index: String,
    pub result: Result<IndexedDocument, Error>,

    /// Id requested by the action, reported when the document failed.
    pub requested_id: Option<String>,
}

impl BulkItem {
    #[must_use]
    pub const fn status(&self) -> u16 {
        match &self.result {
            Ok(_) => 201,
            Err(err) => err.status(),
        }
    }
}

#[derive(Serialize)]
struct ItemBody<'a> {
    #[serde(rename = "_index")]
    index: &'a str,

    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,

    status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'static str>,

    #[serde(rename = "_shard", skip_serializing_if = "Option::is_none")]
    shard: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody<'a>>,
}

impl Serialize for BulkItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match &self.result {
            Ok(doc) => ItemBody {
                index: &self.index,
                id: Some(&doc.id),
                status: self.status(),
                result: Some("created"),
                shard: Some(doc.shard),
                error: None,
            },
            Err(err) => ItemBody {
                index: &self.index,
                id: self.requested_id.as_deref(),
                status: self.status(),
                result: None,
                shard: None,
                error: Some(err.body()),
            },
        };

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.op, &body)?;
        map.end()
    }
}

///
/// BulkResponse
///

#[derive(Clone, Debug, Serialize)]
pub struct BulkResponse {
    pub took: u64,
    pub errors: bool,
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    #[must_use]
    pub fn new(took: u64, items: Vec<BulkItem>) -> Self {
        let errors = items.iter().any(|item| item.result.is_err());

        Self {
            took,
            errors,
            items,
        }
    }

    /// Number of rejected items.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.items.iter().filter(|item| item.result.is_err()).count()
    }
}
