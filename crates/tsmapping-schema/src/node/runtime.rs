use crate::prelude::*;

///
/// RuntimeField
/// A field computed at read time and never persisted in the mapping tree.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RuntimeField {
    #[serde(skip)]
    pub path: String,

    #[serde(rename = "type")]
    pub ty: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl RuntimeField {
    #[must_use]
    pub fn new(path: impl Into<String>, ty: FieldType) -> Self {
        Self {
            path: path.into(),
            ty,
            script: None,
        }
    }
}
