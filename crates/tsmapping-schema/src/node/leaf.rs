use crate::prelude::*;
use std::ops::Not;

///
/// Leaf
/// A concrete field: its type plus the time-series flags.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Leaf {
    #[serde(rename = "type")]
    pub ty: FieldType,

    #[serde(rename = "time_series_dimension", skip_serializing_if = "Not::not")]
    pub dimension: bool,

    #[serde(
        rename = "time_series_metric",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub metric: Option<MetricKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl Leaf {
    #[must_use]
    pub const fn new(ty: FieldType) -> Self {
        Self {
            ty,
            dimension: false,
            metric: None,
            script: None,
        }
    }

    #[must_use]
    pub const fn dimension(ty: FieldType) -> Self {
        Self {
            ty,
            dimension: true,
            metric: None,
            script: None,
        }
    }

    #[must_use]
    pub const fn metric(ty: FieldType, kind: MetricKind) -> Self {
        Self {
            ty,
            dimension: false,
            metric: Some(kind),
            script: None,
        }
    }

    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    #[must_use]
    pub const fn has_script(&self) -> bool {
        self.script.is_some()
    }

    /// A keyword dimension without a script: the only shape a routing field may take.
    #[must_use]
    pub const fn is_routable(&self) -> bool {
        matches!(self.ty, FieldType::Keyword) && self.dimension && self.script.is_none()
    }
}
