use crate::{prelude::*, routing::Pattern};

///
/// DynamicTemplate
/// Maps newly seen fields that match its conditions instead of default inference.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DynamicTemplate {
    pub name: String,

    /// Matched against the last path segment.
    pub match_name: Option<Pattern>,

    /// Matched against the full dotted path.
    pub path_match: Option<Pattern>,

    pub match_mapping_type: Option<ValueKind>,
    pub target: TemplateTarget,
}

impl DynamicTemplate {
    #[must_use]
    pub fn matches(&self, path: &str, kind: ValueKind) -> bool {
        let name = path.rsplit('.').next().unwrap_or(path);

        self.match_name.as_ref().is_none_or(|p| p.matches(name))
            && self.path_match.as_ref().is_none_or(|p| p.matches(path))
            && self.match_mapping_type.is_none_or(|k| k == kind)
    }
}

///
/// TemplateTarget
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TemplateTarget {
    /// Persist the field; a missing type keeps the inferred one.
    Mapped {
        ty: Option<FieldType>,
        dimension: bool,
        metric: Option<MetricKind>,
    },

    /// Expose the field as a runtime field.
    Runtime { ty: Option<FieldType> },
}

impl TemplateTarget {
    #[must_use]
    pub fn to_leaf(&self, inferred: FieldType) -> Option<Leaf> {
        match self {
            Self::Mapped {
                ty,
                dimension,
                metric,
            } => Some(Leaf {
                ty: ty.unwrap_or(inferred),
                dimension: *dimension,
                metric: *metric,
                script: None,
            }),
            Self::Runtime { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime { .. })
    }
}

///
/// ValueKind
/// The JSON shape of an incoming value, as seen by `match_mapping_type`.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ValueKind {
    #[display("boolean")]
    Boolean,
    #[display("date")]
    Date,
    #[display("double")]
    Double,
    #[display("long")]
    Long,
    #[display("object")]
    Object,
    #[display("string")]
    String,
}

impl ValueKind {
    /// Type picked for this shape when no template applies.
    #[must_use]
    pub const fn default_field_type(self) -> Option<FieldType> {
        match self {
            Self::Boolean => Some(FieldType::Boolean),
            Self::Date => Some(FieldType::Date),
            Self::Double => Some(FieldType::Float),
            Self::Long => Some(FieldType::Long),
            Self::String => Some(FieldType::Keyword),
            Self::Object => None,
        }
    }

    /// Runtime fields only come in a handful of types.
    #[must_use]
    pub const fn default_runtime_type(self) -> Option<FieldType> {
        match self {
            Self::Boolean => Some(FieldType::Boolean),
            Self::Date => Some(FieldType::Date),
            Self::Double => Some(FieldType::Double),
            Self::Long => Some(FieldType::Long),
            Self::String => Some(FieldType::Keyword),
            Self::Object => None,
        }
    }
}

impl std::str::FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "double" => Ok(Self::Double),
            "long" => Ok(Self::Long),
            "object" => Ok(Self::Object),
            "string" => Ok(Self::String),
            other => Err(other.to_string()),
        }
    }
}
