use derive_more::{Deref, Display, IntoIterator};
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// MappingError
/// Raised while turning a mapping definition into a tree, or while updating it.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MappingError {
    #[error("Failed to parse mapping: {0}")]
    Malformed(String),

    #[error("No handler for type [{ty}] declared on field [{path}]")]
    UnknownType { path: String, ty: String },

    #[error("unknown parameter [{param}] on mapper [{path}] of type [{ty}]")]
    UnknownParameter {
        path: String,
        param: String,
        ty: String,
    },

    #[error("Field [time_series_dimension] cannot be set in conjunction with field [time_series_metric]")]
    DimensionWithMetric { path: String },

    #[error("Unknown value [{value}] for field [time_series_metric] - accepted values are [gauge, counter]")]
    UnknownMetric { path: String, value: String },

    #[error("mapper [{path}] cannot be changed from type [{from}] to [{to}]")]
    Conflict {
        path: String,
        from: String,
        to: String,
    },
}

impl MappingError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

///
/// ValidationErrorKind
/// Stable classification of routing_path violations.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum ValidationErrorKind {
    InvalidDimensionType,
    DimensionInNestedField,
    NestedFieldsForbidden,
    UnmappedDynamicFalseField,
    RuntimeFieldMatchesRoutingPath,
}

///
/// DimensionViolation
/// Why a routing_path match is not a plain keyword dimension.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum DimensionViolation {
    #[display("was [object]")]
    Object,

    #[display("was [{_0}]")]
    WrongType(String),

    #[display("was not a dimension")]
    NotDimension,

    #[display("has a [script] parameter")]
    Script,

    #[display("was a runtime [{_0}]")]
    Runtime(String),
}

///
/// ValidationError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error(
        "All fields that match routing_path must be keywords with [time_series_dimension: true] and without the [script] parameter. [{path}] {violation}."
    )]
    InvalidDimensionType {
        path: String,
        violation: DimensionViolation,
    },

    #[error("time_series_dimension can't be configured in nested field [{path}]")]
    DimensionInNestedField { path: String },

    #[error("cannot have nested fields when index is in time-series mode.")]
    NestedFieldsForbidden { path: String },

    #[error(
        "All fields matching [routing_path] must be mapped but [{path}] was declared as [dynamic: false]"
    )]
    UnmappedDynamicFalseField { path: String },

    #[error("runtime fields may not match [routing_path] but [{path}] matched")]
    RuntimeFieldMatchesRoutingPath { path: String },
}

impl ValidationError {
    pub fn invalid_dimension(path: impl Into<String>, violation: DimensionViolation) -> Self {
        Self::InvalidDimensionType {
            path: path.into(),
            violation,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::InvalidDimensionType { .. } => ValidationErrorKind::InvalidDimensionType,
            Self::DimensionInNestedField { .. } => ValidationErrorKind::DimensionInNestedField,
            Self::NestedFieldsForbidden { .. } => ValidationErrorKind::NestedFieldsForbidden,
            Self::UnmappedDynamicFalseField { .. } => {
                ValidationErrorKind::UnmappedDynamicFalseField
            }
            Self::RuntimeFieldMatchesRoutingPath { .. } => {
                ValidationErrorKind::RuntimeFieldMatchesRoutingPath
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidDimensionType { path, .. }
            | Self::DimensionInNestedField { path }
            | Self::NestedFieldsForbidden { path }
            | Self::UnmappedDynamicFalseField { path }
            | Self::RuntimeFieldMatchesRoutingPath { path } => path,
        }
    }
}

///
/// ValidationErrors
/// Violations in the order they were found.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
pub struct ValidationErrors {
    #[into_iterator(owned, ref)]
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    pub fn result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
