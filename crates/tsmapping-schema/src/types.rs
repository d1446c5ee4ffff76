use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

///
/// FieldType
/// Concrete leaf type declared by a mapping (or inferred for a dynamic field).
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum FieldType {
    #[display("boolean")]
    Boolean,
    #[display("byte")]
    Byte,
    #[display("date")]
    Date,
    #[display("date_nanos")]
    DateNanos,
    #[display("double")]
    Double,
    #[display("float")]
    Float,
    #[display("half_float")]
    HalfFloat,
    #[display("integer")]
    Integer,
    #[display("ip")]
    Ip,
    #[display("keyword")]
    Keyword,
    #[display("long")]
    Long,
    #[display("short")]
    Short,
    #[display("text")]
    Text,
    #[display("unsigned_long")]
    UnsignedLong,
}

impl FieldType {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Short | Self::Integer | Self::Long | Self::UnsignedLong
        )
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::HalfFloat | Self::Float | Self::Double)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    // only these mappers register the time_series_dimension parameter
    #[must_use]
    pub const fn supports_dimension(self) -> bool {
        self.is_integer() || matches!(self, Self::Keyword | Self::Ip | Self::Boolean)
    }

    #[must_use]
    pub const fn supports_metric(self) -> bool {
        self.is_numeric()
    }

    /// Types a runtime field may be declared with.
    #[must_use]
    pub const fn supports_runtime(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Date | Self::Double | Self::Ip | Self::Keyword | Self::Long
        )
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "date" => Self::Date,
            "date_nanos" => Self::DateNanos,
            "double" => Self::Double,
            "float" => Self::Float,
            "half_float" => Self::HalfFloat,
            "integer" => Self::Integer,
            "ip" => Self::Ip,
            "keyword" => Self::Keyword,
            "long" => Self::Long,
            "short" => Self::Short,
            "text" => Self::Text,
            "unsigned_long" => Self::UnsignedLong,
            other => return Err(other.to_string()),
        };

        Ok(ty)
    }
}

///
/// MetricKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[display("counter")]
    Counter,
    #[display("gauge")]
    Gauge,
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(Self::Counter),
            "gauge" => Ok(Self::Gauge),
            other => Err(other.to_string()),
        }
    }
}

///
/// DynamicMode
/// Per-object policy for fields that are not in the mapping yet.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicMode {
    /// Map new fields and persist them in the mapping.
    #[default]
    #[display("true")]
    True,

    /// Keep new fields in the source only.
    #[display("false")]
    False,

    /// Expose new fields as runtime (non-persisted) fields.
    #[display("runtime")]
    Runtime,

    /// Reject documents that introduce new fields.
    #[display("strict")]
    Strict,
}

impl FromStr for DynamicMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::True),
            "false" => Ok(Self::False),
            "runtime" => Ok(Self::Runtime),
            "strict" => Ok(Self::Strict),
            other => Err(other.to_string()),
        }
    }
}

///
/// IndexMode
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    #[default]
    #[display("standard")]
    Standard,
    #[display("time_series")]
    TimeSeries,
}

impl IndexMode {
    #[must_use]
    pub const fn is_time_series(self) -> bool {
        matches!(self, Self::TimeSeries)
    }
}

impl FromStr for IndexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "time_series" => Ok(Self::TimeSeries),
            other => Err(other.to_string()),
        }
    }
}
