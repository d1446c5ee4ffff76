mod leaf;
mod mapping;
mod object;
mod runtime;
mod template;

pub use leaf::*;
pub use mapping::*;
pub use object::*;
pub use runtime::*;
pub use template::*;

use crate::prelude::*;
use serde::ser::{SerializeMap, Serializer};

///
/// MappingNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MappingNode {
    Leaf(Leaf),
    Object(Object),
    Nested(Object),
}

impl MappingNode {
    /// Type name as it appears in mappings and error messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Leaf(leaf) => leaf.ty.to_string(),
            Self::Object(_) => "object".to_string(),
            Self::Nested(_) => "nested".to_string(),
        }
    }

    #[must_use]
    pub const fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Object(_) | Self::Nested(_) => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) | Self::Nested(object) => Some(object),
            Self::Leaf(_) => None,
        }
    }

    pub const fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(object) | Self::Nested(object) => Some(object),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub const fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }
}

impl From<Leaf> for MappingNode {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<Object> for MappingNode {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl Serialize for MappingNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(leaf) => leaf.serialize(serializer),
            Self::Object(object) => object.serialize(serializer),
            Self::Nested(object) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "nested")?;
                if let Some(dynamic) = object.dynamic {
                    map.serialize_entry("dynamic", &dynamic)?;
                }
                if !object.fields.is_empty() {
                    map.serialize_entry("properties", &object.fields)?;
                }

                map.end()
            }
        }
    }
}
