use crate::prelude::*;
use serde::ser::{SerializeMap, Serializer};

///
/// FieldList
/// Child fields in mapping definition order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldList {
    pub fields: Vec<Field>,
}

impl FieldList {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    // get
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Insert a field, replacing any previous definition with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, node: MappingNode) {
        let name = name.into();

        match self.get_mut(&name) {
            Some(field) => field.node = node,
            None => self.fields.push(Field { name, node }),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }
}

impl Serialize for FieldList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.node)?;
        }

        map.end()
    }
}

///
/// Field
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub name: String,
    pub node: MappingNode,
}

///
/// Object
/// Body shared by object and nested mappers.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Object {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<DynamicMode>,

    #[serde(rename = "properties", skip_serializing_if = "FieldList::is_empty")]
    pub fields: FieldList,
}

impl Object {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dynamic: None,
            fields: FieldList::new(),
        }
    }

    #[must_use]
    pub const fn with_dynamic(dynamic: DynamicMode) -> Self {
        Self {
            dynamic: Some(dynamic),
            fields: FieldList::new(),
        }
    }

    /// Builder-style insert used by tests and by mapping construction.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, node: impl Into<MappingNode>) -> Self {
        self.fields.insert(name, node.into());
        self
    }

    /// This object's own mode, falling back to the inherited one.
    #[must_use]
    pub fn effective_dynamic(&self, inherited: DynamicMode) -> DynamicMode {
        self.dynamic.unwrap_or(inherited)
    }
}
