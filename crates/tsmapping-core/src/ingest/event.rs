use tsmapping_schema::{node::Leaf, types::FieldType};

///
/// FieldOrigin
/// How a newly observed field would enter the index.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldOrigin {
    /// Added to the mapping tree as this leaf.
    Mapped(Leaf),

    /// Added to the runtime section.
    Runtime,

    /// Kept in the source only, under `dynamic: false`.
    Unmapped,
}

///
/// DynamicFieldEvent
/// A field seen for the first time while parsing one document.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DynamicFieldEvent {
    pub path: String,
    pub ty: FieldType,
    pub origin: FieldOrigin,
}

impl DynamicFieldEvent {
    #[must_use]
    pub fn mapped(path: impl Into<String>, leaf: Leaf) -> Self {
        Self {
            path: path.into(),
            ty: leaf.ty,
            origin: FieldOrigin::Mapped(leaf),
        }
    }

    #[must_use]
    pub fn runtime(path: impl Into<String>, ty: FieldType) -> Self {
        Self {
            path: path.into(),
            ty,
            origin: FieldOrigin::Runtime,
        }
    }

    #[must_use]
    pub fn unmapped(path: impl Into<String>, ty: FieldType) -> Self {
        Self {
            path: path.into(),
            ty,
            origin: FieldOrigin::Unmapped,
        }
    }

    /// True when accepting the document changes the mapping.
    #[must_use]
    pub const fn updates_mapping(&self) -> bool {
        !matches!(self.origin, FieldOrigin::Unmapped)
    }
}
