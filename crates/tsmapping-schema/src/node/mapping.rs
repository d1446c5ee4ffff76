use crate::{error::MappingError, prelude::*};
use serde::ser::{SerializeMap, Serializer};

///
/// Mapping
/// The root object plus the index-level mapping sections.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mapping {
    pub root: Object,
    pub runtime: Vec<RuntimeField>,
    pub dynamic_templates: Vec<DynamicTemplate>,
    pub date_detection: bool,
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new(Object::new())
    }
}

///
/// DynamicLookup
/// Where a field path leaves the declared tree, and the mode in force there.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DynamicLookup {
    pub mode: DynamicMode,

    /// Number of leading segments that resolve to declared objects.
    pub declared: usize,
}

impl Mapping {
    #[must_use]
    pub const fn new(root: Object) -> Self {
        Self {
            root,
            runtime: Vec::new(),
            dynamic_templates: Vec::new(),
            date_detection: true,
        }
    }

    #[must_use]
    pub fn root_dynamic(&self) -> DynamicMode {
        self.root.effective_dynamic(DynamicMode::default())
    }

    // resolve
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&MappingNode> {
        let segments: Vec<&str> = path.split('.').collect();

        self.resolve_segments(&segments)
    }

    #[must_use]
    pub fn resolve_segments(&self, segments: &[&str]) -> Option<&MappingNode> {
        let (last, parents) = segments.split_last()?;
        let mut object = &self.root;

        for segment in parents {
            object = object.fields.get(segment)?.node.as_object()?;
        }

        object.fields.get(last).map(|field| &field.node)
    }

    /// Walk declared objects along `segments` and report the dynamic mode that
    /// governs the first undeclared segment.
    #[must_use]
    pub fn effective_dynamic(&self, segments: &[&str]) -> DynamicLookup {
        let mut mode = self.root_dynamic();
        let mut object = &self.root;
        let mut declared = 0;

        for segment in segments {
            let Some(next) = object
                .fields
                .get(segment)
                .and_then(|field| field.node.as_object())
            else {
                break;
            };
            mode = next.effective_dynamic(mode);
            object = next;
            declared += 1;
        }

        DynamicLookup {
            mode,
            declared,
        }
    }

    #[must_use]
    pub fn has_nested(&self) -> bool {
        self.first_nested_path().is_some()
    }

    /// Path of the first nested object in definition order.
    #[must_use]
    pub fn first_nested_path(&self) -> Option<String> {
        fn walk(object: &Object, path: &mut Vec<String>) -> Option<String> {
            for field in object.fields.iter() {
                path.push(field.name.clone());
                let found = match &field.node {
                    MappingNode::Nested(_) => Some(path.join(".")),
                    MappingNode::Object(child) => walk(child, path),
                    MappingNode::Leaf(_) => None,
                };
                path.pop();

                if found.is_some() {
                    return found;
                }
            }

            None
        }

        walk(&self.root, &mut Vec::new())
    }

    /// Add a leaf, creating intermediate objects as needed.
    ///
    /// Re-inserting an identical leaf is a no-op; any other clash is a conflict.
    pub fn insert_leaf(&mut self, segments: &[&str], leaf: Leaf) -> Result<bool, MappingError> {
        let Some((last, parents)) = segments.split_last() else {
            return Err(MappingError::malformed("field name cannot be empty"));
        };
        let full_path = segments.join(".");
        let mut object = &mut self.root;

        for (depth, segment) in parents.iter().enumerate() {
            if object.fields.get(segment).is_none() {
                object.fields.insert(*segment, MappingNode::Object(Object::new()));
            }
            let Some(field) = object.fields.get_mut(segment) else {
                return Err(MappingError::malformed(format!(
                    "field [{segment}] vanished during insert"
                )));
            };
            let type_name = field.node.type_name();
            object = field.node.as_object_mut().ok_or_else(|| MappingError::Conflict {
                path: segments[..=depth].join("."),
                from: type_name,
                to: "object".to_string(),
            })?;
        }

        // None: free slot, Some(None): identical leaf, Some(Some(ty)): clash
        let existing = object.fields.get(last).map(|field| match &field.node {
            MappingNode::Leaf(current) if current.ty == leaf.ty => None,
            node => Some(node.type_name()),
        });

        match existing {
            None => {
                object.fields.insert(*last, MappingNode::Leaf(leaf));
                Ok(true)
            }
            Some(None) => Ok(false),
            Some(Some(from)) => Err(MappingError::Conflict {
                path: full_path,
                from,
                to: leaf.ty.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn runtime_field(&self, path: &str) -> Option<&RuntimeField> {
        self.runtime.iter().find(|field| field.path == path)
    }

    /// Add a runtime field; returns false when an identical one already exists.
    pub fn add_runtime_field(&mut self, field: RuntimeField) -> Result<bool, MappingError> {
        match self.runtime.iter().find(|f| f.path == field.path) {
            Some(existing) if existing.ty == field.ty => Ok(false),
            Some(existing) => Err(MappingError::Conflict {
                path: field.path.clone(),
                from: existing.ty.to_string(),
                to: field.ty.to_string(),
            }),
            None => {
                self.runtime.push(field);
                Ok(true)
            }
        }
    }

    /// Number of leaf fields in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        fn count(object: &Object) -> usize {
            object
                .fields
                .iter()
                .map(|field| match &field.node {
                    MappingNode::Leaf(_) => 1,
                    MappingNode::Object(child) | MappingNode::Nested(child) => count(child),
                })
                .sum()
        }

        count(&self.root)
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(dynamic) = self.root.dynamic {
            map.serialize_entry("dynamic", &dynamic)?;
        }
        if !self.date_detection {
            map.serialize_entry("date_detection", &false)?;
        }
        if !self.runtime.is_empty() {
            let runtime: serde_json::Map<String, serde_json::Value> = self
                .runtime
                .iter()
                .filter_map(|field| {
                    serde_json::to_value(field)
                        .ok()
                        .map(|value| (field.path.clone(), value))
                })
                .collect();
            map.serialize_entry("runtime", &runtime)?;
        }
        map.serialize_entry("properties", &self.root.fields)?;

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mapping {
        Mapping::new(
            Object::new()
                .field("@timestamp", Leaf::new(FieldType::Date))
                .field(
                    "k8s",
                    Object::new().field(
                        "pod",
                        Object::with_dynamic(DynamicMode::False)
                            .field("uid", Leaf::dimension(FieldType::Keyword)),
                    ),
                ),
        )
    }

    #[test]
    fn resolves_dotted_paths() {
        let mapping = sample();

        assert!(matches!(
            mapping.resolve("k8s.pod.uid"),
            Some(MappingNode::Leaf(leaf)) if leaf.is_routable()
        ));
        assert!(mapping.resolve("k8s.pod.name").is_none());
        assert!(mapping.resolve("@timestamp.x").is_none());
    }

    #[test]
    fn dynamic_mode_is_inherited_until_overridden() {
        let mapping = sample();

        let lookup = mapping.effective_dynamic(&["k8s", "node"]);
        assert_eq!(lookup.mode, DynamicMode::True);
        assert_eq!(lookup.declared, 1);

        let lookup = mapping.effective_dynamic(&["k8s", "pod", "labels", "app"]);
        assert_eq!(lookup.mode, DynamicMode::False);
        assert_eq!(lookup.declared, 2);
    }

    #[test]
    fn insert_leaf_creates_objects_and_detects_conflicts() {
        let mut mapping = sample();

        assert_eq!(
            mapping.insert_leaf(&["metrics", "cpu"], Leaf::new(FieldType::Long)),
            Ok(true)
        );
        assert_eq!(
            mapping.insert_leaf(&["metrics", "cpu"], Leaf::new(FieldType::Long)),
            Ok(false)
        );
        assert_eq!(
            mapping.insert_leaf(&["metrics", "cpu"], Leaf::new(FieldType::Keyword)),
            Err(MappingError::Conflict {
                path: "metrics.cpu".to_string(),
                from: "long".to_string(),
                to: "keyword".to_string(),
            })
        );
        assert!(matches!(
            mapping.insert_leaf(&["@timestamp", "x"], Leaf::new(FieldType::Long)),
            Err(MappingError::Conflict { path, .. }) if path == "@timestamp"
        ));
        assert_eq!(mapping.leaf_count(), 3);
    }

    #[test]
    fn serializes_back_to_a_mapping_document() {
        let value = serde_json::to_value(sample()).expect("serialize");

        assert_eq!(
            value,
            serde_json::json!({
                "properties": {
                    "@timestamp": { "type": "date" },
                    "k8s": {
                        "properties": {
                            "pod": {
                                "dynamic": "false",
                                "properties": {
                                    "uid": { "type": "keyword", "time_series_dimension": true }
                                }
                            }
                        }
                    }
                }
            })
        );
    }
}
