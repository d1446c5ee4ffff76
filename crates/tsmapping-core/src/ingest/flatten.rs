use crate::ingest::{DocumentError, DynamicFieldEvent, infer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tsmapping_schema::{
    node::{Mapping, MappingNode, Object},
    types::DynamicMode,
};

///
/// Scope
/// The object a document key is resolved against.
///

#[derive(Clone, Copy)]
enum Scope<'m> {
    Declared {
        object: &'m Object,
        mode: DynamicMode,
    },
    Undeclared {
        mode: DynamicMode,
    },
}

impl Scope<'_> {
    const fn mode(&self) -> DynamicMode {
        match self {
            Self::Declared { mode, .. } | Self::Undeclared { mode } => *mode,
        }
    }
}

///
/// Scanner
///

struct Scanner<'m> {
    mapping: &'m Mapping,
    path: Vec<String>,
    seen: BTreeSet<String>,
    events: Vec<DynamicFieldEvent>,
}

/// Walk a document against the current mapping and report every field it
/// would introduce, in document order.
///
/// The mapping is not modified.
pub fn scan_document(
    mapping: &Mapping,
    doc: &Map<String, Value>,
) -> Result<Vec<DynamicFieldEvent>, DocumentError> {
    let mut scanner = Scanner {
        mapping,
        path: Vec::new(),
        seen: BTreeSet::new(),
        events: Vec::new(),
    };
    let root = Scope::Declared {
        object: &mapping.root,
        mode: mapping.root_dynamic(),
    };

    scanner.scan_object(root, doc)?;

    Ok(scanner.events)
}

impl<'m> Scanner<'m> {
    fn dotted(&self) -> String {
        self.path.join(".")
    }

    fn scan_object(&mut self, scope: Scope<'m>, map: &Map<String, Value>) -> Result<(), DocumentError> {
        for (key, value) in map {
            let segments = split_key(key)?;
            self.scan_entry(scope, &segments, value)?;
        }

        Ok(())
    }

    fn scan_entry(
        &mut self,
        scope: Scope<'m>,
        segments: &[&str],
        value: &Value,
    ) -> Result<(), DocumentError> {
        let Some((name, rest)) = segments.split_first() else {
            return Ok(());
        };

        self.path.push((*name).to_string());
        let result = self.scan_segment(scope, name, rest, value);
        self.path.pop();

        result
    }

    // scan_segment
    fn scan_segment(
        &mut self,
        scope: Scope<'m>,
        name: &str,
        rest: &[&str],
        value: &Value,
    ) -> Result<(), DocumentError> {
        let declared = match scope {
            Scope::Declared { object, .. } => object.fields.get(name).map(|field| &field.node),
            Scope::Undeclared { .. } => None,
        };

        match declared {
            Some(MappingNode::Leaf(leaf)) => {
                if !rest.is_empty() || holds_object(value) {
                    return Err(DocumentError::LeafGotObject {
                        path: self.dotted(),
                        ty: leaf.ty,
                    });
                }

                Ok(())
            }
            Some(MappingNode::Object(child) | MappingNode::Nested(child)) => {
                let child_scope = Scope::Declared {
                    object: child,
                    mode: child.effective_dynamic(scope.mode()),
                };

                if rest.is_empty() {
                    self.scan_into_object(child_scope, value)
                } else {
                    self.scan_entry(child_scope, rest, value)
                }
            }
            None => self.scan_undeclared(scope.mode(), rest, value),
        }
    }

    fn scan_into_object(&mut self, scope: Scope<'m>, value: &Value) -> Result<(), DocumentError> {
        match value {
            Value::Object(map) => self.scan_object(scope, map),
            Value::Array(items) => items
                .iter()
                .try_for_each(|item| self.scan_into_object(scope, item)),
            Value::Null => Ok(()),
            _ => Err(DocumentError::ObjectGotValue { path: self.dotted() }),
        }
    }

    // scan_undeclared
    fn scan_undeclared(
        &mut self,
        mode: DynamicMode,
        rest: &[&str],
        value: &Value,
    ) -> Result<(), DocumentError> {
        if rest.is_empty() && self.mapping.runtime_field(&self.dotted()).is_some() {
            return Ok(());
        }

        if mode == DynamicMode::Strict {
            let (name, parents) = self.path.split_last().map_or(("", &[][..]), |(name, parents)| {
                (name.as_str(), parents)
            });
            let parent = if parents.is_empty() {
                "_doc".to_string()
            } else {
                parents.join(".")
            };

            return Err(DocumentError::StrictDynamic {
                name: name.to_string(),
                parent,
            });
        }

        if rest.is_empty() {
            self.scan_new_value(mode, value)
        } else {
            self.scan_entry(Scope::Undeclared { mode }, rest, value)
        }
    }

    fn scan_new_value(&mut self, mode: DynamicMode, value: &Value) -> Result<(), DocumentError> {
        match value {
            Value::Object(map) => self.scan_object(Scope::Undeclared { mode }, map),
            Value::Array(items) => items
                .iter()
                .try_for_each(|item| self.scan_new_value(mode, item)),
            Value::Null => Ok(()),
            scalar => {
                self.record(mode, scalar);
                Ok(())
            }
        }
    }

    fn record(&mut self, mode: DynamicMode, scalar: &Value) {
        let path = self.dotted();
        if !self.seen.insert(path.clone()) {
            return;
        }

        let Some(kind) = infer::value_kind(scalar, self.mapping.date_detection) else {
            return;
        };
        if let Some(event) = infer::new_field(self.mapping, mode, path, kind) {
            self.events.push(event);
        }
    }
}

fn split_key(key: &str) -> Result<Vec<&str>, DocumentError> {
    let segments: Vec<&str> = key.split('.').collect();

    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(DocumentError::Malformed(format!(
            "field name cannot contain only whitespace or empty segments: [{key}]"
        )));
    }

    Ok(segments)
}

fn holds_object(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(holds_object),
        _ => false,
    }
}

/// Visit every scalar in a document with its dotted path.
///
/// Array elements share the path of the array; objects inside arrays are
/// walked like any other object. Nulls are skipped.
pub fn for_each_value<'d, F>(doc: &'d Map<String, Value>, mut visit: F)
where
    F: FnMut(&str, &'d Value),
{
    fn walk<'d, F>(path: &mut String, value: &'d Value, visit: &mut F)
    where
        F: FnMut(&str, &'d Value),
    {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let len = path.len();
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(key);
                    walk(path, child, visit);
                    path.truncate(len);
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(path, item, visit);
                }
            }
            Value::Null => {}
            scalar => visit(path, scalar),
        }
    }

    let mut path = String::new();
    for (key, value) in doc {
        path.clear();
        path.push_str(key);
        walk(&mut path, value, &mut visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FieldOrigin;
    use serde_json::json;
    use tsmapping_schema::{build::parse_mapping, node::Leaf, types::FieldType};

    fn mapping(value: Value) -> Mapping {
        parse_mapping(&value).expect("valid mapping")
    }

    fn scan(mapping: &Mapping, doc: Value) -> Result<Vec<DynamicFieldEvent>, DocumentError> {
        let doc = doc.as_object().expect("object document").clone();
        scan_document(mapping, &doc)
    }

    fn paths(events: &[DynamicFieldEvent]) -> Vec<&str> {
        events.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn declared_fields_raise_no_events() {
        let mapping = mapping(json!({
            "properties": {
                "host": { "properties": { "name": { "type": "keyword" } } },
                "cpu": { "type": "double" }
            }
        }));

        let events = scan(
            &mapping,
            json!({ "host": { "name": "a" }, "host.name": "b", "cpu": [1.0, 2.0] }),
        )
        .expect("scan");
        assert!(events.is_empty());
    }

    #[test]
    fn new_fields_are_reported_once_in_document_order() {
        let mapping = mapping(json!({ "properties": {} }));

        let events = scan(
            &mapping,
            json!({
                "b": "x",
                "a": { "c": 1, "d": [true, false] },
                "a.c": 2,
                "e": null,
                "f": []
            }),
        )
        .expect("scan");

        assert_eq!(paths(&events), ["b", "a.c", "a.d"]);
        assert_eq!(
            events[1].origin,
            FieldOrigin::Mapped(Leaf::new(FieldType::Long))
        );
        assert_eq!(events[2].ty, FieldType::Boolean);
    }

    #[test]
    fn dynamic_false_ancestor_yields_unmapped_events() {
        let mapping = mapping(json!({
            "properties": {
                "labels": { "dynamic": false, "properties": {} }
            }
        }));

        let events = scan(&mapping, json!({ "labels": { "env": { "tier": "prod" } } }))
            .expect("scan");

        assert_eq!(paths(&events), ["labels.env.tier"]);
        assert_eq!(events[0].origin, FieldOrigin::Unmapped);
    }

    #[test]
    fn runtime_mode_yields_runtime_events() {
        let mapping = mapping(json!({ "dynamic": "runtime" }));

        let events = scan(&mapping, json!({ "m": 1.5 })).expect("scan");

        assert_eq!(events[0].origin, FieldOrigin::Runtime);
        assert_eq!(events[0].ty, FieldType::Double);
    }

    #[test]
    fn strict_mode_rejects_unknown_fields() {
        let mapping = mapping(json!({
            "dynamic": "strict",
            "properties": {
                "k8s": { "properties": { "pod": { "type": "keyword" } } }
            }
        }));

        assert_eq!(
            scan(&mapping, json!({ "k8s": { "node": "n1" } })),
            Err(DocumentError::StrictDynamic {
                name: "node".to_string(),
                parent: "k8s".to_string(),
            })
        );
        assert_eq!(
            scan(&mapping, json!({ "other": 1 })),
            Err(DocumentError::StrictDynamic {
                name: "other".to_string(),
                parent: "_doc".to_string(),
            })
        );
    }

    #[test]
    fn child_dynamic_setting_overrides_strict_parent() {
        let mapping = mapping(json!({
            "dynamic": "strict",
            "properties": {
                "open": { "dynamic": true, "properties": {} }
            }
        }));

        let events = scan(&mapping, json!({ "open": { "x": "y" } })).expect("scan");
        assert_eq!(paths(&events), ["open.x"]);
    }

    #[test]
    fn shape_mismatches_are_rejected() {
        let mapping = mapping(json!({
            "properties": {
                "uid": { "type": "keyword" },
                "host": { "properties": {} }
            }
        }));

        assert!(matches!(
            scan(&mapping, json!({ "uid": { "a": 1 } })),
            Err(DocumentError::LeafGotObject { .. })
        ));
        assert!(matches!(
            scan(&mapping, json!({ "uid.a": 1 })),
            Err(DocumentError::LeafGotObject { .. })
        ));
        assert_eq!(
            scan(&mapping, json!({ "host": "h1" })),
            Err(DocumentError::ObjectGotValue {
                path: "host".to_string()
            })
        );
    }

    #[test]
    fn empty_key_segments_are_malformed() {
        let mapping = Mapping::default();

        assert!(matches!(
            scan(&mapping, json!({ "a..b": 1 })),
            Err(DocumentError::Malformed(_))
        ));
    }

    #[test]
    fn mapping_runtime_fields_are_not_new() {
        let mapping = mapping(json!({ "runtime": { "day": { "type": "keyword" } } }));

        let events = scan(&mapping, json!({ "day": "monday" })).expect("scan");
        assert!(events.is_empty());
    }

    #[test]
    fn for_each_value_flattens_arrays_and_objects() {
        let doc = json!({
            "a": { "b": "x", "c": [1, { "d": true }] },
            "e": null
        });
        let mut seen = Vec::new();

        for_each_value(doc.as_object().expect("object"), |path, value| {
            seen.push((path.to_string(), value.clone()));
        });

        assert_eq!(
            seen,
            [
                ("a.b".to_string(), json!("x")),
                ("a.c".to_string(), json!(1)),
                ("a.c.d".to_string(), json!(true)),
            ]
        );
    }
}
