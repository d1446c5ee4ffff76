use crate::ingest::DynamicFieldEvent;
use serde_json::Value;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};
use tsmapping_schema::{
    node::{DynamicTemplate, Leaf, Mapping, TemplateTarget, ValueKind},
    types::DynamicMode,
};

/// Shape of a scalar JSON value; `None` for null, arrays and objects.
#[must_use]
pub fn value_kind(value: &Value, date_detection: bool) -> Option<ValueKind> {
    match value {
        Value::Bool(_) => Some(ValueKind::Boolean),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(ValueKind::Long),
        Value::Number(_) => Some(ValueKind::Double),
        Value::String(s) if date_detection && is_date(s) => Some(ValueKind::Date),
        Value::String(_) => Some(ValueKind::String),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Accepts RFC 3339 timestamps, plain `yyyy-MM-dd` dates and local
/// `yyyy-MM-ddTHH:mm:ss` times.
#[must_use]
pub fn is_date(raw: &str) -> bool {
    // cheap reject before trying the parsers
    if raw.len() < 10 || !raw.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        return false;
    }

    OffsetDateTime::parse(raw, &Rfc3339).is_ok()
        || Date::parse(raw, format_description!("[year]-[month]-[day]")).is_ok()
        || PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
        .is_ok()
}

// new_field
// Decide how an undeclared scalar at `path` enters the index.
pub(crate) fn new_field(
    mapping: &Mapping,
    mode: DynamicMode,
    path: String,
    kind: ValueKind,
) -> Option<DynamicFieldEvent> {
    match mode {
        DynamicMode::False => Some(DynamicFieldEvent::unmapped(path, kind.default_field_type()?)),

        // only runtime templates apply when new fields become runtime fields
        DynamicMode::Runtime => {
            let ty = match find_template(mapping, &path, kind, true).map(|t| &t.target) {
                Some(TemplateTarget::Runtime { ty: Some(ty) }) => *ty,
                _ => kind.default_runtime_type()?,
            };

            Some(DynamicFieldEvent::runtime(path, ty))
        }

        DynamicMode::True | DynamicMode::Strict => {
            let inferred = kind.default_field_type()?;

            match find_template(mapping, &path, kind, false).map(|t| &t.target) {
                Some(TemplateTarget::Runtime { ty }) => {
                    let ty = ty.or_else(|| kind.default_runtime_type())?;
                    Some(DynamicFieldEvent::runtime(path, ty))
                }
                Some(target) => Some(DynamicFieldEvent::mapped(path, target.to_leaf(inferred)?)),
                None => Some(DynamicFieldEvent::mapped(path, Leaf::new(inferred))),
            }
        }
    }
}

fn find_template<'m>(
    mapping: &'m Mapping,
    path: &str,
    kind: ValueKind,
    runtime_only: bool,
) -> Option<&'m DynamicTemplate> {
    mapping
        .dynamic_templates
        .iter()
        .filter(|t| !runtime_only || t.target.is_runtime())
        .find(|t| t.matches(path, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FieldOrigin;
    use serde_json::json;
    use tsmapping_schema::{build::parse_mapping, types::FieldType};

    #[test]
    fn detects_dates() {
        assert!(is_date("2021-04-28T18:50:04.467Z"));
        assert!(is_date("2021-04-28T18:50:04+02:00"));
        assert!(is_date("2021-04-28"));
        assert!(is_date("2021-04-28T18:50:04"));

        assert!(!is_date("20210428"));
        assert!(!is_date("2021-13-01"));
        assert!(!is_date("cat"));
        assert!(!is_date("abcd-04-28"));
    }

    #[test]
    fn value_kinds() {
        assert_eq!(value_kind(&json!(true), true), Some(ValueKind::Boolean));
        assert_eq!(value_kind(&json!(7), true), Some(ValueKind::Long));
        assert_eq!(value_kind(&json!(u64::MAX), true), Some(ValueKind::Long));
        assert_eq!(value_kind(&json!(1.5), true), Some(ValueKind::Double));
        assert_eq!(value_kind(&json!("2021-04-28"), true), Some(ValueKind::Date));
        assert_eq!(value_kind(&json!("2021-04-28"), false), Some(ValueKind::String));
        assert_eq!(value_kind(&json!(null), true), None);
    }

    #[test]
    fn default_inference_per_mode() {
        let mapping = Mapping::default();

        let event = new_field(&mapping, DynamicMode::True, "n".into(), ValueKind::Double)
            .expect("event");
        assert_eq!(event.origin, FieldOrigin::Mapped(Leaf::new(FieldType::Float)));

        let event = new_field(&mapping, DynamicMode::Runtime, "n".into(), ValueKind::Double)
            .expect("event");
        assert_eq!(event.origin, FieldOrigin::Runtime);
        assert_eq!(event.ty, FieldType::Double);

        let event = new_field(&mapping, DynamicMode::False, "s".into(), ValueKind::String)
            .expect("event");
        assert_eq!(event.origin, FieldOrigin::Unmapped);
        assert_eq!(event.ty, FieldType::Keyword);
    }

    #[test]
    fn templates_override_inference() {
        let mapping = parse_mapping(&json!({
            "dynamic_templates": [
                { "dims": {
                    "match": "dim_*",
                    "mapping": { "type": "keyword", "time_series_dimension": true }
                } },
                { "rt": {
                    "path_match": "scratch.*",
                    "runtime": {}
                } }
            ]
        }))
        .expect("mapping");

        let event = new_field(&mapping, DynamicMode::True, "a.dim_x".into(), ValueKind::String)
            .expect("event");
        assert_eq!(
            event.origin,
            FieldOrigin::Mapped(Leaf::dimension(FieldType::Keyword))
        );

        let event = new_field(&mapping, DynamicMode::True, "scratch.n".into(), ValueKind::Long)
            .expect("event");
        assert_eq!(event.origin, FieldOrigin::Runtime);
        assert_eq!(event.ty, FieldType::Long);

        // mapping templates are skipped in runtime mode
        let event = new_field(&mapping, DynamicMode::Runtime, "dim_x".into(), ValueKind::String)
            .expect("event");
        assert_eq!(event.origin, FieldOrigin::Runtime);
        assert_eq!(event.ty, FieldType::Keyword);
    }
}
