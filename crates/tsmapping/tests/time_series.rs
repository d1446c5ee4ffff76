use proptest::prelude::*;
use serde_json::{Value, json};
use tsmapping::prelude::*;

fn db() -> Db {
    Db::new(Config::default())
}

fn create(db: &Db, routing: Value, properties: Value) -> Result<std::sync::Arc<Index>, tsmapping::Error> {
    db.create_index(
        "metrics",
        &json!({
            "settings": { "index": { "mode": "time_series", "routing_path": routing } },
            "mappings": { "properties": properties }
        }),
    )
}

fn bulk(db: &Db, docs: &[Value]) -> BulkResponse {
    let body = docs
        .iter()
        .flat_map(|doc| [json!({ "index": {} }).to_string(), doc.to_string()])
        .collect::<Vec<_>>()
        .join("\n");

    db.bulk_ndjson(&body, Some("metrics")).expect("bulk body")
}

fn reason(response: &BulkResponse, item: usize) -> Option<String> {
    let rendered = serde_json::to_value(response).expect("serialize");

    rendered["items"][item]["index"]["error"]["reason"]
        .as_str()
        .map(str::to_string)
}

//
// Index creation
//

#[test]
fn wildcard_selects_leaves_below_the_object() {
    let db = db();

    create(
        &db,
        json!(["dim*"]),
        json!({
            "dim": { "properties": {
                "metricset": { "type": "keyword", "time_series_dimension": true }
            } }
        }),
    )
    .expect("keyword dimension below dim");
}

#[test]
fn wildcard_reports_non_keyword_leaf_below_the_object() {
    let db = db();

    let err = create(
        &db,
        json!(["dim*"]),
        json!({
            "dim": { "properties": {
                "metricset": { "type": "keyword", "time_series_dimension": true },
                "port": { "type": "long", "time_series_dimension": true }
            } }
        }),
    )
    .expect_err("long dimension");

    assert_eq!(
        err.to_string(),
        "All fields that match routing_path must be keywords with [time_series_dimension: true] and without the [script] parameter. [dim.port] was [long]."
    );
}

#[test]
fn exact_pattern_on_object_is_rejected() {
    let db = db();

    let err = create(
        &db,
        json!(["dim"]),
        json!({
            "dim": { "properties": {
                "metricset": { "type": "keyword", "time_series_dimension": true }
            } }
        }),
    )
    .expect_err("object");

    assert!(err.to_string().ends_with("[dim] was [object]."));
    assert_eq!(err.validation, Some(ValidationErrorKind::InvalidDimensionType));
}

#[test]
fn timestamp_routing_field_is_rejected() {
    let db = db();

    let err = create(&db, json!(["@timestamp"]), json!({ "@timestamp": { "type": "date" } }))
        .expect_err("date");

    assert!(err.to_string().ends_with("[@timestamp] was [date]."));
    assert!(db.index("metrics").is_err());
}

#[test]
fn scripted_dimension_is_rejected() {
    let db = db();

    let err = create(
        &db,
        json!(["uid"]),
        json!({ "uid": { "type": "keyword", "time_series_dimension": true, "script": "emit('x')" } }),
    )
    .expect_err("script");

    assert!(err.to_string().ends_with("[uid] has a [script] parameter."));
}

#[test]
fn nested_mapping_is_rejected_in_time_series_mode() {
    let db = db();

    let err = create(
        &db,
        json!(["uid"]),
        json!({
            "uid": { "type": "keyword", "time_series_dimension": true },
            "events": { "type": "nested", "properties": { "name": { "type": "keyword" } } }
        }),
    )
    .expect_err("nested");

    assert_eq!(
        err.to_string(),
        "cannot have nested fields when index is in time-series mode."
    );
    assert_eq!(err.validation, Some(ValidationErrorKind::NestedFieldsForbidden));
}

//
// Ingestion
//

#[test]
fn dynamic_false_field_fails_only_its_document() {
    let db = db();
    create(
        &db,
        json!(["uid", "labels.*"]),
        json!({
            "uid": { "type": "keyword", "time_series_dimension": true },
            "labels": { "dynamic": false, "properties": {} }
        }),
    )
    .expect("created");

    let response = bulk(
        &db,
        &[
            json!({ "uid": "a", "value": 1 }),
            json!({ "uid": "b", "labels": { "env": "prod" } }),
            json!({ "uid": "c", "value": 2 }),
        ],
    );

    assert!(response.errors);
    assert!(response.items[0].result.is_ok());
    assert!(response.items[2].result.is_ok());
    assert_eq!(
        reason(&response, 1).as_deref(),
        Some(
            "All fields matching [routing_path] must be mapped but [labels.env] was declared as [dynamic: false]"
        )
    );
}

#[test]
fn runtime_mode_field_matching_routing_path_is_rejected() {
    let db = db();
    db.create_index(
        "metrics",
        &json!({
            "settings": { "index": { "mode": "time_series", "routing_path": ["uid", "extra"] } },
            "mappings": {
                "dynamic": "runtime",
                "properties": { "uid": { "type": "keyword", "time_series_dimension": true } }
            }
        }),
    )
    .expect("created");

    let response = bulk(
        &db,
        &[
            json!({ "uid": "a", "extra": "x" }),
            json!({ "uid": "a", "other": 1.5 }),
        ],
    );

    assert!(
        reason(&response, 0)
            .is_some_and(|reason| reason.ends_with("[extra] was a runtime [keyword]."))
    );
    assert!(response.items[1].result.is_ok());

    let mapping = db.index("metrics").expect("index").mapping().expect("mapping");
    assert!(mapping.runtime_field("extra").is_none());
    assert_eq!(
        mapping.runtime_field("other").map(|field| field.ty),
        Some(FieldType::Double)
    );
}

#[test]
fn dynamic_templates_decide_whether_new_dimensions_pass() {
    let db = db();
    db.create_index(
        "metrics",
        &json!({
            "settings": { "index": { "mode": "time_series", "routing_path": ["dim.*"] } },
            "mappings": {
                "dynamic_templates": [
                    { "dims": {
                        "path_match": "dim.*",
                        "match_mapping_type": "string",
                        "mapping": { "type": "keyword", "time_series_dimension": true }
                    } }
                ],
                "properties": {}
            }
        }),
    )
    .expect("created");

    let response = bulk(
        &db,
        &[
            json!({ "dim": { "host": "h1" } }),
            json!({ "dim": { "port": 8080 } }),
        ],
    );

    assert!(response.items[0].result.is_ok());
    assert!(
        reason(&response, 1).is_some_and(|reason| reason.ends_with("[dim.port] was [long]."))
    );
}

#[test]
fn plain_dynamic_keyword_is_not_a_dimension() {
    let db = db();
    create(
        &db,
        json!(["uid", "host"]),
        json!({ "uid": { "type": "keyword", "time_series_dimension": true } }),
    )
    .expect("created");

    let response = bulk(&db, &[json!({ "uid": "a", "host": "h1" })]);

    assert!(
        reason(&response, 0).is_some_and(|reason| reason.ends_with("[host] was not a dimension."))
    );
}

//
// Search
//

#[test]
fn search_runtime_field_on_routing_path_fails_without_data() {
    let db = db();
    create(
        &db,
        json!(["dim.*"]),
        json!({ "dim": { "properties": {
            "host": { "type": "keyword", "time_series_dimension": true }
        } } }),
    )
    .expect("created");

    let err = db
        .check_search(
            "metrics",
            &json!({ "runtime_mappings": { "dim.never_indexed": { "type": "keyword" } } }),
        )
        .expect_err("collision");

    assert_eq!(
        err.to_string(),
        "runtime fields may not match [routing_path] but [dim.never_indexed] matched"
    );
    assert_eq!(
        err.validation,
        Some(ValidationErrorKind::RuntimeFieldMatchesRoutingPath)
    );
}

//
// Properties
//

#[derive(Clone, Debug)]
struct FieldDef {
    name: &'static str,
    ty: FieldType,
    dimension: bool,
    script: bool,
}

fn field_def() -> impl Strategy<Value = FieldDef> {
    (
        prop::sample::select(vec!["dim_a", "dim_b", "host", "metric"]),
        prop::sample::select(vec![FieldType::Keyword, FieldType::Long, FieldType::Ip]),
        any::<bool>(),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(name, ty, dimension, script)| FieldDef {
            name,
            ty,
            dimension,
            script,
        })
}

proptest! {
    #[test]
    fn creation_succeeds_iff_every_match_is_a_keyword_dimension(
        fields in prop::collection::vec(field_def(), 1..5),
        pattern in prop::sample::select(vec!["dim_*", "dim_a", "host", "*"]),
    ) {
        let routing = RoutingPath::new([pattern]).expect("routing");
        let mut root = Object::new();
        for def in &fields {
            let mut leaf = Leaf::new(def.ty);
            leaf.dimension = def.dimension;
            if def.script {
                leaf = leaf.with_script("emit('x')");
            }
            root = root.field(def.name, leaf);
        }
        let mapping = Mapping::new(root);

        let expected = mapping.root.fields.iter().all(|field| {
            !routing.matches(&field.name)
                || field.node.as_leaf().is_some_and(|leaf| {
                    leaf.ty == FieldType::Keyword && leaf.dimension && !leaf.has_script()
                })
        });

        let result = validate_index(IndexMode::TimeSeries, Some(&routing), &mapping);
        prop_assert_eq!(result.is_ok(), expected);
    }

    #[test]
    fn fields_outside_the_routing_path_are_always_accepted(
        names in prop::collection::btree_set("[a-z]{1,6}", 1..6),
        value in prop_oneof![
            Just(json!("text")),
            Just(json!(42)),
            Just(json!(1.5)),
            Just(json!(true)),
            Just(json!("2024-01-01")),
        ],
    ) {
        let db = db();
        create(
            &db,
            json!(["uid"]),
            json!({ "uid": { "type": "keyword", "time_series_dimension": true } }),
        )
        .expect("created");

        let mut doc = serde_json::Map::new();
        doc.insert("uid".to_string(), json!("u1"));
        for name in names.iter().filter(|name| name.as_str() != "uid") {
            doc.insert(format!("extra.{name}"), value.clone());
        }

        let response = bulk(&db, &[Value::Object(doc)]);
        prop_assert!(!response.errors, "{:?}", response.items[0].result);
    }
}
