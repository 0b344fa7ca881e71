use schemafix::{Mode, SchemaRegistry};
use serde_json::json;

#[test]
fn repairing_a_document_produces_a_conforming_one() {
    let schema = schemafix::compile(&json!({
        "type": "object",
        "required": ["id", "tags"],
        "properties": {
            "id": {"type": "integer", "default": 0},
            "tags": {
                "type": "array",
                "minItems": 1,
                "items": {"type": "string", "default": ""}
            },
            "score": {"type": "number"}
        },
        "additionalProperties": false
    }))
    .unwrap();

    let document = json!({"tags": [], "score": "3.25", "debug": true});
    assert!(!schema.is_valid(&document));

    let repaired = schema.update(&document).unwrap();
    assert!(schema.is_valid(&repaired));
    assert_eq!(
        repaired,
        json!({"tags": [""], "score": 3.25, "id": 0})
    );

    // A conforming document repairs to itself with an empty patch.
    assert!(schema.generate_patch(&repaired).unwrap().is_empty());
    assert_eq!(schema.update(&repaired).unwrap(), repaired);
}

#[test]
fn registry_resolves_references_across_documents() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            "https://example.com/defs/address.json",
            &json!({
                "type": "object",
                "required": ["city"],
                "properties": {
                    "city": {"type": "string"},
                    "zip": {"type": "string"}
                }
            }),
        )
        .unwrap();
    registry
        .register(
            "https://example.com/defs/person.json",
            &json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": {"type": "string"},
                    "address": {"$ref": "address.json#"}
                }
            }),
        )
        .unwrap();

    let schema = schemafix::options()
        .with_base_uri("https://example.com/root.json")
        .unwrap()
        .compile(&json!({
            "type": "array",
            "items": {"$ref": "defs/person.json#"}
        }))
        .unwrap();

    let valid = json!([
        {"name": "ada", "address": {"city": "London"}},
        {"name": "linus"}
    ]);
    assert!(schema
        .validate_with(&registry, &valid, Mode::CollectAll)
        .is_ok());

    let invalid = json!([{"name": "ada", "address": {"zip": "12345"}}]);
    let violations = schema
        .violations_with(&registry, &invalid, Mode::CollectAll)
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].instance_path().as_str(), "/0/address");
    assert_eq!(violations[0].keyword(), "required");
}

#[test]
fn compiled_schemas_validate_concurrently() {
    let schema = schemafix::compile(&json!({
        "type": "object",
        "required": ["n"],
        "properties": {"n": {"type": "integer", "minimum": 0}}
    }))
    .unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let schema = &schema;
            scope.spawn(move || {
                for n in 0..100 {
                    assert!(schema.is_valid(&json!({"n": worker * 100 + n})));
                    assert!(!schema.is_valid(&json!({"n": -1})));
                }
            });
        }
    });
}

#[test]
fn text_operations_cover_the_full_pipeline() {
    let schema = r#"{
        "type": "object",
        "required": ["id"],
        "properties": {"id": {"type": "integer", "default": 1}}
    }"#;

    assert!(schemafix::ops::validate_schema(schema).unwrap());
    assert!(schemafix::ops::validate(schema, r#"{"id": 3}"#).unwrap());

    let patch = schemafix::ops::patch(schema, "{}").unwrap();
    let operations: serde_json::Value = serde_json::from_str(&patch).unwrap();
    assert_eq!(operations, json!([{"op": "add", "path": "/id", "value": 1}]));

    let updated = schemafix::ops::update(schema, r#"{"id": "7"}"#).unwrap();
    let document: serde_json::Value = serde_json::from_str(&updated).unwrap();
    assert_eq!(document, json!({"id": 7}));

    let error = schemafix::ops::validate(schema, "{nope").unwrap_err();
    assert!(error.to_string().contains("failed, here is why: "));
}

#[test]
fn violations_survive_error_conversion() {
    let schema = schemafix::compile(&json!({
        "type": "object",
        "required": ["a", "b"]
    }))
    .unwrap();
    let error = schema
        .validate(&json!({}), Mode::CollectAll)
        .unwrap_err();
    let schemafix::Error::Validation(failure) = error else {
        panic!("expected a validation failure");
    };
    assert_eq!(failure.violations().len(), 2);
    let message = failure.to_string();
    assert!(message.contains("missing required property \"a\""));
    assert!(message.contains("missing required property \"b\""));
}
