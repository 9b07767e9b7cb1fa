//! Schema JSON round-trip and path derivation tests.

use std::collections::BTreeSet;

use oraql_schema::{Field, InputValue, RootTypes, Schema, SchemaError, TypeKind, TypeRef};

/// A schema with a query root, a mutation root, a cyclic pair of object
/// types, and an input object.
fn sample_schema() -> Schema {
    let mut schema = Schema::new(RootTypes {
        query: Some("Query".into()),
        mutation: Some("Mutation".into()),
        subscription: None,
    });

    schema.add_type("User", TypeKind::Object);
    schema.add_type("Post", TypeKind::Object);
    schema.add_type("CreateUserInput", TypeKind::InputObject);

    let mut user_field = Field::new("user", TypeRef::from_token("User!"));
    user_field
        .add_arg(InputValue::new("id", TypeRef::from_token("ID!")))
        .unwrap();
    schema.get_mut("Query").unwrap().fields.push(user_field);

    let mut create_user = Field::new("createUser", TypeRef::from_token("User"));
    create_user
        .add_arg(InputValue::new(
            "input",
            TypeRef::from_token("CreateUserInput!"),
        ))
        .unwrap();
    schema.get_mut("Mutation").unwrap().fields.push(create_user);

    // User <-> Post cycle.
    schema
        .get_mut("User")
        .unwrap()
        .fields
        .push(Field::new("posts", TypeRef::from_token("[Post!]!")));
    schema
        .get_mut("Post")
        .unwrap()
        .fields
        .push(Field::new("author", TypeRef::from_token("User!")));

    schema
        .get_mut("CreateUserInput")
        .unwrap()
        .fields
        .push(Field::new("email", TypeRef::from_token("String!")));

    schema
}

#[test]
fn test_json_round_trip_is_identity() {
    let schema = sample_schema();
    let json = schema.to_json().unwrap();
    let back = Schema::from_json(&json).unwrap();
    assert_eq!(back, schema);
}

#[test]
fn test_round_trip_filters_dummy_placeholder() {
    let mut schema = Schema::new(RootTypes {
        query: Some("Query".into()),
        ..RootTypes::default()
    });
    schema.add_type("Empty", TypeKind::Object);

    let json = schema.to_json().unwrap();
    let empty = json["data"]["__schema"]["types"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "Empty")
        .unwrap();
    assert_eq!(empty["fields"][0]["name"], "dummy");
    assert_eq!(empty["fields"][0]["type"]["name"], "String");

    // The placeholder does not survive parsing.
    let back = Schema::from_json(&json).unwrap();
    assert!(back.get("Empty").unwrap().fields.is_empty());
    assert_eq!(back, schema);
}

#[test]
fn test_scalars_emit_no_field_lists() {
    let schema = Schema::new(RootTypes {
        query: Some("Query".into()),
        ..RootTypes::default()
    });
    let json = schema.to_json().unwrap();
    let string_ty = json["data"]["__schema"]["types"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "String")
        .unwrap();
    assert!(string_ty["fields"].is_null());
    assert!(string_ty["inputFields"].is_null());
}

#[test]
fn test_root_pointers_round_trip() {
    let schema = sample_schema();
    let json = schema.to_json().unwrap();
    assert_eq!(json["data"]["__schema"]["queryType"]["name"], "Query");
    assert_eq!(json["data"]["__schema"]["mutationType"]["name"], "Mutation");
    assert!(json["data"]["__schema"]["subscriptionType"].is_null());
    assert_eq!(json["data"]["__schema"]["directives"], serde_json::json!([]));
}

#[test]
fn test_path_from_root_through_nested_types() {
    let schema = sample_schema();

    assert_eq!(schema.get_path_from_root("Query").unwrap(), vec!["Query"]);
    assert_eq!(
        schema.get_path_from_root("User").unwrap(),
        vec!["Query", "user"]
    );
    assert_eq!(
        schema.get_path_from_root("Post").unwrap(),
        vec!["Query", "user", "posts"]
    );
}

#[test]
fn test_path_for_unknown_type_fails() {
    let schema = sample_schema();
    assert_eq!(
        schema.get_path_from_root("Ghost"),
        Err(SchemaError::UnknownType {
            name: "Ghost".into()
        })
    );
}

#[test]
fn test_path_for_unreachable_type_fails() {
    let mut schema = sample_schema();
    // Registered through an argument, never returned by any field.
    schema.add_type("Orphan", TypeKind::Object);
    assert_eq!(
        schema.get_path_from_root("Orphan"),
        Err(SchemaError::NoPathFromRoot {
            name: "Orphan".into()
        })
    );
}

#[test]
fn test_convert_path_to_document() {
    let schema = sample_schema();

    assert_eq!(
        schema.convert_path_to_document(&["Query".to_string()]),
        "query { FUZZ }"
    );
    assert_eq!(
        schema.convert_path_to_document(&["Query".to_string(), "user".to_string()]),
        "query { user { FUZZ } }"
    );
    assert_eq!(
        schema.convert_path_to_document(&[
            "Query".to_string(),
            "user".to_string(),
            "posts".to_string()
        ]),
        "query { user { posts { FUZZ } } }"
    );
    assert_eq!(
        schema.convert_path_to_document(&["Mutation".to_string(), "createUser".to_string()]),
        "mutation { createUser { FUZZ } }"
    );
}

#[test]
fn test_document_substitution_stays_syntactic() {
    // Replacing FUZZ with any field valid on the target type must give
    // syntactically plausible GraphQL: balanced braces, one selection.
    let schema = sample_schema();
    let path = schema.get_path_from_root("Post").unwrap();
    let document = schema.convert_path_to_document(&path);
    let substituted = document.replace("FUZZ", "author");

    assert_eq!(substituted, "query { user { posts { author } } }");
    assert_eq!(
        substituted.matches('{').count(),
        substituted.matches('}').count()
    );
}

#[test]
fn test_seed_with_extra_kinds_round_trips() {
    // A seed produced by real introspection may carry ENUM and UNION
    // entries; they pass through untouched with null field lists.
    let doc = serde_json::json!({
        "data": { "__schema": {
            "directives": [],
            "mutationType": null,
            "queryType": { "name": "Query" },
            "subscriptionType": null,
            "types": [
                {
                    "description": null, "enumValues": null, "interfaces": [],
                    "kind": "OBJECT", "name": "Query", "possibleTypes": null,
                    "fields": [{
                        "args": [], "deprecationReason": null, "description": null,
                        "isDeprecated": false, "name": "episode",
                        "type": { "kind": "ENUM", "name": "Episode", "ofType": null }
                    }],
                    "inputFields": null
                },
                {
                    "description": null, "enumValues": null, "interfaces": [],
                    "kind": "ENUM", "name": "Episode", "possibleTypes": null,
                    "fields": null, "inputFields": null
                }
            ],
        }}
    });

    let schema = Schema::from_json(&doc).unwrap();
    assert_eq!(schema.get("Episode").unwrap().kind, TypeKind::Enum);
    assert_eq!(schema.to_json().unwrap(), doc);
}

#[test]
fn test_enum_types_are_probe_candidates() {
    let doc = serde_json::json!({
        "data": { "__schema": {
            "directives": [],
            "mutationType": null,
            "queryType": { "name": "Query" },
            "subscriptionType": null,
            "types": [
                {
                    "description": null, "enumValues": null, "interfaces": [],
                    "kind": "OBJECT", "name": "Query", "possibleTypes": null,
                    "fields": [{
                        "args": [], "deprecationReason": null, "description": null,
                        "isDeprecated": false, "name": "episode",
                        "type": { "kind": "ENUM", "name": "Episode", "ofType": null }
                    }],
                    "inputFields": null
                },
                {
                    "description": null, "enumValues": null, "interfaces": [],
                    "kind": "ENUM", "name": "Episode", "possibleTypes": null,
                    "fields": null, "inputFields": null
                }
            ],
        }}
    });
    let schema = Schema::from_json(&doc).unwrap();

    let ignore: BTreeSet<String> =
        ["Int", "Float", "String", "Boolean", "ID", "Query"].iter().map(|s| s.to_string()).collect();
    assert_eq!(schema.get_type_without_fields(&ignore), Some("Episode"));
}
