//! Validation rules, error accumulation and form handling.

mod common;

use std::collections::HashMap;

use common::shop;
use sqlrecord::prelude::*;
use sqlrecord::TypeClass;

#[test]
fn test_presence_fails_on_null_and_empty_string() {
    let db = shop();
    let mut user = db.record("users").unwrap();

    assert!(!user.validates_presence_of("name", None).unwrap());
    user.set("email", "").unwrap();
    assert!(!user.validates_presence_of("email", Some("Email please")).unwrap());
    assert_eq!(user.errors(), &["Name cannot be empty", "Email please"]);

    user.clear_errors();
    user.set("name", "Alice").unwrap();
    assert!(user.validates_presence_of("name", None).unwrap());
    assert!(user.is_valid());
}

#[test]
fn test_uniqueness_detects_other_rows() {
    let db = shop();
    db.gateway().seed(
        "users",
        &[("id", Value::BigInt(1)), ("email", "taken@example.com".into())],
    );

    let mut user = db.record("users").unwrap();
    user.set("email", "taken@example.com").unwrap();
    assert!(!user.validates_uniqueness_of(&["email"], None).unwrap());
    assert_eq!(user.errors(), &["Email is not unique"]);

    let (sql, params) = db.gateway().last_statement().unwrap();
    assert_eq!(sql, r#"SELECT 1 FROM "users" WHERE "email" = ? LIMIT 1"#);
    assert_eq!(params, vec![Value::from("taken@example.com")]);

    user.clear_errors();
    user.set("email", "free@example.com").unwrap();
    assert!(user.validates_uniqueness_of(&["email"], None).unwrap());
}

#[test]
fn test_uniqueness_excludes_own_row() {
    let db = shop();
    db.gateway().seed(
        "users",
        &[("id", Value::BigInt(1)), ("email", "me@example.com".into())],
    );

    let mut user = db.record("users").unwrap();
    user.find(1i64).unwrap();
    assert!(user.validates_uniqueness_of(&["email"], None).unwrap());

    let (sql, params) = db.gateway().last_statement().unwrap();
    assert_eq!(
        sql,
        r#"SELECT 1 FROM "users" WHERE "email" = ? AND "id" <> ? LIMIT 1"#
    );
    assert_eq!(params, vec![Value::from("me@example.com"), Value::BigInt(1)]);
}

#[test]
fn test_uniqueness_over_several_columns() {
    let db = shop();
    db.gateway().seed(
        "users",
        &[
            ("id", Value::BigInt(1)),
            ("name", "Alice".into()),
            ("email", "a@example.com".into()),
        ],
    );
    let mut user = db.record("users").unwrap();
    user.set("name", "Alice").unwrap();
    user.set("email", "b@example.com").unwrap();
    assert!(user.validates_uniqueness_of(&["name", "email"], None).unwrap());

    user.set("email", "a@example.com").unwrap();
    assert!(
        !user
            .validates_uniqueness_of(&["name", "email"], Some("Already registered"))
            .unwrap()
    );
    assert_eq!(user.errors(), &["Already registered"]);
}

#[test]
fn test_uniqueness_without_columns_is_an_error() {
    let db = shop();
    db.gateway()
        .seed("users", &[("id", Value::BigInt(1)), ("name", "Alice".into())]);
    let mut user = db.record("users").unwrap();
    user.find(1i64).unwrap();
    db.gateway().clear_log();

    assert!(matches!(
        user.validates_uniqueness_of(&[], None),
        Err(Error::MissingParameters { .. })
    ));
    assert!(user.is_valid());
    assert!(db.gateway().statements().is_empty());
}

#[test]
fn test_length_bounds() {
    let db = shop();
    let mut user = db.record("users").unwrap();
    user.set("name", "Al").unwrap();

    assert!(user.validates_length_of("name", 2, Some(10), None).unwrap());
    assert!(!user.validates_length_of("name", 3, None, None).unwrap());
    assert!(!user.validates_length_of("name", 0, Some(1), None).unwrap());
    assert_eq!(
        user.errors(),
        &[
            "Name must be at least 3 characters",
            "Name must be between 0 and 1 characters"
        ]
    );

    user.set("name", "Ünïcødé").unwrap();
    assert!(user.validates_length_of("name", 7, Some(7), None).unwrap());
}

#[test]
fn test_format_rule() {
    let db = shop();
    let mut user = db.record("users").unwrap();
    let email = r"^[^@\s]+@[^@\s]+\.[a-z]+$";

    user.set("email", "alice@example.com").unwrap();
    assert!(user.validates_format_of("email", email, None).unwrap());

    user.set("email", "not an email").unwrap();
    assert!(!user.validates_format_of("email", email, None).unwrap());
    assert!(!user.validates_format_of("email", "[unclosed", Some("bad")).unwrap());
    assert_eq!(user.errors(), &["Email is invalid", "bad"]);
}

#[test]
fn test_foreign_key_exists() {
    let db = shop();
    db.gateway()
        .seed("customers", &[("id", Value::BigInt(1)), ("name", "Acme".into())]);
    let mut order = db.record("orders").unwrap();

    order.set("customer_id", 1i64).unwrap();
    assert!(order.validates_foreign_key_exists("customer_id", None).unwrap());
    assert!(order.is_related_cached("customers"));

    order.set("customer_id", 2i64).unwrap();
    assert!(!order.is_related_cached("customers"));
    assert!(!order.validates_foreign_key_exists("customer_id", None).unwrap());

    assert!(!order.validates_foreign_key_exists("note", Some("no link")).unwrap());
    assert_eq!(
        order.errors(),
        &["customer_id foreign key is not valid", "no link"]
    );
    assert!(order.validates_foreign_key_exists("missing", None).is_err());
}

#[test]
fn test_validate_runs_no_rules() {
    let db = shop();
    let mut user = db.record("users").unwrap();
    assert!(user.validate());
    user.add_error("manual");
    assert!(!user.validate());
    assert!(!user.is_valid());
    user.clear_errors();
    assert!(user.validate());
}

#[test]
fn test_rules_on_unknown_columns_are_errors() {
    let db = shop();
    let mut user = db.record("users").unwrap();
    assert!(user.validates_presence_of("nope", None).is_err());
    assert!(user.validates_uniqueness_of(&["nope"], None).is_err());
    assert!(user.validates_length_of("nope", 1, None, None).is_err());
    assert!(user.validates_format_of("nope", ".*", None).is_err());
    assert!(db.gateway().statements().is_empty());
}

fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_assign_from_form() {
    let db = shop();
    let mut user = db.record("users").unwrap();
    user.set("age", 50i64).unwrap();
    user.set("active", true).unwrap();

    user.assign_from_form(&form(&[
        ("id", "666"),
        ("name", "  Alice  "),
        ("age", " 4a2 "),
    ]))
    .unwrap();

    assert_eq!(user.get("id").unwrap(), &Value::Null);
    assert_eq!(user.get("name").unwrap(), &Value::from("Alice"));
    assert_eq!(user.get("age").unwrap(), &Value::BigInt(42));
    // Absent checkbox means unchecked.
    assert_eq!(user.get("active").unwrap(), &Value::Bool(false));
    // Absent plain field is left alone.
    assert_eq!(user.get("email").unwrap(), &Value::Null);

    user.assign_from_form(&form(&[("active", "on"), ("age", "")]))
        .unwrap();
    assert_eq!(user.get("active").unwrap(), &Value::Bool(true));
    assert_eq!(user.get("age").unwrap(), &Value::BigInt(0));
}

#[test]
fn test_fields_for_form() {
    let db = shop();
    let mut order = db.record("orders").unwrap();
    order.set("total", Value::Decimal("9.50".to_string())).unwrap();
    let names: Vec<_> = order
        .fields_for_form()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["total", "note"]);

    let user = db.record("users").unwrap();
    let fields = user.fields_for_form();
    let status = fields.iter().find(|f| f.name == "status").unwrap();
    assert_eq!(status.value, Value::from("active"));
    assert_eq!(status.type_class, TypeClass::Character);
    assert_eq!(status.max_length, Some(20));
    assert!(status.nullable);
    let name = fields.iter().find(|f| f.name == "name").unwrap();
    assert_eq!(name.value, Value::from(""));
    assert!(!name.nullable);
    assert!(fields.iter().find(|f| f.name == "active").unwrap().checkbox);
    assert!(fields.iter().all(|f| f.table == "users"));
}
