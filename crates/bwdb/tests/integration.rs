//! Integration tests for the bwdb crate.
//!
//! These tests exercise the full access-layer lifecycle (open, migrate,
//! bind, enumerate, CRUD, close, reopen) against a real SQLite database
//! on disk (via tempfile).

use bwdb::migration::{self, Migration};
use bwdb::{Database, DbError, Record, Value, args};

fn schema() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "people table",
        sql: "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER, photo BLOB);"
            .to_string(),
    }]
}

// ═══════════════════════════════════════════════════════════════════════
//  Database lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn open_creates_file_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.db");
    assert!(!path.exists());

    let mut db = Database::connect(&path).unwrap();
    assert!(path.exists());
    migration::run_all(&db, &schema()).unwrap();

    let id = db
        .table("people")
        .insert_row(&Record::new().with("name", "Ada").with("age", 36))
        .unwrap();
    db.close().unwrap();
    assert!(!db.is_open());

    db.open().unwrap();
    migration::run_all(&db, &schema()).unwrap();
    let row = db.table("people").get_row(id).unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&Value::Text("Ada".into())));
    assert_eq!(row.get("age"), Some(&Value::Integer(36)));
}

#[test]
fn operations_on_closed_database_fail() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new(dir.path().join("closed.db"));

    assert!(matches!(db.do_query("SELECT 1", &[]), Err(DbError::NotOpen)));
    assert!(matches!(db.table("people").count_rows(), Err(DbError::NotOpen)));
}

// ═══════════════════════════════════════════════════════════════════════
//  Binding and enumeration
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn lazy_enumeration_over_many_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::connect(dir.path().join("many.db")).unwrap();
    migration::run_all(&db, &schema()).unwrap();

    for i in 0..250 {
        db.do_query(
            "INSERT INTO people (name, age) VALUES (?, ?)",
            &args![format!("p{i}"), i],
        )
        .unwrap();
    }

    let mut stmt = db
        .prepare_query(
            "SELECT id, name FROM people WHERE age >= ? ORDER BY id",
            &args![200],
        )
        .unwrap();
    let mut cursor = stmt.records();
    let mut seen = 0;
    while cursor.next_row().unwrap() {
        let row = cursor.current_row().unwrap();
        assert_eq!(row.len(), 2);
        seen += 1;
    }
    assert_eq!(seen, 50);
    assert!(!cursor.next_row().unwrap());
}

#[test]
fn blob_and_null_round_trip() {
    let mut db = Database::open_in_memory().unwrap();
    migration::run_all(&db, &schema()).unwrap();

    let photo: Vec<u8> = (0..=255).collect();
    let id = db
        .table("people")
        .insert_row(
            &Record::new()
                .with("name", "Grace")
                .with("age", Value::Null)
                .with("photo", photo.clone()),
        )
        .unwrap();

    let row = db.table("people").get_row(id).unwrap().unwrap();
    assert_eq!(row.get("age"), Some(&Value::Null));
    assert_eq!(row.get("photo").and_then(Value::as_blob), Some(&photo[..]));
}

#[test]
fn json_arguments_bind_dynamically() {
    let mut db = Database::open_in_memory().unwrap();
    migration::run_all(&db, &schema()).unwrap();

    let payload = serde_json::json!(["Linus", 54]);
    let args = payload
        .as_array()
        .unwrap()
        .iter()
        .cloned()
        .map(Value::try_from)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    db.do_query("INSERT INTO people (name, age) VALUES (?, ?)", &args)
        .unwrap();

    let bad = serde_json::json!({"nested": true});
    assert!(matches!(
        Value::try_from(bad),
        Err(DbError::UnsupportedArgumentType(_))
    ));

    let age = db
        .value_from_query("SELECT age FROM people WHERE name = ?", &args!["Linus"])
        .unwrap();
    assert_eq!(age, Some(Value::Integer(54)));
}

// ═══════════════════════════════════════════════════════════════════════
//  CRUD
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn crud_full_lifecycle() {
    let mut db = Database::open_in_memory().unwrap();
    migration::run_all(&db, &schema()).unwrap();
    let mut people = db.table("people");

    let alice = Record::new().with("name", "Alice").with("age", 30);
    let id = people.insert_row(&alice).unwrap();
    assert_eq!(people.count_rows().unwrap(), 1);

    let row = people.get(id).unwrap().unwrap();
    for (column, value) in alice.iter() {
        assert_eq!(row.get(column), Some(value));
    }

    people
        .update_row(&Record::new().with("age", 31), id)
        .unwrap();
    let row = people.get_row(id).unwrap().unwrap();
    assert_eq!(row.get("age"), Some(&Value::Integer(31)));

    people.delete_row(id).unwrap();
    assert!(people.get_row(id).unwrap().is_none());
    assert_eq!(people.count_rows().unwrap(), 0);
    people.delete_row(id).unwrap();
}

#[test]
fn not_null_violation_is_insert_failed() {
    let mut db = Database::open_in_memory().unwrap();
    migration::run_all(&db, &schema()).unwrap();

    let err = db
        .table("people")
        .insert_row(&Record::new().with("age", 1))
        .unwrap_err();
    assert!(matches!(err, DbError::InsertFailed { .. }));
    assert_eq!(db.table("people").count_rows().unwrap(), 0);
}
