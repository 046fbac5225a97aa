use std::io::Write;

use oxide_db_migrate::{MigrateError, SchemaFile};

const ACCOUNTS: &str = r#"{
  "name": "app",
  "schema": "billing",
  "tables": [
    {
      "name": "t_account",
      "columns": [
        {
          "field_name": "ID",
          "name": "f_id",
          "column_type": { "data_type": "uint64", "auto_increment": true }
        },
        {
          "field_name": "Email",
          "name": "f_email",
          "column_type": { "data_type": "string", "length": 128 }
        }
      ],
      "keys": {
        "primary": ["ID"],
        "unique_indexes": { "I_email": ["Email"] }
      }
    }
  ]
}"#;

fn write(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_schema_file() {
    let file = write(ACCOUNTS);

    let database = SchemaFile::load(file.path())
        .unwrap()
        .into_database()
        .unwrap();

    assert_eq!(database.name, "app");
    assert_eq!(database.schema.as_deref(), Some("billing"));
    let table = database.table("t_account").unwrap();
    assert_eq!(table.schema.as_deref(), Some("billing"));
    assert_eq!(table.columns.names(), ["f_id", "f_email"]);
    assert_eq!(table.auto_increment().unwrap().name, "f_id");
}

#[test]
fn test_invalid_json_is_reported_with_path() {
    let file = write("{ not json");

    let err = SchemaFile::load(file.path()).unwrap_err();

    match err {
        MigrateError::SchemaFile { path, .. } => assert_eq!(path, file.path()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_reported() {
    let err = SchemaFile::load(std::path::Path::new("/nonexistent/schema.json")).unwrap_err();

    assert!(matches!(err, MigrateError::SchemaFile { .. }));
}

#[test]
fn test_key_on_unknown_field_is_rejected() {
    let file = write(
        r#"{
          "name": "app",
          "tables": [
            {
              "name": "t_a",
              "columns": [
                { "field_name": "ID", "name": "f_id", "column_type": { "data_type": "int64" } }
              ],
              "keys": { "primary": ["Missing"] }
            }
          ]
        }"#,
    );

    let err = SchemaFile::load(file.path())
        .unwrap()
        .into_database()
        .unwrap_err();

    assert!(matches!(err, MigrateError::Sql(_)));
}
