use std::io::Write;
use std::process::{Command, Output};

fn schema_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn run(args: &[&str], schema: &tempfile::NamedTempFile) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oxide-db-migrate"))
        .args(["--database-url", "sqlite::memory:", "--dialect", "mysql"])
        .args(args)
        .arg(schema.path())
        .env_remove("DATABASE_URL")
        .output()
        .unwrap()
}

#[test]
fn test_plan_of_empty_schema_is_up_to_date() {
    let schema = schema_file(r#"{ "name": "app", "tables": [] }"#);

    let output = run(&["plan"], &schema);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Schema is up to date."), "{stdout}");
}

#[test]
fn test_migrate_dry_run_of_empty_schema() {
    let schema = schema_file(r#"{ "name": "app" }"#);

    let output = run(&["migrate", "--dry-run"], &schema);

    assert!(output.status.success(), "{output:?}");
}

#[test]
fn test_plan_reports_introspection_failure() {
    let schema = schema_file(
        r#"{
          "name": "app",
          "tables": [
            {
              "name": "t_a",
              "columns": [
                { "field_name": "ID", "name": "f_id", "column_type": { "data_type": "int64" } }
              ]
            }
          ]
        }"#,
    );

    let output = run(&["plan"], &schema);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to introspect table 't_a'"), "{stderr}");
}

#[test]
fn test_invalid_schema_file_fails() {
    let schema = schema_file("[]");

    let output = run(&["plan"], &schema);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load schema file"), "{stderr}");
}
