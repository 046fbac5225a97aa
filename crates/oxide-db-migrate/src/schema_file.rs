//! Declared schemas stored as JSON.

use std::path::Path;

use oxide_db::Database;
use oxide_query::schema::Table;
use serde::Deserialize;

use crate::error::{MigrateError, Result};

/// The JSON form of a [`Database`].
///
/// ```json
/// {
///   "name": "app",
///   "schema": "billing",
///   "tables": [{ "name": "t_account", "columns": [], "keys": {} }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaFile {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl SchemaFile {
    /// Reads and parses `path`.
    ///
    /// # Errors
    ///
    /// [`MigrateError::SchemaFile`] when the file is unreadable or invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let failed = |message: String| MigrateError::SchemaFile {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| failed(e.to_string()))
    }

    /// Registers every table.
    ///
    /// # Errors
    ///
    /// Fails on the first table breaking an invariant.
    pub fn into_database(self) -> Result<Database> {
        let mut database = Database::new(self.name);
        if let Some(schema) = self.schema {
            database = database.with_schema(schema);
        }
        for table in self.tables {
            database.add_table(table)?;
        }
        Ok(database)
    }
}
