//! Error types for migrations.

use std::path::PathBuf;

use oxide_db::SqlError;
use oxide_query::BuildError;

/// Errors that can occur while planning or applying a migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Reading the live definition of a table failed.
    #[error("Failed to introspect table '{table}': {source}")]
    Introspect {
        /// The table being read.
        table: String,
        /// The underlying failure.
        #[source]
        source: SqlError,
    },

    /// A statement of the plan failed. Statements before it stay applied.
    #[error("Migration statement failed: {statement}: {source}")]
    Statement {
        /// The failing statement.
        statement: String,
        /// The underlying failure.
        #[source]
        source: SqlError,
    },

    /// Writing to the progress sink failed.
    #[error("Failed to report progress: {0}")]
    Progress(#[source] std::io::Error),

    /// A table description is invalid.
    #[error("Invalid schema: {0}")]
    Build(#[from] BuildError),

    /// Connection or registry error outside of a plan statement.
    #[error("Database error: {0}")]
    Sql(#[from] SqlError),

    /// The schema file could not be read or parsed.
    #[error("Failed to load schema file '{path}': {message}")]
    SchemaFile {
        /// Path to the schema file.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
