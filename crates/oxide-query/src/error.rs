//! Construction errors.
//!
//! Anything that can be wrong with a statement or schema description is
//! reported while it is built. Rendering never fails.

use thiserror::Error;

/// An invalid statement, column type or table description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A tag carried an option the grammar does not know.
    #[error("unsupported column option `{0}`")]
    UnknownOption(String),

    /// A known tag option carried a malformed value.
    #[error("invalid value `{value}` for column option `{option}`")]
    InvalidOption {
        /// Option name.
        option: String,
        /// Offending value.
        value: String,
    },

    /// Auto-increment on something that is not a non-null integer.
    #[error("auto-increment column must be a non-null integer, got {0}")]
    InvalidAutoIncrement(String),

    /// Flat value list that cannot be split into rows.
    #[error("{values} values cannot be grouped into rows of {columns} columns")]
    ValueCount {
        /// Number of columns per row.
        columns: usize,
        /// Number of values given.
        values: usize,
    },

    /// A column list was required but empty.
    #[error("no columns given")]
    NoColumns,

    /// A field name that the table does not declare.
    #[error("table `{table}` has no field `{field}`")]
    UnknownField {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
    },

    /// A field declared twice in one table.
    #[error("table `{table}` declares field `{field}` twice")]
    DuplicateField {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
    },

    /// A deprecated column renamed to a column the table does not declare.
    #[error("column `{column}` of `{table}` is renamed to undeclared column `{target}`")]
    UndeclaredRenameTarget {
        /// Table name.
        table: String,
        /// Deprecated column.
        column: String,
        /// Missing rename target.
        target: String,
    },

    /// A malformed `@def` line.
    #[error("invalid key definition `{0}`")]
    InvalidKeyDef(String),
}

/// Result type for construction.
pub type Result<T> = std::result::Result<T, BuildError>;
