//! Execution errors.

use oxide_query::dialect::Dialect;
use oxide_query::BuildError;
use thiserror::Error;

/// An error raised while running statements.
///
/// Classify with [`is_conflict`](Self::is_conflict),
/// [`is_not_found`](Self::is_not_found) and
/// [`is_cancelled`](Self::is_cancelled) instead of matching driver messages.
#[derive(Debug, Error)]
pub enum SqlError {
    /// No row where exactly one was expected.
    #[error("record is not found")]
    NotFound,

    /// A unique or duplicate-key constraint was violated.
    #[error("record conflict: {0}")]
    Conflict(#[source] sqlx::Error),

    /// The context was cancelled or its deadline passed.
    #[error("operation cancelled")]
    Cancelled,

    /// Any other driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The statement could not be built.
    #[error("invalid statement: {0}")]
    Build(#[from] BuildError),

    /// Invalid connection settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SqlError {
    /// Maps a driver error, recognising unique violations reported either
    /// through sqlx's error kind or through the dialect's error code.
    pub(crate) fn classify(err: sqlx::Error, dialect: &dyn Dialect) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.code().as_deref() == Some(dialect.conflict_code()) =>
            {
                Self::Conflict(err)
            }
            _ => Self::Database(err),
        }
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for statement execution.
pub type Result<T> = std::result::Result<T, SqlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_query::dialect::MySql;

    #[test]
    fn test_row_not_found_is_not_found() {
        let err = SqlError::classify(sqlx::Error::RowNotFound, &MySql);
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = SqlError::classify(sqlx::Error::PoolTimedOut, &MySql);
        assert!(matches!(err, SqlError::Database(sqlx::Error::PoolTimedOut)));
        assert!(!err.is_cancelled());
    }
}
