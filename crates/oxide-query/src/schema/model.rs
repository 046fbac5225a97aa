//! Binding between Rust types and tables.

use super::table::Table;
use crate::builder::value::SqlValue;
use crate::error::Result;

/// A type stored in a table.
///
/// Implementations describe the table explicitly (usually through
/// [`Column::from_tag`](super::Column::from_tag) and
/// [`Keys::from_defs`](super::Keys::from_defs)) and expose their field values
/// for inserts and updates. Row scanning is left to `sqlx::FromRow`.
pub trait Model {
    /// Database table name.
    fn table_name() -> &'static str;

    /// Columns and keys of the table.
    ///
    /// # Errors
    ///
    /// Fails when a tag or key definition is malformed.
    fn describe() -> Result<Table>;

    /// Field values by field name, in declaration order.
    fn field_values(&self) -> FieldValues;
}

/// Ordered field name to value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues(Vec<(String, SqlValue)>);

impl FieldValues {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets a field, replacing an earlier value.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => slot.1 = value,
            None => self.0.push((String::from(field), value)),
        }
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.0.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps fields with a non-zero value, plus the fields listed in
    /// `zero_fields` whatever their value.
    #[must_use]
    pub fn non_zero(self, zero_fields: &[&str]) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|(name, value)| !value.is_zero() || zero_fields.contains(&name.as_str()))
                .collect(),
        )
    }
}
