//! Columns and column lists.

use serde::{Deserialize, Serialize};

use super::column_type::{split_tag, ColumnType, DataType};
use crate::builder::ex::{Ex, RenderContext, SqlExpr};
use crate::error::Result;

/// Reference from a column to `table.field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub table: String,
    pub field: String,
}

/// A table column.
///
/// Database names are always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Name of the model field backing the column.
    pub field_name: String,
    /// Name of the column in the database.
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
}

impl Column {
    /// Creates a column.
    #[must_use]
    pub fn new(field_name: impl Into<String>, name: &str, column_type: ColumnType) -> Self {
        Self {
            field_name: field_name.into(),
            name: name.to_lowercase(),
            column_type,
            description: Vec::new(),
            relation: None,
        }
    }

    /// Creates a column from a field tag such as `f_name,size=255`.
    ///
    /// Without a name segment the lower-cased field name is used.
    ///
    /// # Errors
    ///
    /// Fails when the tag options are invalid.
    pub fn from_tag(field_name: &str, data_type: DataType, tag: &str) -> Result<Self> {
        let column_type = ColumnType::from_tag(data_type, tag)?;
        let name = split_tag(tag)
            .first()
            .copied()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(field_name);
        Ok(Self::new(field_name, name, column_type))
    }

    /// Adds a description line.
    #[must_use]
    pub fn describe(mut self, line: impl Into<String>) -> Self {
        self.description.push(line.into());
        self
    }

    /// Marks the column as referencing `table.field`.
    #[must_use]
    pub fn relates_to(mut self, table: impl Into<String>, field: impl Into<String>) -> Self {
        self.relation = Some(Relation {
            table: table.into(),
            field: field.into(),
        });
        self
    }

    /// Whether migrations should rename or drop the column.
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.column_type.is_deprecated()
    }
}

impl SqlExpr for Column {
    fn ex(&self, _ctx: &RenderContext<'_>) -> Ex {
        Ex::new(self.name.as_str())
    }
}

/// An ordered list of columns, rendered as `a,b,c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Columns(Vec<Column>);

impl Columns {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a column.
    pub fn push(&mut self, column: Column) {
        self.0.push(column);
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    /// Database names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.name.as_str()).collect()
    }

    /// Column with the given database name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        let name = name.to_lowercase();
        self.0.iter().find(|c| c.name == name)
    }

    /// Column backing the given model field.
    #[must_use]
    pub fn by_field(&self, field_name: &str) -> Option<&Column> {
        self.0.iter().find(|c| c.field_name == field_name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.0.iter_mut().find(|c| c.name == name)
    }
}

impl From<Vec<Column>> for Columns {
    fn from(columns: Vec<Column>) -> Self {
        Self(columns)
    }
}

impl FromIterator<Column> for Columns {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl SqlExpr for Columns {
    fn is_nil(&self) -> bool {
        self.0.is_empty()
    }

    fn ex(&self, _ctx: &RenderContext<'_>) -> Ex {
        Ex::new(self.names().join(","))
    }
}
