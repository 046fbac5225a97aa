//! Column types and the field tag grammar.
//!
//! A field tag looks like `f_name,size=255,default=''`: the database name
//! followed by options. Recognised options are `autoincrement`, `null`,
//! `size=<int>`, `decimal=<int>`, `default=<literal>`, `deprecated`,
//! `deprecated=<newName>` and `onupdate=<expr>`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

/// Semantic type of a column, mapped to a native type by each dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Bytes,
    Timestamp,
    Date,
    Json,
    /// Engine-specific type, see [`CustomType`].
    Custom(CustomType),
}

impl DataType {
    /// Whether values are whole numbers.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }

    /// Whether values are unsigned integers.
    #[must_use]
    pub const fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(custom) => write!(f, "custom({})", custom.name),
            other => write!(f, "{}", format!("{other:?}").to_lowercase()),
        }
    }
}

/// A native type given verbatim, optionally overridden per dialect.
///
/// Live columns read back from a database use this with the type string the
/// engine reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomType {
    /// Native type used when no override matches.
    pub name: String,
    /// Native type by dialect name (`mysql`, `postgres`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub per_dialect: BTreeMap<String, String>,
}

impl CustomType {
    /// Creates a custom type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            per_dialect: BTreeMap::new(),
        }
    }

    /// Adds an override for one dialect.
    #[must_use]
    pub fn with(mut self, dialect: &str, native: impl Into<String>) -> Self {
        self.per_dialect.insert(String::from(dialect), native.into());
        self
    }

    /// The native type for the dialect called `dialect`.
    #[must_use]
    pub fn for_dialect(&self, dialect: &str) -> &str {
        self.per_dialect.get(dialect).unwrap_or(&self.name)
    }
}

/// What migration does with a deprecated column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecatedActions {
    /// Database name of the column that replaces this one. `None` drops it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_to: Option<String>,
}

/// Type and modifiers of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub data_type: DataType,
    #[serde(default)]
    pub null: bool,
    /// Size for strings and bytes, precision for floats.
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub decimal: u64,
    #[serde(default)]
    pub auto_increment: bool,
    /// Raw SQL literal, rendered exactly as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Raw SQL expression for `ON UPDATE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecatedActions>,
}

impl ColumnType {
    /// A non-null column of `data_type` without modifiers.
    #[must_use]
    pub const fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            null: false,
            length: 0,
            decimal: 0,
            auto_increment: false,
            default: None,
            on_update: None,
            deprecated: None,
        }
    }

    /// Parses the options of a field tag. The leading name segment is
    /// ignored, so both `f_id,autoincrement` and `,autoincrement` work.
    ///
    /// # Errors
    ///
    /// Fails on unknown options, malformed numbers, and auto-increment on a
    /// nullable or non-integer type.
    pub fn from_tag(data_type: DataType, tag: &str) -> Result<Self> {
        let mut column_type = Self::new(data_type);

        for option in split_tag(tag).into_iter().skip(1) {
            let option = option.trim();
            if option.is_empty() {
                continue;
            }
            let (key, value) = match option.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (option, None),
            };

            match (key, value) {
                ("autoincrement", None) => column_type.auto_increment = true,
                ("null", None) => column_type.null = true,
                ("size", Some(v)) => column_type.length = parse_number(key, v)?,
                ("decimal", Some(v)) => column_type.decimal = parse_number(key, v)?,
                ("default", Some(v)) => column_type.default = Some(String::from(v)),
                ("onupdate", Some(v)) => column_type.on_update = Some(String::from(v)),
                ("deprecated", Some("")) => {
                    return Err(BuildError::InvalidOption {
                        option: String::from(key),
                        value: String::new(),
                    });
                }
                ("deprecated", rename) => {
                    column_type.deprecated = Some(DeprecatedActions {
                        rename_to: rename.map(String::from),
                    });
                }
                _ => return Err(BuildError::UnknownOption(String::from(option))),
            }
        }

        column_type.check()?;
        Ok(column_type)
    }

    /// Checks the auto-increment invariant.
    ///
    /// # Errors
    ///
    /// Fails when auto-increment is set on a nullable or non-integer type.
    pub fn check(&self) -> Result<()> {
        if self.auto_increment && (self.null || !self.data_type.is_integer()) {
            let described = if self.null {
                format!("nullable {}", self.data_type)
            } else {
                self.data_type.to_string()
            };
            return Err(BuildError::InvalidAutoIncrement(described));
        }
        Ok(())
    }

    /// Sets nullability.
    #[must_use]
    pub const fn nullable(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    /// Sets the size.
    #[must_use]
    pub const fn with_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    /// Sets the default literal.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Whether the column is marked deprecated.
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }
}

/// Splits a tag on commas that are not inside single quotes.
pub(crate) fn split_tag(tag: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in tag.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&tag[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tag[start..]);
    parts
}

fn parse_number(option: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| BuildError::InvalidOption {
        option: String::from(option),
        value: String::from(value),
    })
}
