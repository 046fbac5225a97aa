//! Primary keys, indexes and the `@def` key grammar.
//!
//! Keys are declared on model doc comments:
//!
//! ```text
//! @def primary ID
//! @def index I_nickname/BTREE Nickname
//! @def unique_index I_name Name
//! @def index I_geom/SPATIAL (#Geom)
//! ```
//!
//! An index name may carry a `/METHOD` suffix which is handed to the
//! dialect untouched.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

/// Name under which the primary key appears in [`Keys::all`].
pub const PRIMARY_KEY_NAME: &str = "primary";

/// Keys of a table, by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keys {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary: Vec<String>,
    /// `name[/METHOD]` to fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indexes: BTreeMap<String, Vec<String>>,
    /// `name[/METHOD]` to fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unique_indexes: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition: Vec<String>,
}

/// Kind of a [`Key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyKind {
    Primary,
    Index,
    UniqueIndex,
}

/// One key of a table, resolved from [`Keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub kind: KeyKind,
    /// Lower-cased name without the method suffix.
    pub name: String,
    pub method: Option<String>,
    /// Field names (or database names for introspected tables).
    pub fields: Vec<String>,
}

impl Key {
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.kind == KeyKind::Primary
    }

    #[must_use]
    pub fn is_unique(&self) -> bool {
        matches!(self.kind, KeyKind::Primary | KeyKind::UniqueIndex)
    }
}

impl Keys {
    /// Sets the primary key.
    #[must_use]
    pub fn with_primary<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.primary = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an index; `name` may end with `/METHOD`.
    #[must_use]
    pub fn with_index<S: Into<String>>(
        mut self,
        name: &str,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.indexes
            .insert(String::from(name), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a unique index; `name` may end with `/METHOD`.
    #[must_use]
    pub fn with_unique_index<S: Into<String>>(
        mut self,
        name: &str,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.unique_indexes
            .insert(String::from(name), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the partition fields.
    #[must_use]
    pub fn with_partition<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.partition = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.indexes.is_empty() && self.unique_indexes.is_empty()
    }

    /// Parses `@def` lines out of doc comment lines. Other lines are ignored.
    ///
    /// # Errors
    ///
    /// Fails on a `@def` line with an unknown kind or without fields.
    pub fn from_defs<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        static DEF: OnceLock<Regex> = OnceLock::new();
        let def = DEF.get_or_init(|| {
            Regex::new(r"^@def\s+(\S+)\s*(.*)$").expect("Invalid key definition regex")
        });

        let mut keys = Self::default();
        for line in lines {
            let line = line.trim();
            if !line.starts_with("@def") {
                continue;
            }
            let invalid = || BuildError::InvalidKeyDef(String::from(line));
            let caps = def.captures(line).ok_or_else(invalid)?;
            let args: Vec<String> = caps[2]
                .split_whitespace()
                .map(|token| token.trim_matches(|c: char| c == '(' || c == ')' || c == '#'))
                .filter(|token| !token.is_empty())
                .map(String::from)
                .collect();

            match &caps[1] {
                "primary" => {
                    if args.is_empty() {
                        return Err(invalid());
                    }
                    keys.primary = args;
                }
                kind @ ("index" | "unique_index") => {
                    let (name, fields) = args.split_first().ok_or_else(invalid)?;
                    if fields.is_empty() {
                        return Err(invalid());
                    }
                    let target = if kind == "index" {
                        &mut keys.indexes
                    } else {
                        &mut keys.unique_indexes
                    };
                    target.insert(name.clone(), fields.to_vec());
                }
                _ => return Err(invalid()),
            }
        }
        Ok(keys)
    }

    /// All keys: the primary key first, then indexes and unique indexes
    /// together in lexicographic name order.
    #[must_use]
    pub fn all(&self) -> Vec<Key> {
        let mut keys = Vec::new();
        if !self.primary.is_empty() {
            keys.push(Key {
                kind: KeyKind::Primary,
                name: String::from(PRIMARY_KEY_NAME),
                method: None,
                fields: self.primary.clone(),
            });
        }

        let named = self
            .indexes
            .iter()
            .map(|entry| (KeyKind::Index, entry))
            .chain(
                self.unique_indexes
                    .iter()
                    .map(|entry| (KeyKind::UniqueIndex, entry)),
            );
        let mut rest: Vec<Key> = named
            .map(|(kind, (raw_name, fields))| {
                let (name, method) = split_method(raw_name);
                Key {
                    kind,
                    name,
                    method,
                    fields: fields.clone(),
                }
            })
            .collect();
        rest.sort_by(|a, b| a.name.cmp(&b.name).then(a.kind.cmp(&b.kind)));
        keys.extend(rest);
        keys
    }
}

/// Splits `I_name/BTREE` into `("i_name", Some("BTREE"))`.
fn split_method(raw: &str) -> (String, Option<String>) {
    match raw.split_once('/') {
        Some((name, method)) if !method.is_empty() => {
            (name.to_lowercase(), Some(method.to_uppercase()))
        }
        Some((name, _)) => (name.to_lowercase(), None),
        None => (raw.to_lowercase(), None),
    }
}
