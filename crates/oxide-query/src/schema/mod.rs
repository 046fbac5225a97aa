//! Schema description: tables, columns, column types and keys.
//!
//! Tables are described explicitly, either directly or through the field tag
//! grammar ([`Column::from_tag`]) and the `@def` key grammar
//! ([`Keys::from_defs`]).

mod column;
mod column_type;
mod key;
mod model;
mod table;

pub use column::{Column, Columns, Relation};
pub use column_type::{ColumnType, CustomType, DataType, DeprecatedActions};
pub use key::{Key, KeyKind, Keys, PRIMARY_KEY_NAME};
pub use model::{FieldValues, Model};
pub use table::{Table, Tables};
