//! Schema migration.
//!
//! [`diff`] compares a live table, as read back from the database, with its
//! declaration and yields a [`Plan`] of DDL statements. Executing a plan is
//! left to the caller.

mod diff;
mod operation;

pub use diff::diff;
pub use operation::{Operation, Plan, Step};
