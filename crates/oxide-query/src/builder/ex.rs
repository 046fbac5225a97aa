//! Expression core.
//!
//! Every node of a statement tree implements [`SqlExpr`] and renders itself
//! into an [`Ex`]: SQL text with neutral `?` placeholders plus the ordered
//! arguments for those placeholders. A parent splices the text of a child
//! verbatim and appends the child's arguments, so argument order always
//! follows placeholder order.

use std::fmt;
use std::sync::Arc;

use super::value::SqlValue;
use crate::dialect::{rewrite_placeholders, Dialect};

/// Named render switches.
///
/// The same expression tree may render differently depending on the
/// toggles in effect, e.g. an assignment list renders as `a = ?, b = ?`
/// normally and as `(a,b) VALUES (?,?)` with [`Toggles::use_values`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggles {
    /// Render column/value assignments as a `VALUES` list.
    pub use_values: bool,
}

impl Toggles {
    /// Returns toggles with the `VALUES` list rendering switched on or off.
    #[must_use]
    pub const fn with_use_values(mut self, on: bool) -> Self {
        self.use_values = on;
        self
    }
}

/// Context handed to every render call.
#[derive(Clone, Copy, Default)]
pub struct RenderContext<'a> {
    dialect: Option<&'a dyn Dialect>,
    toggles: Toggles,
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("dialect", &self.dialect.map(|d| d.name()))
            .field("toggles", &self.toggles)
            .finish()
    }
}

impl<'a> RenderContext<'a> {
    /// Creates a dialect-neutral context with default toggles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context rendering for the given dialect.
    #[must_use]
    pub fn with_dialect(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect: Some(dialect),
            toggles: Toggles::default(),
        }
    }

    /// Returns a copy of this context with other toggles.
    #[must_use]
    pub const fn with_toggles(mut self, toggles: Toggles) -> Self {
        self.toggles = toggles;
        self
    }

    /// The active dialect, if any.
    #[must_use]
    pub fn dialect(&self) -> Option<&'a dyn Dialect> {
        self.dialect
    }

    /// The active toggles.
    #[must_use]
    pub const fn toggles(&self) -> Toggles {
        self.toggles
    }
}

/// A renderable SQL node.
pub trait SqlExpr: fmt::Debug + Send + Sync {
    /// Whether the node stands for "nothing".
    ///
    /// Nil nodes are skipped by their parents: a nil condition passed to
    /// `and` vanishes, a nil `WHERE` addition is not rendered.
    fn is_nil(&self) -> bool {
        false
    }

    /// Renders the node.
    fn ex(&self, ctx: &RenderContext<'_>) -> Ex;
}

impl<T: SqlExpr + ?Sized> SqlExpr for &T {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        (**self).ex(ctx)
    }
}

impl<T: SqlExpr + ?Sized> SqlExpr for Box<T> {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        (**self).ex(ctx)
    }
}

impl<T: SqlExpr + ?Sized> SqlExpr for Arc<T> {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        (**self).ex(ctx)
    }
}

/// Renders an expression in a dialect-neutral context.
#[must_use]
pub fn render(expr: &dyn SqlExpr) -> Ex {
    expr.ex(&RenderContext::new())
}

/// Rendered SQL text and its positional arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ex {
    sql: String,
    args: Vec<SqlValue>,
}

impl Ex {
    /// Creates a raw fragment without arguments.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Creates a raw fragment with arguments for its `?` placeholders.
    #[must_use]
    pub fn with_args(sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// The SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The arguments, in placeholder order.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Splits into text and arguments.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.args)
    }

    /// The text with every placeholder replaced by its escaped argument.
    ///
    /// For logging only; never execute the result.
    #[must_use]
    pub fn inline_sql(&self) -> String {
        let mut args = self.args.iter();
        rewrite_placeholders(&self.sql, |_| {
            args.next()
                .map_or_else(|| String::from("?"), SqlValue::to_sql_inline)
        })
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Appends raw text.
    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Appends a single character.
    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Appends a `?` placeholder bound to `value`.
    pub fn write_arg(&mut self, value: SqlValue) {
        self.sql.push('?');
        self.args.push(value);
    }

    /// Appends `?,?,...` for each value.
    pub fn write_args(&mut self, values: impl IntoIterator<Item = SqlValue>) {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push(',');
            }
            self.write_arg(value);
        }
    }

    /// Splices another rendered fragment.
    pub fn append(&mut self, other: Self) {
        self.sql.push_str(&other.sql);
        self.args.extend(other.args);
    }

    /// Renders `expr` and splices it. Nil expressions write nothing.
    pub fn write_expr(&mut self, expr: &dyn SqlExpr, ctx: &RenderContext<'_>) {
        if !expr.is_nil() {
            self.append(expr.ex(ctx));
        }
    }

    /// Writes `(` ... `)` around whatever `f` writes.
    pub fn write_group(&mut self, f: impl FnOnce(&mut Self)) {
        self.sql.push('(');
        f(self);
        self.sql.push(')');
    }
}

impl SqlExpr for Ex {
    fn is_nil(&self) -> bool {
        self.sql.is_empty()
    }

    fn ex(&self, _ctx: &RenderContext<'_>) -> Ex {
        self.clone()
    }
}

impl From<&str> for Ex {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}
