//! Boolean conditions and the `AND` / `OR` / `XOR` combinators.
//!
//! Rules:
//! - nil children are dropped; a combinator left with no child is nil, one
//!   with a single child is that child;
//! - children combined with the same operator are flattened into one list;
//! - every child of a combinator is wrapped in parentheses, the outermost
//!   combinator is not.
//!
//! ```rust
//! use oxide_query::builder::{col, render};
//!
//! let cond = col("a")
//!     .eq(1)
//!     .and(col("b").left_like("text"))
//!     .or(col("a").eq(2));
//! assert_eq!(render(&cond).sql(), "((a = ?) AND (b LIKE ?)) OR (a = ?)");
//! ```

use std::fmt;

use super::ex::{Ex, RenderContext, SqlExpr};

/// A boolean combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
    Xor,
}

impl Logic {
    /// SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Nil,
    Leaf(Ex),
    Composed(Logic, Vec<Condition>),
}

/// A condition usable in `WHERE`, `HAVING` and `ON`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(Node);

impl Condition {
    /// The absent condition.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Node::Nil)
    }

    /// A predicate from an already rendered fragment. An empty fragment is
    /// nil.
    #[must_use]
    pub fn leaf(ex: Ex) -> Self {
        if ex.is_empty() {
            Self::nil()
        } else {
            Self(Node::Leaf(ex))
        }
    }

    /// Combines conditions with `logic`.
    #[must_use]
    pub fn compose<C: Into<Self>>(logic: Logic, conditions: impl IntoIterator<Item = C>) -> Self {
        let mut children = Vec::new();
        for condition in conditions {
            match condition.into().0 {
                Node::Nil => {}
                Node::Composed(op, nested) if op == logic => children.extend(nested),
                node => children.push(Self(node)),
            }
        }
        match children.len() {
            0 => Self::nil(),
            1 => children.remove(0),
            _ => Self(Node::Composed(logic, children)),
        }
    }

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: impl Into<Self>) -> Self {
        Self::compose(Logic::And, [self, other.into()])
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: impl Into<Self>) -> Self {
        Self::compose(Logic::Or, [self, other.into()])
    }

    /// `self XOR other`.
    #[must_use]
    pub fn xor(self, other: impl Into<Self>) -> Self {
        Self::compose(Logic::Xor, [self, other.into()])
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::nil()
    }
}

impl From<Option<Self>> for Condition {
    fn from(condition: Option<Self>) -> Self {
        condition.unwrap_or_default()
    }
}

impl From<Ex> for Condition {
    fn from(ex: Ex) -> Self {
        Self::leaf(ex)
    }
}

impl SqlExpr for Condition {
    fn is_nil(&self) -> bool {
        matches!(self.0, Node::Nil)
    }

    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        match &self.0 {
            Node::Nil => Ex::default(),
            Node::Leaf(ex) => ex.clone(),
            Node::Composed(logic, children) => {
                let mut ex = Ex::default();
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        ex.write_char(' ');
                        ex.write_str(logic.as_str());
                        ex.write_char(' ');
                    }
                    ex.write_group(|ex| ex.write_expr(child, ctx));
                }
                ex
            }
        }
    }
}

/// `AND` of all non-nil conditions.
#[must_use]
pub fn and<C: Into<Condition>>(conditions: impl IntoIterator<Item = C>) -> Condition {
    Condition::compose(Logic::And, conditions)
}

/// `OR` of all non-nil conditions.
#[must_use]
pub fn or<C: Into<Condition>>(conditions: impl IntoIterator<Item = C>) -> Condition {
    Condition::compose(Logic::Or, conditions)
}

/// `XOR` of all non-nil conditions.
#[must_use]
pub fn xor<C: Into<Condition>>(conditions: impl IntoIterator<Item = C>) -> Condition {
    Condition::compose(Logic::Xor, conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ex::render;
    use crate::builder::expr::col;
    use crate::builder::value::SqlValue;

    #[test]
    fn test_nil_children_are_dropped() {
        let cond = and([col("a").eq(1), Condition::nil(), Condition::nil()]);
        assert_eq!(cond, col("a").eq(1));
        assert!(and(Vec::<Condition>::new()).is_nil());
        assert!(or([None::<Condition>, None]).is_nil());
    }

    #[test]
    fn test_single_child_collapses_without_parens() {
        let cond = xor([Condition::nil(), col("d").like("e")]);
        assert_eq!(render(&cond).sql(), "d LIKE ?");
    }

    #[test]
    fn test_same_operator_flattens() {
        let nested = and([and([col("a").eq(1), col("b").eq(2)]), col("c").eq(3)]);
        let flat = and([col("a").eq(1), col("b").eq(2), col("c").eq(3)]);
        assert_eq!(render(&nested), render(&flat));
        assert_eq!(render(&flat).sql(), "(a = ?) AND (b = ?) AND (c = ?)");
    }

    #[test]
    fn test_operator_mixing_parenthesizes() {
        let cond = xor([
            or([and([col("a").eq(1), col("b").eq(2)]), col("c").eq(3)]),
            col("d").eq(4),
        ]);
        assert_eq!(
            render(&cond).sql(),
            "(((a = ?) AND (b = ?)) OR (c = ?)) XOR (d = ?)"
        );
        assert_eq!(
            render(&cond).args(),
            &[
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Int(4)
            ]
        );
    }

    #[test]
    fn test_chain_matches_free_functions() {
        let chained = col("a").eq(1).and(col("b").eq(2));
        let free = and([col("a").eq(1), col("b").eq(2)]);
        assert_eq!(chained, free);
    }

    #[test]
    fn test_nil_combinator_is_absorbed() {
        let cond = and([col("a").eq(1), or(Vec::<Condition>::new())]);
        assert_eq!(render(&cond).sql(), "a = ?");
    }
}
