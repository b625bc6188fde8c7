//! `Exp`: the boolean expression tree shared by ABAC filters, field
//! arguments, and `HAVING` clauses.
//!
//! Values start out as either a literal JSON value or a reference to a
//! bind site (`Exp::Val`), and are only replaced with positional
//! parameters during binding ([`crate::bind`]).

use serde::{Deserialize, Serialize};

/// Comparison and pattern operators an `Exp::Op` node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
    In,
    NotIn,
    Like,
    ILike,
    IsNull,
    IsNotNull,
    /// JSONB `?` containment: does the document have this key.
    HasKey,
    /// `@>` containment.
    Contains,
    /// Full-text search via `to_tsquery`/`plainto_tsquery`.
    TsQuery,
}

/// A value referenced by an `Exp` leaf: either known at compile time or
/// deferred to a named bind site resolved from GraphQL variables/context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpValue {
    Literal(serde_json::Value),
    /// A GraphQL variable, e.g. `$minAge`.
    Variable(String),
    /// Request context, e.g. `user_id`, `user_role`, `cursor`.
    Context(String),
}

/// The expression tree. `And`/`Or` are n-ary so the renderer can fold
/// repeated ANDs (role filter, field argument, parent-cursor bound) into a
/// single flat `WHERE` clause without nested parens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Exp {
    Op { column: String, op: ExpOp, value: ExpValue },
    And(Vec<Exp>),
    Or(Vec<Exp>),
    Not(Box<Exp>),
    /// Always-true; folds out during simplification.
    True,
}

impl Exp {
    #[must_use]
    pub fn eq(column: impl Into<String>, value: ExpValue) -> Self {
        Self::Op { column: column.into(), op: ExpOp::Equals, value }
    }

    #[must_use]
    pub fn and(mut clauses: Vec<Exp>) -> Self {
        clauses.retain(|c| !matches!(c, Exp::True));
        match clauses.len() {
            0 => Exp::True,
            1 => clauses.into_iter().next().unwrap(),
            _ => Exp::And(clauses),
        }
    }

    /// Flatten nested `And` nodes produced by successive AND-ing of role
    /// filters, field arguments, and pagination bounds.
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Exp::And(clauses) => {
                let mut flat = Vec::with_capacity(clauses.len());
                for c in clauses {
                    match c.simplify() {
                        Exp::And(inner) => flat.extend(inner),
                        Exp::True => {}
                        other => flat.push(other),
                    }
                }
                Exp::and(flat)
            }
            Exp::Or(clauses) => Exp::Or(clauses.into_iter().map(Exp::simplify).collect()),
            Exp::Not(inner) => Exp::Not(Box::new(inner.simplify())),
            other => other,
        }
    }

    /// Every variable name referenced anywhere in the tree, for the
    /// argument binder's required-variable check.
    pub fn referenced_variables(&self, out: &mut Vec<String>) {
        match self {
            Exp::Op { value: ExpValue::Variable(name), .. } => out.push(name.clone()),
            Exp::Op { .. } => {}
            Exp::And(cs) | Exp::Or(cs) => cs.iter().for_each(|c| c.referenced_variables(out)),
            Exp::Not(inner) => inner.referenced_variables(out),
            Exp::True => {}
        }
    }
}
