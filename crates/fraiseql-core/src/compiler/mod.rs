//! GraphQL-to-`QCode` compilation.
//!
//! Turns a [`crate::graph::ParsedOperation`] plus a [`crate::schema::SchemaGraph`]
//! and a resolved role into [`QCode`]: every field bound to a table or
//! relationship, every filter role-and-argument AND-ed and simplified,
//! mutations topologically ordered. Compiled results are cached by
//! `(namespace, operation_name, role, database)` since compilation is pure
//! given those four inputs.

mod cache;
mod compile;
mod cursor;
mod expr;
mod qcode;

pub use cache::{CacheKey, CacheMetrics, CompilationCache};
pub use compile::Compiler;
pub use cursor::PlainCursor;
pub use expr::{Exp, ExpOp, ExpValue};
pub use qcode::{order_mutations, Field, Mutate, MutateOp, OrderBy, Paging, QCode, Select, SortDirection};
