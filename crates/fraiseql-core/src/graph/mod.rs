//! GraphQL document parsing.
//!
//! Turns request text into a fragment-free, directive-annotated AST. This
//! is purely syntactic: role-aware directive evaluation and schema
//! validation happen in the compiler once a role and schema are in scope.

mod ast;
mod parser;

pub use ast::{
    ArgValue, Directive, FieldNode, OperationKind, ParsedOperation, VarType, VariableDef,
};
pub use parser::parse;
