//! Parsed-document types.
//!
//! These are the engine's own representation of a GraphQL document: plain,
//! owned data with fragments already inlined and directives still attached
//! (directive evaluation happens during compilation, once the role and
//! variables are known).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The root operation kind a document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

/// A literal or variable-referencing argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Enum(String),
    Variable(String),
    List(Vec<ArgValue>),
    Object(HashMap<String, ArgValue>),
}

impl ArgValue {
    /// Name of the variable this value defers to, if it is one.
    #[must_use]
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Render as a `serde_json::Value`, leaving variable references as a
    /// tagged object so a later binding pass can still spot them.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Int(i) => serde_json::json!(i),
            Self::Float(f) => serde_json::json!(f),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Null => serde_json::Value::Null,
            Self::Enum(e) => serde_json::Value::String(e.clone()),
            Self::Variable(name) => serde_json::json!({"$var": name}),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

/// A `@skip`/`@include`/`@remove(ifRole: ...)` directive attached to a
/// field or fragment spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    pub arguments: HashMap<String, ArgValue>,
}

impl Directive {
    /// Boolean-valued `if:` argument used by `@skip`/`@include`.
    #[must_use]
    pub fn if_arg(&self) -> Option<&ArgValue> {
        self.arguments.get("if")
    }

    /// String-valued `ifRole:` argument used by `@remove`.
    #[must_use]
    pub fn if_role_arg(&self) -> Option<&str> {
        match self.arguments.get("ifRole") {
            Some(ArgValue::String(s)) => Some(s.as_str()),
            Some(ArgValue::Enum(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Declared type of a variable, e.g. `ID!`, `[Int]`, `String`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarType {
    pub name: String,
    pub list: bool,
    pub non_null: bool,
}

/// A `$name: Type = default` declaration on an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub var_type: VarType,
    pub default_value: Option<ArgValue>,
}

/// One field selection, with fragments already inlined into
/// `selections`/`directives`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: HashMap<String, ArgValue>,
    pub directives: Vec<Directive>,
    pub selections: Vec<FieldNode>,
}

impl FieldNode {
    /// The name a response key / rendered subquery should use: the alias
    /// when present, otherwise the field name.
    #[must_use]
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A fully parsed, fragment-inlined operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedOperation {
    pub kind: OperationKind,
    pub name: Option<String>,
    pub variables: Vec<VariableDef>,
    pub fields: Vec<FieldNode>,
}
