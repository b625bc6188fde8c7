//! GraphQL document parsing.
//!
//! Wraps `graphql_parser` with the engine's own AST: fragment spreads and
//! inline fragments are resolved into plain field lists here so nothing
//! downstream needs to know fragments ever existed.

use super::ast::{
    ArgValue, Directive, FieldNode, OperationKind, ParsedOperation, VarType, VariableDef,
};
use crate::error::{Error, Result};
use graphql_parser::query::{self, Definition, OperationDefinition, Selection, Value};
use std::collections::HashMap;

/// Parse a GraphQL request document into a single operation.
///
/// When the document defines more than one operation, `operation_name`
/// selects which one to compile; it is required in that case, matching the
/// GraphQL-over-HTTP convention.
pub fn parse(document: &str, operation_name: Option<&str>) -> Result<ParsedOperation> {
    let doc = query::parse_query::<String>(document)
        .map_err(|e| Error::parse(format!("invalid GraphQL document: {e}")))?;

    let mut fragments = HashMap::new();
    let mut operations = Vec::new();
    for def in &doc.definitions {
        match def {
            Definition::Fragment(f) => {
                fragments.insert(f.name.clone(), f.clone());
            }
            Definition::Operation(op) => operations.push(op),
        }
    }

    let op = select_operation(&operations, operation_name)?;
    let empty_defs = Vec::new();
    let (kind, name, selection_set, variable_definitions) = match op {
        OperationDefinition::Query(q) => {
            (OperationKind::Query, q.name.clone(), &q.selection_set, &q.variable_definitions)
        }
        OperationDefinition::Mutation(m) => {
            (OperationKind::Mutation, m.name.clone(), &m.selection_set, &m.variable_definitions)
        }
        OperationDefinition::Subscription(s) => {
            (OperationKind::Subscription, s.name.clone(), &s.selection_set, &s.variable_definitions)
        }
        OperationDefinition::SelectionSet(sel) => (OperationKind::Query, None, sel, &empty_defs),
    };

    let variables = variable_definitions.iter().map(lower_variable_def).collect();
    let fields = lower_selections(&selection_set.items, &fragments, 0)?;

    Ok(ParsedOperation { kind, name, variables, fields })
}

fn select_operation<'a>(
    operations: &[&'a OperationDefinition<'a, String>],
    operation_name: Option<&str>,
) -> Result<&'a OperationDefinition<'a, String>> {
    if operations.is_empty() {
        return Err(Error::parse("document contains no operations"));
    }
    if operations.len() == 1 {
        return Ok(operations[0]);
    }
    let wanted = operation_name
        .ok_or_else(|| Error::parse("operation_name is required when a document defines more than one operation"))?;
    operations
        .iter()
        .copied()
        .find(|op| operation_def_name(op).as_deref() == Some(wanted))
        .ok_or_else(|| Error::parse(format!("no operation named '{wanted}' in document")))
}

fn operation_def_name(op: &OperationDefinition<'_, String>) -> Option<String> {
    match op {
        OperationDefinition::Query(q) => q.name.clone(),
        OperationDefinition::Mutation(m) => m.name.clone(),
        OperationDefinition::Subscription(s) => s.name.clone(),
        OperationDefinition::SelectionSet(_) => None,
    }
}

/// Recursion depth guard against pathological fragment cycles.
const MAX_FRAGMENT_DEPTH: u32 = 32;

fn lower_selections(
    items: &[Selection<'_, String>],
    fragments: &HashMap<String, query::FragmentDefinition<'_, String>>,
    depth: u32,
) -> Result<Vec<FieldNode>> {
    if depth > MAX_FRAGMENT_DEPTH {
        return Err(Error::parse("fragment nesting exceeds the maximum depth"));
    }

    let mut out = Vec::new();
    for item in items {
        match item {
            Selection::Field(field) => {
                let arguments = field
                    .arguments
                    .iter()
                    .map(|(name, value)| (name.clone(), lower_value(value)))
                    .collect();
                let directives = field.directives.iter().map(lower_directive).collect();
                let selections = lower_selections(&field.selection_set.items, fragments, depth + 1)?;
                out.push(FieldNode {
                    name: field.name.clone(),
                    alias: field.alias.clone(),
                    arguments,
                    directives,
                    selections,
                });
            }
            Selection::InlineFragment(frag) => {
                out.extend(lower_selections(&frag.selection_set.items, fragments, depth + 1)?);
            }
            Selection::FragmentSpread(spread) => {
                let def = fragments.get(&spread.fragment_name).ok_or_else(|| {
                    Error::parse(format!("unknown fragment '{}'", spread.fragment_name))
                })?;
                out.extend(lower_selections(&def.selection_set.items, fragments, depth + 1)?);
            }
        }
    }
    Ok(out)
}

fn lower_directive(d: &query::Directive<'_, String>) -> Directive {
    Directive {
        name: d.name.clone(),
        arguments: d.arguments.iter().map(|(k, v)| (k.clone(), lower_value(v))).collect(),
    }
}

fn lower_variable_def(v: &query::VariableDefinition<'_, String>) -> VariableDef {
    VariableDef {
        name: v.name.clone(),
        var_type: lower_type(&v.var_type),
        default_value: v.default_value.as_ref().map(lower_value),
    }
}

fn lower_type(t: &query::Type<'_, String>) -> VarType {
    match t {
        query::Type::NamedType(name) => VarType { name: name.clone(), list: false, non_null: false },
        query::Type::ListType(inner) => {
            let mut v = lower_type(inner);
            v.list = true;
            v
        }
        query::Type::NonNullType(inner) => {
            let mut v = lower_type(inner);
            v.non_null = true;
            v
        }
    }
}

fn lower_value(value: &Value<'_, String>) -> ArgValue {
    match value {
        Value::String(s) => ArgValue::String(s.clone()),
        Value::Int(i) => ArgValue::Int(i.as_i64().unwrap_or_default()),
        Value::Float(f) => ArgValue::Float(*f),
        Value::Boolean(b) => ArgValue::Boolean(*b),
        Value::Null => ArgValue::Null,
        Value::Enum(e) => ArgValue::Enum(e.clone()),
        Value::Variable(v) => ArgValue::Variable(v.clone()),
        Value::List(items) => ArgValue::List(items.iter().map(lower_value).collect()),
        Value::Object(obj) => {
            ArgValue::Object(obj.iter().map(|(k, v)| (k.clone(), lower_value(v))).collect())
        }
    }
}
