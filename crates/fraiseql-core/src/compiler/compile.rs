//! Query and mutation compilation: `ParsedOperation` + `SchemaGraph` + role
//! → `QCode`.
//!
//! Compilation resolves every selected field to a table or relationship,
//! evaluates `@skip`/`@include`/`@remove(ifRole)` directives now that the
//! role is known, AND-s the role's ABAC filter onto every table a query
//! touches, and orders mutations by their dependency graph.

use super::cache::{CacheKey, CompilationCache};
use super::expr::{Exp, ExpOp, ExpValue};
use super::qcode::{Field, OrderBy, Paging, QCode, Select, SortDirection};
use crate::config::RoleConfig;
use crate::error::{Error, Result};
use crate::graph::{ArgValue, FieldNode, OperationKind, ParsedOperation};
use crate::schema::{SchemaGraph, TableId};
use std::sync::Arc;

/// Compiles parsed operations against one schema and cache instance.
pub struct Compiler {
    schema: Arc<SchemaGraph>,
    cache: CompilationCache,
}

impl Compiler {
    #[must_use]
    pub fn new(schema: Arc<SchemaGraph>, cache_entries: usize) -> Self {
        Self { schema, cache: CompilationCache::new(cache_entries) }
    }

    /// Compile an operation for `role`, reusing a cached `QCode` when the
    /// (namespace, operation name, role, database) key matches.
    pub fn compile(
        &self,
        op: &ParsedOperation,
        role: &str,
        role_config: Option<&RoleConfig>,
        database: &str,
    ) -> Result<Arc<QCode>> {
        let op_name = op.name.clone().unwrap_or_default();
        let key = CacheKey {
            namespace: String::new(),
            operation_name: op_name,
            role: role.to_string(),
            database: database.to_string(),
        };
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let qcode = Arc::new(self.compile_uncached(op, role, role_config)?);
        self.cache.put(key, qcode.clone());
        Ok(qcode)
    }

    fn compile_uncached(&self, op: &ParsedOperation, role: &str, role_config: Option<&RoleConfig>) -> Result<QCode> {
        let live_fields = evaluate_directives(&op.fields, role)?;
        match op.kind {
            OperationKind::Query | OperationKind::Subscription => {
                let selects = live_fields
                    .iter()
                    .map(|f| self.compile_select(f, role, role_config))
                    .collect::<Result<Vec<_>>>()?;
                if op.kind == OperationKind::Subscription {
                    let select = selects
                        .into_iter()
                        .next()
                        .ok_or_else(|| Error::SubscriptionProtocol { message: "subscription has no root field".into() })?;
                    Ok(QCode::Subscription(select))
                } else {
                    Ok(QCode::Query(selects))
                }
            }
            OperationKind::Mutation => {
                let mutates = live_fields
                    .iter()
                    .map(|f| self.compile_mutate(f, role, role_config))
                    .collect::<Result<Vec<_>>>()?;
                super::qcode::order_mutations(&mutates)?;
                Ok(QCode::Mutation(mutates))
            }
        }
    }

    fn table_for(&self, field_name: &str) -> Result<(TableId, &crate::schema::Table)> {
        let id = self
            .schema
            .table_id(field_name)
            .ok_or_else(|| Error::schema_mismatch(format!("no table or relationship named '{field_name}'")))?;
        Ok((id, self.schema.table(id)))
    }

    fn role_filter(&self, table_name: &str, role_config: Option<&RoleConfig>) -> Result<Exp> {
        let Some(policy) = role_config.and_then(|r| r.tables.get(table_name)) else {
            return Ok(Exp::True);
        };
        let Some(filter) = &policy.filter else { return Ok(Exp::True) };
        parse_filter_string(filter)
    }

    fn check_mutation_allowed(&self, table_name: &str, role_config: Option<&RoleConfig>, op: MutationKind) -> Result<()> {
        let Some(policy) = role_config.and_then(|r| r.tables.get(table_name)) else {
            return Err(Error::role_denied("(unconfigured)", format!("no policy for table '{table_name}'")));
        };
        let allowed = match op {
            MutationKind::Insert => policy.insert,
            MutationKind::Update => policy.update,
            MutationKind::Delete => policy.delete,
        };
        if allowed {
            Ok(())
        } else {
            Err(Error::role_denied("(role)", format!("{op:?} denied on table '{table_name}'")))
        }
    }

    fn compile_select(&self, field: &FieldNode, role: &str, role_config: Option<&RoleConfig>) -> Result<Select> {
        let (table_id, table) = self.table_for(&field.name)?;
        let hidden = role_config
            .and_then(|r| r.tables.get(&field.name))
            .map(|p| p.hidden_columns.clone())
            .unwrap_or_default();

        let mut fields = Vec::new();
        for sel in evaluate_directives(&field.selections, role)? {
            if hidden.iter().any(|h| h == &sel.name) {
                return Err(Error::role_denied(role, format!("column '{}' is hidden for this role", sel.name)));
            }
            if table.has_column(&sel.name) && sel.selections.is_empty() {
                fields.push(Field::Column { name: sel.name.clone(), response_key: sel.response_key().to_string() });
                continue;
            }
            let rel = self.schema.relationship(table_id, &sel.name).ok_or_else(|| {
                Error::schema_mismatch(format!("'{}' has no column or relationship '{}'", table.name, sel.name))
            })?;
            if !rel.is_joinable() {
                return Err(Error::compilation(format!(
                    "relationship '{}' is not resolvable within this database",
                    sel.name
                )));
            }
            let nested = self.compile_select(&sel, role, role_config)?;
            fields.push(Field::Relation { response_key: sel.response_key().to_string(), select: Box::new(nested) });
        }

        let role_filter = self.role_filter(&field.name, role_config)?;
        let arg_filter = compile_where_argument(field.arguments.get("where"))?;
        let filter = Exp::and(vec![role_filter, arg_filter]).simplify();

        let order_by = compile_order_by(field.arguments.get("orderBy"));
        let paging = compile_paging(field)?;

        Ok(Select {
            table: table_id,
            response_key: field.response_key().to_string(),
            fields,
            filter,
            order_by,
            paging,
            to_many: true,
        })
    }

    fn compile_mutate(&self, field: &FieldNode, role: &str, role_config: Option<&RoleConfig>) -> Result<super::qcode::Mutate> {
        use super::qcode::{Mutate, MutateOp};

        let table_guess = infer_mutation_table(&field.name);
        let (table_id, _table) = self.table_for(&table_guess)?;

        let op = if field.name.starts_with("delete") {
            self.check_mutation_allowed(&table_guess, role_config, MutationKind::Delete)?;
            let filter = compile_where_argument(field.arguments.get("where"))?;
            MutateOp::Delete { table: table_id, filter }
        } else if field.name.starts_with("update") {
            self.check_mutation_allowed(&table_guess, role_config, MutationKind::Update)?;
            let filter = compile_where_argument(field.arguments.get("where"))?;
            let columns = compile_input_columns(field.arguments.get("input"))?;
            MutateOp::Update { table: table_id, columns, filter }
        } else {
            self.check_mutation_allowed(&table_guess, role_config, MutationKind::Insert)?;
            let columns = compile_input_columns(field.arguments.get("input"))?;
            MutateOp::Insert { table: table_id, columns }
        };

        let returning = evaluate_directives(&field.selections, role)?
            .iter()
            .map(|f| Field::Column { name: f.name.clone(), response_key: f.response_key().to_string() })
            .collect();

        let mut mutate = Mutate::new(field.response_key().to_string(), op, field.response_key().to_string());
        mutate.returning = returning;
        Ok(mutate)
    }
}

#[derive(Debug, Clone, Copy)]
enum MutationKind {
    Insert,
    Update,
    Delete,
}

/// `createOrder` -> `orders`, `updateOrder` -> `orders`, `deleteOrder` ->
/// `orders`: strip the verb prefix and pluralize with a trailing `s`.
/// Schemas that need an irregular plural configure the table name to
/// match the mutation field directly instead.
fn infer_mutation_table(field_name: &str) -> String {
    let stripped = field_name
        .strip_prefix("create")
        .or_else(|| field_name.strip_prefix("update"))
        .or_else(|| field_name.strip_prefix("delete"))
        .unwrap_or(field_name);
    let mut name = stripped.to_string();
    if let Some(c) = name.get_mut(0..1) {
        c.make_ascii_lowercase();
    }
    if !name.ends_with('s') {
        name.push('s');
    }
    name
}

/// Resolve `@skip(if:)`/`@include(if:)`/`@remove(ifRole:)` against a
/// literal boolean/string; variable-valued directives are deferred to the
/// binder, which re-checks them once real variable values are known.
fn evaluate_directives(fields: &[FieldNode], role: &str) -> Result<Vec<FieldNode>> {
    let mut out = Vec::with_capacity(fields.len());
    'field: for f in fields {
        for d in &f.directives {
            match d.name.as_str() {
                "skip" => {
                    if let Some(ArgValue::Boolean(true)) = d.if_arg() {
                        continue 'field;
                    }
                }
                "include" => {
                    if let Some(ArgValue::Boolean(false)) = d.if_arg() {
                        continue 'field;
                    }
                }
                "remove" => {
                    if d.if_role_arg() == Some(role) {
                        continue 'field;
                    }
                }
                _ => {}
            }
        }
        out.push(f.clone());
    }
    Ok(out)
}

fn compile_order_by(arg: Option<&ArgValue>) -> Vec<OrderBy> {
    let Some(ArgValue::List(items)) = arg else { return Vec::new() };
    items
        .iter()
        .filter_map(|item| {
            let ArgValue::Object(obj) = item else { return None };
            let (column, dir) = obj.iter().next()?;
            let direction = match dir {
                ArgValue::Enum(s) | ArgValue::String(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                _ => SortDirection::Asc,
            };
            Some(OrderBy { column: column.clone(), direction })
        })
        .collect()
}

fn compile_paging(field: &FieldNode) -> Result<Option<Paging>> {
    let first = field.arguments.get("first");
    let last = field.arguments.get("last");
    if first.is_none() && last.is_none() {
        return Ok(None);
    }
    let (limit_arg, backward) = if let Some(f) = first { (f, false) } else { (last.unwrap(), true) };
    let limit = match limit_arg {
        ArgValue::Int(n) => u32::try_from(*n).map_err(|_| Error::compilation("first/last must be non-negative"))?,
        _ => return Err(Error::compilation("first/last must be an integer")),
    };
    let cursor_arg = field.arguments.get("after").or_else(|| field.arguments.get("before"));
    let after = match cursor_arg {
        Some(ArgValue::String(token)) => {
            let cursor = crate::compiler::cursor::PlainCursor::decode(token)?;
            Some(cursor.values)
        }
        Some(ArgValue::Variable(_)) | None => None,
        Some(_) => return Err(Error::compilation("after/before must be a string cursor")),
    };
    Ok(Some(Paging { limit, backward, after }))
}

fn compile_input_columns(arg: Option<&ArgValue>) -> Result<Vec<(String, ExpValue)>> {
    let Some(ArgValue::Object(obj)) = arg else {
        return Err(Error::compilation("mutation is missing its 'input' argument"));
    };
    obj.iter().map(|(k, v)| Ok((k.clone(), arg_value_to_exp_value(v)))).collect()
}

fn arg_value_to_exp_value(v: &ArgValue) -> ExpValue {
    match v {
        ArgValue::Variable(name) => ExpValue::Variable(name.clone()),
        other => ExpValue::Literal(other.to_json()),
    }
}

fn compile_where_argument(arg: Option<&ArgValue>) -> Result<Exp> {
    match arg {
        None => Ok(Exp::True),
        Some(value) => compile_filter_object(value),
    }
}

/// Parse a GraphQL-input-style filter string (used for ABAC policies) with
/// the same value grammar GraphQL arguments use, then compile it exactly
/// like a `where:` argument.
fn parse_filter_string(source: &str) -> Result<Exp> {
    let value = graphql_parser::query::parse_value::<String>(source)
        .map_err(|e| Error::compilation(format!("invalid role filter expression: {e}")))?;
    compile_filter_object(&lower_graphql_value(&value))
}

/// Mirrors `graph::parser`'s private value lowering. Kept separate (rather
/// than exported from `graph::parser`) since role filter strings are
/// parsed standalone, outside any document or selection set.
fn lower_graphql_value(value: &graphql_parser::query::Value<'_, String>) -> ArgValue {
    use graphql_parser::query::Value;
    match value {
        Value::String(s) => ArgValue::String(s.clone()),
        Value::Int(i) => ArgValue::Int(i.as_i64().unwrap_or_default()),
        Value::Float(f) => ArgValue::Float(*f),
        Value::Boolean(b) => ArgValue::Boolean(*b),
        Value::Null => ArgValue::Null,
        Value::Enum(e) => ArgValue::Enum(e.clone()),
        Value::Variable(v) => ArgValue::Variable(v.clone()),
        Value::List(items) => ArgValue::List(items.iter().map(lower_graphql_value).collect()),
        Value::Object(obj) => {
            ArgValue::Object(obj.iter().map(|(k, v)| (k.clone(), lower_graphql_value(v))).collect())
        }
    }
}

/// Compile a `{ column: { _op: value }, _and: [...], _or: [...] }` style
/// object into an `Exp` tree.
fn compile_filter_object(value: &ArgValue) -> Result<Exp> {
    let ArgValue::Object(obj) = value else {
        return Err(Error::compilation("filter expressions must be objects"));
    };
    let mut clauses = Vec::new();
    for (key, val) in obj {
        match key.as_str() {
            "_and" => {
                let ArgValue::List(items) = val else { return Err(Error::compilation("_and expects a list")) };
                let inner = items.iter().map(compile_filter_object).collect::<Result<Vec<_>>>()?;
                clauses.push(Exp::And(inner));
            }
            "_or" => {
                let ArgValue::List(items) = val else { return Err(Error::compilation("_or expects a list")) };
                let inner = items.iter().map(compile_filter_object).collect::<Result<Vec<_>>>()?;
                clauses.push(Exp::Or(inner));
            }
            "_not" => clauses.push(Exp::Not(Box::new(compile_filter_object(val)?))),
            column => clauses.push(compile_column_ops(column, val)?),
        }
    }
    Ok(Exp::and(clauses))
}

fn compile_column_ops(column: &str, value: &ArgValue) -> Result<Exp> {
    let ArgValue::Object(ops) = value else {
        return Err(Error::compilation(format!("filter for '{column}' must be an operator object")));
    };
    let mut clauses = Vec::new();
    for (op_name, op_value) in ops {
        let op = match op_name.as_str() {
            "_eq" => ExpOp::Equals,
            "_neq" => ExpOp::NotEquals,
            "_gt" => ExpOp::GreaterThan,
            "_gte" => ExpOp::GreaterThanOrEq,
            "_lt" => ExpOp::LessThan,
            "_lte" => ExpOp::LessThanOrEq,
            "_in" => ExpOp::In,
            "_nin" => ExpOp::NotIn,
            "_like" => ExpOp::Like,
            "_ilike" => ExpOp::ILike,
            "_is_null" => ExpOp::IsNull,
            "_has_key" => ExpOp::HasKey,
            "_contains" => ExpOp::Contains,
            "_ts_query" => ExpOp::TsQuery,
            other => return Err(Error::compilation(format!("unknown filter operator '{other}'"))),
        };
        clauses.push(Exp::Op { column: column.to_string(), op, value: arg_value_to_exp_value(op_value) });
    }
    Ok(Exp::and(clauses))
}
