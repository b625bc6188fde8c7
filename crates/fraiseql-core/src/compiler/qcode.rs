//! `QCode`: the compiled, schema-bound form of a GraphQL operation.
//!
//! Every field has been resolved to a table or relationship, every filter
//! has role and field arguments AND-ed together, and mutations carry an
//! explicit dependency order. Nothing in this module knows about SQL
//! syntax — that is the renderer's job.

use super::expr::Exp;
use crate::schema::TableId;
use serde::{Deserialize, Serialize};

/// Sort direction for an `OrderBy` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// Cursor-based pagination bounds, resolved from `first`/`last`/`after`/
/// `before` arguments. `after`/`before` have already been decrypted and
/// decoded into column values by the time `QCode` is built — the opaque
/// token itself lives in [`crate::cipher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging {
    pub limit: u32,
    pub backward: bool,
    /// Column values from a decoded cursor, matched positionally against
    /// `order_by`, used to build the seek predicate.
    pub after: Option<Vec<serde_json::Value>>,
}

/// One selected field: either a plain column projection or a nested
/// `Select` reached through a relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Field {
    Column { name: String, response_key: String },
    Relation { response_key: String, select: Box<Select> },
}

/// A compiled selection against one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Select {
    pub table: TableId,
    pub response_key: String,
    pub fields: Vec<Field>,
    /// Role filter AND-ed with field arguments, already simplified.
    pub filter: Exp,
    pub order_by: Vec<OrderBy>,
    pub paging: Option<Paging>,
    /// Whether this select's rows can be >1 (affects whether the renderer
    /// produces a `json_agg`/array form or a single `json_build_object`).
    pub to_many: bool,
}

/// One mutation operation in a request. Insert/Update/Upsert carry column
/// values already resolved to bind sites (post-argument-lowering, still
/// pre-binding); Connect/Disconnect only need the foreign key value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MutateOp {
    Insert { table: TableId, columns: Vec<(String, super::expr::ExpValue)> },
    Update { table: TableId, columns: Vec<(String, super::expr::ExpValue)>, filter: Exp },
    Upsert { table: TableId, columns: Vec<(String, super::expr::ExpValue)>, conflict_columns: Vec<String> },
    Delete { table: TableId, filter: Exp },
    Connect { table: TableId, fk_column: String, value: super::expr::ExpValue },
    Disconnect { table: TableId, fk_column: String },
}

/// One node of the mutation dependency DAG: the operation plus the names
/// of other nodes that must run first (e.g. an insert whose id feeds a
/// connect on a child row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mutate {
    pub name: String,
    pub op: MutateOp,
    pub depends_on: Vec<String>,
    /// Fields to read back (via `RETURNING` or a follow-up select) and
    /// splice into the response under `response_key`.
    pub returning: Vec<Field>,
    pub response_key: String,
}

/// The compiled form of one GraphQL operation, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QCode {
    Query(Vec<Select>),
    Mutation(Vec<Mutate>),
    Subscription(Select),
}

impl Mutate {
    /// Topological position isn't computed here — [`order_mutations`]
    /// does that once all nodes are known.
    #[must_use]
    pub fn new(name: impl Into<String>, op: MutateOp, response_key: impl Into<String>) -> Self {
        Self { name: name.into(), op, depends_on: Vec::new(), returning: Vec::new(), response_key: response_key.into() }
    }
}

/// Topologically order mutation nodes by `depends_on`, erroring on a
/// cycle. Returns the indices of `nodes` in execution order.
pub fn order_mutations(nodes: &[Mutate]) -> crate::error::Result<Vec<usize>> {
    use std::collections::HashMap;

    let index_by_name: HashMap<&str, usize> =
        nodes.iter().enumerate().map(|(i, n)| (n.name.as_str(), i)).collect();

    let mut visited = vec![0u8; nodes.len()]; // 0=unvisited, 1=in-progress, 2=done
    let mut order = Vec::with_capacity(nodes.len());

    fn visit(
        i: usize,
        nodes: &[Mutate],
        index_by_name: &HashMap<&str, usize>,
        visited: &mut [u8],
        order: &mut Vec<usize>,
    ) -> crate::error::Result<()> {
        match visited[i] {
            2 => return Ok(()),
            1 => return Err(crate::error::Error::compilation(format!(
                "cyclic mutation dependency at '{}'",
                nodes[i].name
            ))),
            _ => {}
        }
        visited[i] = 1;
        for dep in &nodes[i].depends_on {
            let Some(&dep_idx) = index_by_name.get(dep.as_str()) else {
                return Err(crate::error::Error::compilation(format!(
                    "mutation '{}' depends on unknown node '{dep}'",
                    nodes[i].name
                )));
            };
            visit(dep_idx, nodes, index_by_name, visited, order)?;
        }
        visited[i] = 2;
        order.push(i);
        Ok(())
    }

    for i in 0..nodes.len() {
        visit(i, nodes, &index_by_name, &mut visited, &mut order)?;
    }
    Ok(order)
}
