//! Arena-indexed schema graph with breadth-first relationship lookup.
//!
//! Tables are pushed into a flat `Vec` once at load time; every reference
//! after that is a plain index, so the compiler can hold a `SchemaGraph`
//! behind an `Arc` and hand out `TableId`s freely without lifetimes.

use super::relationship::Relationship;
use super::table::Table;
use std::collections::{HashMap, VecDeque};

/// Index into [`SchemaGraph::tables`].
pub type TableId = usize;

/// The compiled schema: tables plus the relationship edges between them.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    tables: Vec<Table>,
    by_name: HashMap<String, TableId>,
    /// Adjacency list: edges originating at `tables[i]`.
    edges: Vec<Vec<Relationship>>,
}

impl SchemaGraph {
    #[must_use]
    pub fn new(tables: Vec<Table>) -> Self {
        let by_name = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        let edges = vec![Vec::new(); tables.len()];
        Self { tables, by_name, edges }
    }

    /// Register a relationship originating at `rel.from_table`. Returns
    /// `false` (and drops the edge) if either endpoint is unknown.
    pub fn add_relationship(&mut self, rel: Relationship) -> bool {
        let Some(&from) = self.by_name.get(&rel.from_table) else { return false };
        // Remote/polymorphic edges may legitimately point outside this graph.
        self.edges[from].push(rel);
        true
    }

    #[must_use]
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id]
    }

    #[must_use]
    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.table_id(name).map(|id| self.table(id))
    }

    #[must_use]
    pub fn relationships_from(&self, id: TableId) -> &[Relationship] {
        &self.edges[id]
    }

    /// The relationship named `field_name` leaving `id`, if any. A field
    /// name in a GraphQL selection is resolved to an edge this way before
    /// the compiler decides how to render it.
    #[must_use]
    pub fn relationship(&self, id: TableId, field_name: &str) -> Option<&Relationship> {
        self.edges[id].iter().find(|r| r.name == field_name)
    }

    /// Shortest chain of relationships from `from` to `to`, by number of
    /// hops. Used to validate that a cross-database join the config
    /// declares explicit-join support for is actually reachable within one
    /// hop, and to explain `schema_mismatch` errors with a path.
    #[must_use]
    pub fn shortest_path(&self, from: TableId, to: TableId) -> Option<Vec<TableId>> {
        if from == to {
            return Some(vec![from]);
        }
        let mut visited = vec![false; self.tables.len()];
        let mut parent = vec![None; self.tables.len()];
        let mut queue = VecDeque::new();
        visited[from] = true;
        queue.push_back(from);

        while let Some(node) = queue.pop_front() {
            for rel in &self.edges[node] {
                let Some(next) = self.by_name.get(&rel.to_table).copied() else { continue };
                if visited[next] {
                    continue;
                }
                visited[next] = true;
                parent[next] = Some(node);
                if next == to {
                    let mut path = vec![next];
                    let mut cur = node;
                    path.push(cur);
                    while let Some(p) = parent[cur] {
                        path.push(p);
                        cur = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
