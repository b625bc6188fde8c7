//! Relationship kinds between tables.

use serde::{Deserialize, Serialize};

/// How two tables relate, inferred from foreign keys or declared
/// explicitly when a schema can't express it (polymorphic/remote joins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// `child.fk = parent.pk`, rendered as a to-one join.
    OneToOne { local_column: String, foreign_column: String },
    /// `child.fk = parent.pk`, rendered as a to-many join.
    OneToMany { local_column: String, foreign_column: String },
    /// Joined through a junction table.
    ManyToMany {
        junction_table: String,
        local_junction_column: String,
        foreign_junction_column: String,
    },
    /// Self-referential, walked via a recursive CTE.
    Recursive { local_column: String, foreign_column: String },
    /// Nested object stored inline in a JSON column rather than joined.
    Embedded { json_column: String },
    /// Foreign key target varies per row, resolved by a discriminator
    /// column naming the target table.
    Polymorphic { discriminator_column: String, fk_column: String },
    /// Resolved outside this database; the engine only knows the
    /// placeholder shape, not how to join it.
    Remote { placeholder_field: String },
    /// No relationship; fields addressed through this edge are rejected.
    None,
}

/// A named edge from one table to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub name: String,
    pub from_table: String,
    pub to_table: String,
    pub kind: RelationKind,
}

impl Relationship {
    /// Whether this relationship can be rendered as a single SQL join
    /// (as opposed to requiring out-of-process resolution).
    #[must_use]
    pub fn is_joinable(&self) -> bool {
        !matches!(self.kind, RelationKind::Remote { .. } | RelationKind::None)
    }

    /// Whether traversing this edge can return more than one row.
    #[must_use]
    pub fn is_to_many(&self) -> bool {
        matches!(
            self.kind,
            RelationKind::OneToMany { .. } | RelationKind::ManyToMany { .. } | RelationKind::Recursive { .. }
        )
    }
}
