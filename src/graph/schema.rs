//! Uniqueness constraints and indexes of the catalog graph.
//!
//! Every statement is idempotent (`IF NOT EXISTS`); the set is versionless
//! and applied once before any chunk is written.

/// Kind of schema rule a statement declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaKind {
    Constraint,
    Index,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemaStatement {
    pub name: &'static str,
    pub kind: SchemaKind,
    pub cypher: &'static str,
}

pub const GRAPH_SCHEMA: &[SchemaStatement] = &[
    SchemaStatement {
        name: "track_id_unique",
        kind: SchemaKind::Constraint,
        cypher: "CREATE CONSTRAINT track_id_unique IF NOT EXISTS FOR (t:Track) REQUIRE t.track_id IS UNIQUE",
    },
    SchemaStatement {
        name: "artist_name_unique",
        kind: SchemaKind::Constraint,
        cypher: "CREATE CONSTRAINT artist_name_unique IF NOT EXISTS FOR (a:Artist) REQUIRE a.name IS UNIQUE",
    },
    SchemaStatement {
        name: "album_composite",
        kind: SchemaKind::Constraint,
        cypher: "CREATE CONSTRAINT album_composite IF NOT EXISTS FOR (al:Album) REQUIRE (al.name, al.artist) IS UNIQUE",
    },
    SchemaStatement {
        name: "genre_name_unique",
        kind: SchemaKind::Constraint,
        cypher: "CREATE CONSTRAINT genre_name_unique IF NOT EXISTS FOR (g:Genre) REQUIRE g.name IS UNIQUE",
    },
    SchemaStatement {
        name: "track_popularity",
        kind: SchemaKind::Index,
        cypher: "CREATE INDEX track_popularity IF NOT EXISTS FOR (t:Track) ON (t.popularity)",
    },
];

/// Result of applying one schema statement.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaOutcome {
    Created(&'static str),
    /// The rule was already in place.
    AlreadyPresent(&'static str),
    /// The statement failed for another reason. Not fatal for a run.
    Failed {
        name: &'static str,
        error: super::GraphError,
    },
}

impl SchemaOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaOutcome::Created(name) | SchemaOutcome::AlreadyPresent(name) => name,
            SchemaOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SchemaOutcome::Failed { .. })
    }
}
