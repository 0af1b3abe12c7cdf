mod error;
mod memory_store;
mod models;
mod neo4j_store;
mod ops;
mod schema;
mod trait_def;
mod update;

pub use error::GraphError;
pub use memory_store::{EdgeSnapshot, MemoryGraphStore};
pub use models::*;
pub use neo4j_store::{Neo4jConfig, Neo4jGraphStore};
pub use ops::{BatchReport, OpReport, WriteBatch, WriteOp};
pub use schema::{SchemaKind, SchemaOutcome, SchemaStatement, GRAPH_SCHEMA};
pub use trait_def::{GraphStore, COLLABORATION_SAMPLES, SUMMARY_ARTISTS};
pub use update::{TrackField, TrackUpdate};
