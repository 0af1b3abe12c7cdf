//! Catalog Graph Library
//!
//! Bulk import of a track catalog CSV into a property graph, plus the
//! catalog facade and HTTP API that query and edit it.

pub mod catalog;
pub mod config;
pub mod graph;
pub mod ingest;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog::CatalogGraph;
pub use graph::{GraphError, GraphStore, MemoryGraphStore, Neo4jGraphStore};
pub use ingest::{ImportPipeline, ImportSummary};
pub use server::{run_server, RequestsLoggingLevel};
