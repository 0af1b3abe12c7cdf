use axum::extract::FromRef;

use crate::catalog::CatalogGraph;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalog = CatalogGraph;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: GuardedCatalog,
}

impl ServerState {
    pub fn new(config: ServerConfig, catalog: CatalogGraph) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog,
        }
    }
}

impl FromRef<ServerState> for GuardedCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
