//! quest-persistence
//!
//! Backends durables del Remote State Gateway. Ambos aplican las mismas
//! reglas de servidor que el gateway en memoria (`quest_core::gateway::apply_update`)
//! y guardan el estado en su forma de cable (camelCase), rechazando grupos de
//! experimento desconocidos al leer.
//!
//! Módulos:
//! - `file`: un archivo JSON por sesión (demo de terminal, tests).
//! - `pg`: Postgres vía Diesel + r2d2, con migraciones embebidas.
//! - `config`: selección de backend desde `.env`.

pub mod config;
pub mod error;
pub mod file;
pub mod migrations;
pub mod pg;
pub mod schema;

use std::sync::Arc;

use log::info;
use quest_core::{GroupAssignment, StateGateway, TopologyRegistry};

pub use config::{init_dotenv, DbConfig, StoreConfig};
pub use error::PersistenceError;
pub use file::FileStateGateway;
pub use pg::{build_pool, ConnectionProvider, PgPool, PgStateGateway, PoolProvider};

/// Construye el gateway configurado.
pub fn build_gateway(config: &StoreConfig,
                     registry: TopologyRegistry,
                     assignment: GroupAssignment)
                     -> Result<Arc<dyn StateGateway>, PersistenceError> {
    match config {
        StoreConfig::File { state_dir } => {
            info!("store:file dir={}", state_dir.display());
            Ok(Arc::new(FileStateGateway::new(state_dir.clone()).with_registry(registry)
                                                                .with_assignment(assignment)))
        }
        StoreConfig::Postgres(db) => {
            info!("store:postgres min={} max={}", db.min_connections, db.max_connections);
            let pool = build_pool(&db.url, db.min_connections, db.max_connections)?;
            Ok(Arc::new(PgStateGateway::new(PoolProvider { pool }).with_registry(registry)
                                                                  .with_assignment(assignment)))
        }
    }
}
