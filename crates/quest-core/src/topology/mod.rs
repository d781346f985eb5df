//! Registro de topologías: grupo de experimento → secuencia ordenada de fases.

pub mod registry;
pub mod types;

pub use registry::TopologyRegistry;
pub use types::{FlowTopology, GroupFlow};
