//! Remote State Gateway: contrato y backend en memoria.
//!
//! - `StateGateway`: fetch / initialize / update del estado remoto.
//! - `server`: reglas autoritativas (asignación de grupo, append de
//!   `PhaseRecord`, merge de respuestas) compartidas por los backends que
//!   simulan al servidor.
//! - `InMemoryStateGateway`: backend en memoria (tests, demos).

mod memory;
pub mod merge;
pub mod server;
mod store;

pub use memory::InMemoryStateGateway;
pub use server::{apply_update, GroupAssignment};
pub use store::{StateGateway, UpdateRequest};
