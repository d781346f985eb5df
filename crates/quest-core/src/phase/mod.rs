//! Factories de mensajes por fase.
//!
//! Cada fase tiene una factory `(state, continuation) -> 0..n ChatMessage`.
//! Este módulo define:
//! - `PhaseFactory`: interfaz neutral usada por el orquestador.
//! - `FactoryOutput`: resultado (ninguno, uno o varios mensajes).
//! - `PhaseFactoryMap`: tabla fase → factory (dispatch por variante, no por
//!   herencia).
//! - `StepInput`: respuestas/métricas que el usuario entrega al continuar.

pub mod factory;
pub mod input;
pub mod macros;

pub use factory::{FactoryOutput, FnPhaseFactory, PhaseFactory, PhaseFactoryMap};
pub use input::StepInput;
