//! QuestFlow Rust
//!
//! Librería de la aplicación de terminal:
//! - `config`: resuelve `.env` en `FlowConfig` + `StoreConfig`.
//! - `console`: superficie de chat de terminal.
//! - `cli`: argumentos de `main-core`.
//! - `errors`: errores de la aplicación.

pub mod cli;
pub mod config;
pub mod console;
pub mod errors;
