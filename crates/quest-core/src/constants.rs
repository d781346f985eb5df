//! Constantes del motor core.
//!
//! `ENGINE_VERSION` participa en el hash de cada topología: cambiarla invalida
//! los `topology_hash` registrados en logs aunque las fases no cambien.

/// Versión lógica del motor de flujos.
pub const ENGINE_VERSION: &str = "Q1.0";

/// Clave de métricas que marca una salida anticipada ("stop early").
pub const STOPPED_EARLY_KEY: &str = "stoppedEarly";

/// Razón asociada a una salida anticipada.
pub const STOP_REASON_KEY: &str = "reason";
