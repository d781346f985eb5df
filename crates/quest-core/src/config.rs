//! Configuración resuelta que el host entrega al construir el orquestador.
//!
//! El core nunca lee el entorno ni hace fetch de configuración: recibe
//! duraciones de presentación y textos estáticos ya resueltos.
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::Phase;

pub const DEFAULT_TYPING_DELAY_MS: u64 = 800;
pub const DEFAULT_MESSAGE_DELAY_MS: u64 = 350;

/// Retardos puramente cosméticos entre mensajes en vivo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PresentationConfig {
    /// Cuánto permanece visible un indicador de escritura.
    pub typing_delay_ms: u64,
    /// Pausa antes de cada mensaje real emitido en vivo.
    pub message_delay_ms: u64,
    /// Overrides de `message_delay_ms` por fase.
    pub phase_delays_ms: HashMap<Phase, u64>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self { typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
               message_delay_ms: DEFAULT_MESSAGE_DELAY_MS,
               phase_delays_ms: HashMap::new() }
    }
}

impl PresentationConfig {
    /// Sin retardos (tests, modo no interactivo).
    pub fn instant() -> Self {
        Self { typing_delay_ms: 0,
               message_delay_ms: 0,
               phase_delays_ms: HashMap::new() }
    }

    pub fn with_phase_delay(mut self, phase: Phase, ms: u64) -> Self {
        self.phase_delays_ms.insert(phase, ms);
        self
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    pub fn delay_for(&self, phase: Phase) -> Duration {
        Duration::from_millis(self.phase_delays_ms.get(&phase).copied().unwrap_or(self.message_delay_ms))
    }
}

/// Textos y enlaces estáticos que usan las factories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowCopy {
    pub compensation_text: String,
    pub survey_url: String,
    pub support_url: String,
}

impl Default for FlowCopy {
    fn default() -> Self {
        Self { compensation_text: "Thanks for taking part. Your participation reward will be sent within 5 business days."
                                  .to_string(),
               survey_url: "https://example.org/questflow/survey".to_string(),
               support_url: "https://example.org/questflow/support".to_string() }
    }
}

/// Configuración completa del flujo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub presentation: PresentationConfig,
    pub copy: FlowCopy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_override_beats_default_delay() {
        let cfg = PresentationConfig::default().with_phase_delay(Phase::Debrief, 1500);
        assert_eq!(cfg.delay_for(Phase::Debrief), Duration::from_millis(1500));
        assert_eq!(cfg.delay_for(Phase::Briefing), Duration::from_millis(DEFAULT_MESSAGE_DELAY_MS));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FlowConfig = serde_json::from_str(r#"{"presentation": {"typingDelayMs": 5}}"#).unwrap();
        assert_eq!(cfg.presentation.typing_delay_ms, 5);
        assert_eq!(cfg.presentation.message_delay_ms, DEFAULT_MESSAGE_DELAY_MS);
        assert_eq!(cfg.copy, FlowCopy::default());
    }
}
