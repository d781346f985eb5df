//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y las resuelve en la
//! configuración que recibe el orquestador (`FlowConfig`) más la del backend
//! de estado (`StoreConfig`).
use std::env;

use once_cell::sync::Lazy;
use quest_core::config::{DEFAULT_MESSAGE_DELAY_MS, DEFAULT_TYPING_DELAY_MS};
use quest_core::{FlowConfig, FlowCopy, PresentationConfig};
use quest_persistence::{init_dotenv, StoreConfig};

pub struct AppConfig {
    pub flow: FlowConfig,
    pub store: StoreConfig,
    /// Sesión a reanudar; si falta se genera una nueva.
    pub session_id: Option<String>,
}

/// Instancia global perezosa, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

impl AppConfig {
    pub fn from_env() -> Self {
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Valores ausentes o mal formados caen a los defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let millis = |key: &str, default: u64| lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default);
        let text = |key: &str, default: String| lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default);

        let defaults = FlowCopy::default();
        let presentation = PresentationConfig { typing_delay_ms: millis("QUESTFLOW_TYPING_DELAY_MS", DEFAULT_TYPING_DELAY_MS),
                                                message_delay_ms: millis("QUESTFLOW_MESSAGE_DELAY_MS",
                                                                         DEFAULT_MESSAGE_DELAY_MS),
                                                ..PresentationConfig::default() };
        let copy = FlowCopy { compensation_text: text("QUESTFLOW_COMPENSATION_TEXT", defaults.compensation_text),
                              survey_url: text("QUESTFLOW_SURVEY_URL", defaults.survey_url),
                              support_url: text("QUESTFLOW_SUPPORT_URL", defaults.support_url) };
        Self { flow: FlowConfig { presentation, copy },
               store: StoreConfig::from_lookup(&lookup),
               session_id: lookup("QUESTFLOW_SESSION_ID").filter(|s| !s.trim().is_empty()) }
    }
}
