//! Datos que el usuario entrega al completar una fase.
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::constants::{STOPPED_EARLY_KEY, STOP_REASON_KEY};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
}

impl StepInput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_answers(mut self, answers: Value) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn with_metrics(mut self, metrics: Value) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Salida anticipada: registra la razón en las métricas y avanza igual
    /// que cualquier otra transición (no es una rama terminal).
    pub fn stop_early(reason: impl Into<String>) -> Self {
        Self::empty().with_metrics(json!({ STOPPED_EARLY_KEY: true, STOP_REASON_KEY: reason.into() }))
    }

    pub fn is_early_stop(&self) -> bool {
        self.metrics
            .as_ref()
            .and_then(|m| m.get(STOPPED_EARLY_KEY))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Combina las métricas con `extra` (las claves de `extra` ganan).
    pub fn merge_metrics(mut self, extra: Value) -> Self {
        let mut base = match self.metrics.take() {
            Some(Value::Object(m)) => m,
            _ => Map::new(),
        };
        if let Value::Object(extra) = extra {
            base.extend(extra);
        }
        self.metrics = Some(Value::Object(base));
        self
    }
}
