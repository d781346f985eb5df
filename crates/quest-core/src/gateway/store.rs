use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GatewayError;
use crate::model::{FlowState, Phase};
use crate::phase::StepInput;

/// Petición de transición hacia `target` con lo que la fase recolectó.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub target: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
}

impl UpdateRequest {
    pub fn new(target: Phase, input: StepInput) -> Self {
        Self { target,
               answers: input.answers,
               metrics: input.metrics }
    }
}

/// Acceso al estado remoto del flujo.
///
/// Contrato:
/// - `fetch`: ausencia no es error (`Ok(None)`).
/// - `initialize`: crea el estado en `INITIAL`.
/// - `update`: agrega un `PhaseRecord` para `target`, persiste respuestas y
///   métricas y devuelve el estado canónico. Un grupo de experimento
///   desconocido en la respuesta se rechaza con
///   `GatewayError::UnknownExperimentGroup`.
#[async_trait]
pub trait StateGateway: Send + Sync {
    async fn fetch(&self, session_id: &str) -> Result<Option<FlowState>, GatewayError>;
    async fn initialize(&self, session_id: &str) -> Result<FlowState, GatewayError>;
    async fn update(&self, session_id: &str, request: UpdateRequest) -> Result<FlowState, GatewayError>;
}
