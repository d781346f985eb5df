//! Estado remoto del flujo (`FlowState`) y su forma de cable (`FlowStateDto`).
//!
//! Rol en el flujo:
//! - El servidor es el único que escribe `phase_history`; el cliente nunca
//!   sintetiza un `PhaseRecord` propio.
//! - El último elemento de `phase_history` es la fase actual.
//! - `FlowStateDto` transporta el grupo como string: la conversión a
//!   `FlowState` es el único punto donde se valida contra el conjunto conocido.
use std::convert::TryFrom;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ExperimentGroup, Phase};
use crate::errors::GatewayError;

/// Una entrada del historial append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
}

impl PhaseRecord {
    pub fn new(phase: Phase, timestamp: DateTime<Utc>) -> Self {
        Self { phase, timestamp }
    }
}

/// Estado autoritativo de un flujo, ya validado.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub session_id: String,
    pub experiment_group: ExperimentGroup,
    pub phase_history: Vec<PhaseRecord>,
    pub derived_score: Option<f64>,
    /// Respuestas por fase (clave = nombre de cable de la fase).
    pub user_responses: Map<String, Value>,
    /// Métricas por fase (clave = nombre de cable de la fase).
    pub metrics: Map<String, Value>,
}

impl FlowState {
    /// Estado recién creado en la fase `INITIAL`.
    pub fn initial(session_id: impl Into<String>, group: ExperimentGroup, ts: DateTime<Utc>) -> Self {
        Self { session_id: session_id.into(),
               experiment_group: group,
               phase_history: vec![PhaseRecord::new(Phase::Initial, ts)],
               derived_score: None,
               user_responses: Map::new(),
               metrics: Map::new() }
    }

    /// Fase actual (último registro del historial).
    pub fn current_phase(&self) -> Option<Phase> {
        self.phase_history.last().map(|r| r.phase)
    }

    pub fn response_for(&self, phase: Phase) -> Option<&Value> {
        self.user_responses.get(phase.as_str())
    }

    pub fn metrics_for(&self, phase: Phase) -> Option<&Value> {
        self.metrics.get(phase.as_str())
    }

    pub fn to_dto(&self) -> FlowStateDto {
        FlowStateDto::from(self)
    }

    /// Decodifica JSON de cable validando grupo e historial.
    pub fn from_json(raw: &str) -> Result<Self, GatewayError> {
        let dto: FlowStateDto = serde_json::from_str(raw).map_err(|e| GatewayError::Decode(e.to_string()))?;
        FlowState::try_from(dto)
    }
}

/// Forma de cable del estado (camelCase, grupo como string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStateDto {
    pub session_id: String,
    pub experiment_group: String,
    pub phase_history: Vec<PhaseRecord>,
    #[serde(default)]
    pub derived_score: Option<f64>,
    #[serde(default)]
    pub user_responses: Map<String, Value>,
    #[serde(default)]
    pub metrics: Map<String, Value>,
}

impl TryFrom<FlowStateDto> for FlowState {
    type Error = GatewayError;

    fn try_from(dto: FlowStateDto) -> Result<Self, Self::Error> {
        let experiment_group = dto.experiment_group
                                  .parse::<ExperimentGroup>()
                                  .map_err(|_| GatewayError::UnknownExperimentGroup(dto.experiment_group.clone()))?;
        if dto.phase_history.is_empty() {
            return Err(GatewayError::Decode(format!("empty phase history for session {}", dto.session_id)));
        }
        Ok(FlowState { session_id: dto.session_id,
                       experiment_group,
                       phase_history: dto.phase_history,
                       derived_score: dto.derived_score,
                       user_responses: dto.user_responses,
                       metrics: dto.metrics })
    }
}

impl From<&FlowState> for FlowStateDto {
    fn from(state: &FlowState) -> Self {
        Self { session_id: state.session_id.clone(),
               experiment_group: state.experiment_group.as_str().to_string(),
               phase_history: state.phase_history.clone(),
               derived_score: state.derived_score,
               user_responses: state.user_responses.clone(),
               metrics: state.metrics.clone() }
    }
}
