//! Reglas autoritativas del servidor.
//!
//! El servidor es el único que escribe `phase_history`. Estas funciones son
//! puras (reciben `now`) para que cualquier backend que simule al servidor
//! aplique exactamente las mismas transiciones.
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::merge::merge_json;
use super::UpdateRequest;
use crate::errors::GatewayError;
use crate::hashing::hash_bucket;
use crate::model::{ExperimentGroup, FlowState, PhaseRecord};
use crate::topology::TopologyRegistry;

/// Política de asignación de grupo al crear un flujo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupAssignment {
    /// Bucket estable derivado del hash del `session_id`.
    #[default]
    Hashed,
    /// Todos los flujos nuevos van al mismo grupo.
    Pinned(ExperimentGroup),
}

impl GroupAssignment {
    pub fn assign(&self, session_id: &str, registry: &TopologyRegistry) -> ExperimentGroup {
        match self {
            GroupAssignment::Pinned(group) => *group,
            GroupAssignment::Hashed => {
                let groups: Vec<ExperimentGroup> = registry.groups().collect();
                if groups.is_empty() {
                    return ExperimentGroup::Control;
                }
                groups[hash_bucket(session_id, groups.len())]
            }
        }
    }
}

/// Aplica una transición pedida por el cliente y devuelve el estado canónico.
///
/// Sólo se acepta `target == topology[index(current) + 1]`; respuestas y
/// métricas se guardan bajo la fase que se está completando.
pub fn apply_update(state: &FlowState,
                    request: &UpdateRequest,
                    registry: &TopologyRegistry,
                    now: DateTime<Utc>)
                    -> Result<FlowState, GatewayError> {
    let current = state.current_phase()
                       .ok_or_else(|| GatewayError::Decode(format!("empty phase history for session {}", state.session_id)))?;
    let topology = registry.get_topology(state.experiment_group);
    let expected = topology.next_after(current).ok_or_else(|| {
                                                    GatewayError::Rejected(format!("no phase after {current} for group {}",
                                                                                   state.experiment_group))
                                                })?;
    if request.target != expected {
        return Err(GatewayError::Rejected(format!("target {} does not follow {current} (expected {expected})",
                                                  request.target)));
    }

    let mut next = state.clone();
    next.phase_history.push(PhaseRecord::new(request.target, now));
    if let Some(answers) = &request.answers {
        merge_into(&mut next.user_responses, current.as_str(), answers);
    }
    if let Some(metrics) = &request.metrics {
        merge_into(&mut next.metrics, current.as_str(), metrics);
    }
    next.derived_score = derive_score(&next.user_responses);
    Ok(next)
}

fn merge_into(map: &mut Map<String, Value>, key: &str, incoming: &Value) {
    let merged = match map.get(key) {
        Some(existing) => merge_json(existing, incoming),
        None => incoming.clone(),
    };
    map.insert(key.to_string(), merged);
}

/// Suma de los campos numéricos `score` de todas las respuestas.
fn derive_score(responses: &Map<String, Value>) -> Option<f64> {
    let scores: Vec<f64> = responses.values().filter_map(|v| v.get("score")).filter_map(Value::as_f64).collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum())
    }
}
