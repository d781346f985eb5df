//! Planificación de replay.
//!
//! A partir del estado persistido y de la topología del grupo se calcula el
//! camino `topology[0..=index(current)]`: una fase histórica por entrada y la
//! última como frontera (la única con continuación viva). Es una función
//! pura; no toca el gateway ni la superficie.
use crate::errors::ConfigurationError;
use crate::model::{FlowState, Phase};
use crate::topology::FlowTopology;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPlan {
    /// Fases a reconstruir, en orden de topología; la última es la frontera.
    pub path: Vec<Phase>,
    pub frontier: Phase,
    pub frontier_index: usize,
}

impl ReplayPlan {
    /// Fases anteriores a la frontera.
    pub fn historical(&self) -> &[Phase] {
        &self.path[..self.frontier_index]
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.frontier.is_terminal()
    }
}

/// Calcula el plan de replay.
///
/// Falla con `PhaseNotInTopology` si alguna fase del historial no pertenece a
/// la topología del grupo (inconsistencia de datos o de configuración).
pub fn plan_replay(state: &FlowState, topology: &FlowTopology) -> Result<ReplayPlan, ConfigurationError> {
    let frontier = state.current_phase().ok_or(ConfigurationError::EmptyHistory)?;
    if let Some(stray) = state.phase_history.iter().find(|r| !topology.contains(r.phase)) {
        return Err(ConfigurationError::PhaseNotInTopology { phase: stray.phase,
                                                            group: state.experiment_group });
    }
    let frontier_index = topology.index_of(frontier)
                                 .ok_or(ConfigurationError::PhaseNotInTopology { phase: frontier,
                                                                                 group: state.experiment_group })?;
    Ok(ReplayPlan { path: topology.phases()[..=frontier_index].to_vec(),
                    frontier,
                    frontier_index })
}
