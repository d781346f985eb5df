//! `FlowTopology`: secuencia ordenada y sin duplicados de fases, de `INITIAL`
//! a `COMPLETED`.
//!
//! Igual que una definición de flujo, cada topología lleva un hash estable de
//! su lista de fases para poder comparar la topología del cliente con la que
//! el servidor asume.
use std::collections::HashSet;

use serde_json::json;

use crate::constants::ENGINE_VERSION;
use crate::errors::ConfigurationError;
use crate::hashing::hash_value;
use crate::model::Phase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowTopology {
    phases: Vec<Phase>,
    topology_hash: String,
}

impl FlowTopology {
    /// Construye una topología validando las invariantes de forma.
    pub fn new(phases: Vec<Phase>) -> Result<Self, ConfigurationError> {
        match (phases.first(), phases.last()) {
            (Some(Phase::Initial), Some(Phase::Completed)) => {}
            (None, _) => return Err(ConfigurationError::InvalidTopology("topology is empty".into())),
            _ => {
                return Err(ConfigurationError::InvalidTopology(format!("topology must start at INITIAL and end at COMPLETED: {phases:?}")))
            }
        }
        let mut seen = HashSet::with_capacity(phases.len());
        if let Some(dup) = phases.iter().find(|p| !seen.insert(**p)) {
            return Err(ConfigurationError::InvalidTopology(format!("duplicate phase {dup}")));
        }
        Ok(Self::trusted(phases))
    }

    /// Constructor sin validación para tablas estáticas del propio crate
    /// (cubiertas por tests).
    pub(crate) fn trusted(phases: Vec<Phase>) -> Self {
        let names: Vec<&str> = phases.iter().map(|p| p.as_str()).collect();
        let topology_hash = hash_value(&json!({
                                           "engine_version": ENGINE_VERSION,
                                           "phases": names,
                                       }));
        Self { phases, topology_hash }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Phase> {
        self.phases.get(index).copied()
    }

    pub fn index_of(&self, phase: Phase) -> Option<usize> {
        self.phases.iter().position(|p| *p == phase)
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.index_of(phase).is_some()
    }

    /// Siguiente fase en la topología; `None` para la última o si `phase` no
    /// pertenece a ella.
    pub fn next_after(&self, phase: Phase) -> Option<Phase> {
        self.index_of(phase).and_then(|i| self.get(i + 1))
    }

    pub fn topology_hash(&self) -> &str {
        &self.topology_hash
    }
}

/// Entrada del registro para un grupo: topología + si el cierre muestra un
/// mensaje de despedida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFlow {
    pub topology: FlowTopology,
    pub show_completion_message: bool,
}

impl GroupFlow {
    pub fn new(topology: FlowTopology, show_completion_message: bool) -> Self {
        Self { topology,
               show_completion_message }
    }
}
