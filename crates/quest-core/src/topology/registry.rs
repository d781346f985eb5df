//! `TopologyRegistry`: búsqueda pura grupo → `GroupFlow`.
//!
//! Total y determinista. Un grupo sin entrada es un error de configuración,
//! pero el registro no lo propaga al camino de render: lo registra en el log
//! y devuelve la topología de respaldo (`fallback`), que es mínima
//! (`INITIAL → COMPLETED`) para que el flujo pueda terminar.
use indexmap::IndexMap;
use log::error;

use super::{FlowTopology, GroupFlow};
use crate::errors::ConfigurationError;
use crate::model::{ExperimentGroup, Phase};

#[derive(Debug, Clone)]
pub struct TopologyRegistry {
    groups: IndexMap<ExperimentGroup, GroupFlow>,
    fallback: GroupFlow,
}

impl TopologyRegistry {
    /// Registro vacío con la topología de respaldo indicada.
    pub fn new(fallback: GroupFlow) -> Self {
        Self { groups: IndexMap::new(),
               fallback }
    }

    /// Registro vacío con el respaldo mínimo `INITIAL → COMPLETED`.
    pub fn empty() -> Self {
        Self::new(GroupFlow::new(FlowTopology::trusted(vec![Phase::Initial, Phase::Completed]), false))
    }

    /// Tabla estándar de grupos del experimento.
    ///
    /// Los atajos por grupo se expresan con topologías más cortas, nunca
    /// saltando índices en tiempo de ejecución.
    pub fn standard() -> Self {
        use Phase::*;
        Self::empty().with_group(ExperimentGroup::Control,
                                 GroupFlow::new(FlowTopology::trusted(vec![Initial, Briefing, SkillPuzzle, Debrief, Completed]),
                                                false))
                     .with_group(ExperimentGroup::DisclosureOnly,
                                 GroupFlow::new(FlowTopology::trusted(vec![Initial,
                                                                           Briefing,
                                                                           Disclosure,
                                                                           SkillPuzzle,
                                                                           Debrief,
                                                                           Completed]),
                                                false))
                     .with_group(ExperimentGroup::ProofOfValue,
                                 GroupFlow::new(FlowTopology::trusted(vec![Initial,
                                                                           Briefing,
                                                                           ProofOfValue,
                                                                           SkillPuzzle,
                                                                           CompensationOffer,
                                                                           Debrief,
                                                                           Completed]),
                                                true))
                     .with_group(ExperimentGroup::FullTreatment,
                                 GroupFlow::new(FlowTopology::trusted(vec![Initial,
                                                                           Briefing,
                                                                           Disclosure,
                                                                           ProofOfValue,
                                                                           SkillPuzzle,
                                                                           CompensationOffer,
                                                                           Debrief,
                                                                           Completed]),
                                                true))
    }

    pub fn with_group(mut self, group: ExperimentGroup, flow: GroupFlow) -> Self {
        self.register(group, flow);
        self
    }

    /// Registra (o reemplaza) la entrada de un grupo.
    pub fn register(&mut self, group: ExperimentGroup, flow: GroupFlow) -> Option<GroupFlow> {
        self.groups.insert(group, flow)
    }

    /// Entrada del grupo, cayendo al respaldo (con log) si no existe.
    pub fn flow_for(&self, group: ExperimentGroup) -> &GroupFlow {
        match self.groups.get(&group) {
            Some(flow) => flow,
            None => {
                error!("topology:fallback group={group} reason=unregistered");
                &self.fallback
            }
        }
    }

    /// Variante estricta de `flow_for`.
    pub fn try_flow_for(&self, group: ExperimentGroup) -> Result<&GroupFlow, ConfigurationError> {
        self.groups.get(&group).ok_or(ConfigurationError::UnregisteredGroup(group))
    }

    pub fn get_topology(&self, group: ExperimentGroup) -> &FlowTopology {
        &self.flow_for(group).topology
    }

    /// Predicado "¿mostrar mensaje de cierre?" para un grupo.
    pub fn shows_completion_message(&self, group: ExperimentGroup) -> bool {
        self.flow_for(group).show_completion_message
    }

    pub fn fallback(&self) -> &GroupFlow {
        &self.fallback
    }

    /// Grupos registrados, en orden de registro.
    pub fn groups(&self) -> impl Iterator<Item = ExperimentGroup> + '_ {
        self.groups.keys().copied()
    }

    /// Todas las topologías alcanzables (incluida la de respaldo).
    pub fn topologies(&self) -> impl Iterator<Item = &FlowTopology> + '_ {
        self.groups.values().map(|f| &f.topology).chain(std::iter::once(&self.fallback.topology))
    }
}

impl Default for TopologyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
