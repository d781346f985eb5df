use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use log::debug;

use super::server::{apply_update, GroupAssignment};
use super::{StateGateway, UpdateRequest};
use crate::errors::GatewayError;
use crate::model::FlowState;
use crate::topology::TopologyRegistry;

/// Gateway en memoria que se comporta como el servidor: asigna grupo, agrega
/// registros y valida que cada transición sea la siguiente de la topología.
#[derive(Debug)]
pub struct InMemoryStateGateway {
    states: DashMap<String, FlowState>,
    registry: TopologyRegistry,
    assignment: GroupAssignment,
}

impl InMemoryStateGateway {
    pub fn new() -> Self {
        Self { states: DashMap::new(),
               registry: TopologyRegistry::standard(),
               assignment: GroupAssignment::Hashed }
    }

    pub fn with_registry(mut self, registry: TopologyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_assignment(mut self, assignment: GroupAssignment) -> Self {
        self.assignment = assignment;
        self
    }

    /// Precarga un estado (p. ej. para simular una sesión a mitad de flujo).
    pub fn seed(&self, state: FlowState) {
        self.states.insert(state.session_id.clone(), state);
    }

    /// Copia del estado actual de una sesión.
    pub fn snapshot(&self, session_id: &str) -> Option<FlowState> {
        self.states.get(session_id).map(|s| s.clone())
    }
}

impl Default for InMemoryStateGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateGateway for InMemoryStateGateway {
    async fn fetch(&self, session_id: &str) -> Result<Option<FlowState>, GatewayError> {
        Ok(self.snapshot(session_id))
    }

    async fn initialize(&self, session_id: &str) -> Result<FlowState, GatewayError> {
        let entry = self.states.entry(session_id.to_string()).or_insert_with(|| {
                                                                 let group = self.assignment.assign(session_id, &self.registry);
                                                                 debug!("initialize:create session={session_id} group={group}");
                                                                 FlowState::initial(session_id, group, Utc::now())
                                                             });
        Ok(entry.clone())
    }

    async fn update(&self, session_id: &str, request: UpdateRequest) -> Result<FlowState, GatewayError> {
        let mut entry = self.states
                            .get_mut(session_id)
                            .ok_or_else(|| GatewayError::NotFound(session_id.to_string()))?;
        let next = apply_update(&entry, &request, &self.registry, Utc::now())?;
        *entry = next.clone();
        debug!("update:done session={session_id} phase={} records={}",
               request.target,
               next.phase_history.len());
        Ok(next)
    }
}
