use std::sync::{Arc, Mutex};

use log::debug;

use super::core::{EngineShared, FlowOrchestrator};
use super::run_state::RunState;
use super::scheduler::{PresentationScheduler, TokioScheduler};
use super::surface::{ChatSurface, FailureNotifier, FinishHook, FinishReason, LogNotifier, SessionProvider,
                     StaticSession};
use crate::config::{FlowConfig, PresentationConfig};
use crate::errors::ConfigurationError;
use crate::gateway::StateGateway;
use crate::phase::PhaseFactoryMap;
use crate::topology::{FlowTopology, TopologyRegistry};

/// Builder del orquestador.
///
/// `build` valida que toda topología registrada (incluida la de fallback)
/// esté bien formada y que cada una de sus fases tenga factory.
pub struct OrchestratorBuilder {
    gateway: Arc<dyn StateGateway>,
    surface: Arc<dyn ChatSurface>,
    registry: TopologyRegistry,
    factories: PhaseFactoryMap,
    notifier: Arc<dyn FailureNotifier>,
    sessions: Arc<dyn SessionProvider>,
    scheduler: Arc<dyn PresentationScheduler>,
    presentation: PresentationConfig,
    finish: FinishHook,
}

impl OrchestratorBuilder {
    pub fn new(gateway: Arc<dyn StateGateway>, surface: Arc<dyn ChatSurface>) -> Self {
        Self { gateway,
               surface,
               registry: TopologyRegistry::standard(),
               factories: PhaseFactoryMap::new(),
               notifier: Arc::new(LogNotifier),
               sessions: Arc::new(StaticSession::none()),
               scheduler: Arc::new(TokioScheduler::new()),
               presentation: PresentationConfig::default(),
               finish: Arc::new(|_| {}) }
    }

    pub fn registry(mut self, registry: TopologyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn factories(mut self, factories: PhaseFactoryMap) -> Self {
        self.factories = factories;
        self
    }

    pub fn session(self, session_id: impl Into<String>) -> Self {
        self.session_provider(StaticSession::new(session_id))
    }

    pub fn session_provider<P: SessionProvider + 'static>(mut self, provider: P) -> Self {
        self.sessions = Arc::new(provider);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn FailureNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn PresentationScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn presentation(mut self, presentation: PresentationConfig) -> Self {
        self.presentation = presentation;
        self
    }

    /// Toma la parte de presentación; los textos los consumen las factories.
    pub fn config(self, config: &FlowConfig) -> Self {
        self.presentation(config.presentation.clone())
    }

    pub fn on_finish<F>(mut self, hook: F) -> Self
        where F: Fn(FinishReason) + Send + Sync + 'static
    {
        self.finish = Arc::new(hook);
        self
    }

    pub fn build(self) -> Result<FlowOrchestrator, ConfigurationError> {
        for topology in self.registry.topologies() {
            FlowTopology::new(topology.phases().to_vec())?;
            self.factories.ensure_covers(topology)?;
        }
        debug!("builder:ok groups={} factories={}",
               self.registry.groups().count(),
               self.factories.len());
        let shared = EngineShared { gateway: self.gateway,
                                    registry: self.registry,
                                    factories: self.factories,
                                    surface: self.surface,
                                    notifier: self.notifier,
                                    sessions: self.sessions,
                                    scheduler: self.scheduler,
                                    presentation: self.presentation,
                                    finish: self.finish,
                                    run: Mutex::new(RunState::default()) };
        Ok(FlowOrchestrator { shared: Arc::new(shared) })
    }
}
