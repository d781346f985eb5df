use std::collections::HashMap;
use std::fmt;

use crate::engine::Continuation;
use crate::errors::ConfigurationError;
use crate::model::{ChatMessage, FlowState, Phase};
use crate::topology::FlowTopology;

/// Resultado de invocar una factory.
#[derive(Debug, Clone)]
pub enum FactoryOutput {
    /// La fase no tiene UI.
    Nothing,
    One(ChatMessage),
    /// Por ejemplo: indicador de escritura + mensaje real.
    Many(Vec<ChatMessage>),
}

impl FactoryOutput {
    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            FactoryOutput::Nothing => Vec::new(),
            FactoryOutput::One(m) => vec![m],
            FactoryOutput::Many(ms) => ms,
        }
    }
}

impl From<ChatMessage> for FactoryOutput {
    fn from(m: ChatMessage) -> Self {
        FactoryOutput::One(m)
    }
}

impl From<Vec<ChatMessage>> for FactoryOutput {
    fn from(ms: Vec<ChatMessage>) -> Self {
        if ms.is_empty() {
            FactoryOutput::Nothing
        } else {
            FactoryOutput::Many(ms)
        }
    }
}

impl From<Option<ChatMessage>> for FactoryOutput {
    fn from(m: Option<ChatMessage>) -> Self {
        m.map(FactoryOutput::One).unwrap_or(FactoryOutput::Nothing)
    }
}

/// Trait que define la factory de una fase. Implementaciones deben ser puras
/// respecto a `state` + `continuation`: la misma factory se invoca en replay
/// (continuación deshabilitada) y en vivo (continuación real).
pub trait PhaseFactory: Send + Sync {
    /// Fase que produce esta factory.
    fn phase(&self) -> Phase;

    /// Construye los mensajes de la fase, cableando `continuation` en el
    /// payload del mensaje interactivo.
    fn build(&self, state: &FlowState, continuation: Continuation) -> FactoryOutput;
}

/// Adaptador: cualquier closure `Fn(&FlowState, Continuation) -> FactoryOutput`
/// funciona como factory.
pub struct FnPhaseFactory<F> {
    phase: Phase,
    build: F,
}

impl<F> FnPhaseFactory<F> where F: Fn(&FlowState, Continuation) -> FactoryOutput + Send + Sync
{
    pub fn new(phase: Phase, build: F) -> Self {
        Self { phase, build }
    }
}

impl<F> PhaseFactory for FnPhaseFactory<F> where F: Fn(&FlowState, Continuation) -> FactoryOutput + Send + Sync
{
    fn phase(&self) -> Phase {
        self.phase
    }

    fn build(&self, state: &FlowState, continuation: Continuation) -> FactoryOutput {
        (self.build)(state, continuation)
    }
}

/// Tabla fase → factory.
#[derive(Default)]
pub struct PhaseFactoryMap {
    factories: HashMap<Phase, Box<dyn PhaseFactory>>,
}

impl fmt::Debug for PhaseFactoryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut phases: Vec<&str> = self.factories.keys().map(|p| p.as_str()).collect();
        phases.sort_unstable();
        f.debug_struct("PhaseFactoryMap").field("phases", &phases).finish()
    }
}

impl PhaseFactoryMap {
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Registra una factory bajo su propia fase; devuelve la anterior si la
    /// había.
    pub fn register(&mut self, factory: Box<dyn PhaseFactory>) -> Option<Box<dyn PhaseFactory>> {
        self.factories.insert(factory.phase(), factory)
    }

    pub fn with<T: PhaseFactory + 'static>(mut self, factory: T) -> Self {
        self.register(Box::new(factory));
        self
    }

    /// Atajo para registrar una closure.
    pub fn with_fn<F>(self, phase: Phase, build: F) -> Self
        where F: Fn(&FlowState, Continuation) -> FactoryOutput + Send + Sync + 'static
    {
        self.with(FnPhaseFactory::new(phase, build))
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.factories.contains_key(&phase)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Invoca la factory de `phase`.
    pub fn produce(&self,
                   phase: Phase,
                   state: &FlowState,
                   continuation: Continuation)
                   -> Result<Vec<ChatMessage>, ConfigurationError> {
        let factory = self.factories.get(&phase).ok_or(ConfigurationError::MissingFactory(phase))?;
        Ok(factory.build(state, continuation).into_messages())
    }

    /// Verifica que cada fase de la topología tenga factory.
    pub fn ensure_covers(&self, topology: &FlowTopology) -> Result<(), ConfigurationError> {
        match topology.phases().iter().find(|p| !self.contains(**p)) {
            Some(missing) => Err(ConfigurationError::MissingFactory(*missing)),
            None => Ok(()),
        }
    }
}
