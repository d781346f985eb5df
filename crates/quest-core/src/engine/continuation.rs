//! Continuaciones ligadas a los mensajes (`onStepComplete`).
//!
//! Una continuación es un valor explícito: sabe qué acción representa
//! (avanzar de `from` a `to`, o cerrar el flujo) y mantiene una referencia
//! débil al motor. Las de replay están deshabilitadas; invocar una
//! continuación desactualizada no tiene efecto.
use std::fmt;
use std::sync::{Arc, Weak};

use super::core::EngineShared;
use crate::errors::FlowError;
use crate::model::Phase;
use crate::phase::StepInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationAction {
    Disabled,
    Advance { from: Phase, to: Phase },
    Finish,
}

/// Resultado de `start` o de invocar una continuación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowProgress {
    /// La frontera está visible y espera respuesta del usuario.
    AwaitingInput { phase: Phase },
    /// El mensaje de cierre está visible y espera confirmación.
    AwaitingAcknowledgement,
    Finished,
    /// Fallo local y recuperable; la misma continuación puede reintentarse.
    Failed(FlowError),
    /// Error de configuración o sesión: el flujo quedó terminado.
    Aborted(FlowError),
    /// La continuación ya no corresponde a la frontera actual.
    Stale,
    /// Hay un update en curso para esta ejecución.
    Busy,
    Disabled,
    Cancelled,
    /// El orquestador ya no existe.
    Detached,
    Terminated,
}

impl FlowProgress {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowProgress::Finished | FlowProgress::Aborted(_) | FlowProgress::Terminated)
    }
}

#[derive(Clone)]
pub struct Continuation {
    action: ContinuationAction,
    engine: Weak<EngineShared>,
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
         .field("action", &self.action)
         .field("attached", &(self.engine.strong_count() > 0))
         .finish()
    }
}

impl Continuation {
    pub fn disabled() -> Self {
        Self { action: ContinuationAction::Disabled,
               engine: Weak::new() }
    }

    pub(crate) fn advance(engine: &Arc<EngineShared>, from: Phase, to: Phase) -> Self {
        Self { action: ContinuationAction::Advance { from, to },
               engine: Arc::downgrade(engine) }
    }

    pub(crate) fn finish(engine: &Arc<EngineShared>) -> Self {
        Self { action: ContinuationAction::Finish,
               engine: Arc::downgrade(engine) }
    }

    #[inline]
    pub fn action(&self) -> ContinuationAction {
        self.action
    }

    /// Fase destino de un avance.
    pub fn target(&self) -> Option<Phase> {
        match self.action {
            ContinuationAction::Advance { to, .. } => Some(to),
            _ => None,
        }
    }

    /// `true` si invocarla ahora tendría efecto.
    pub fn is_enabled(&self) -> bool {
        match self.engine.upgrade() {
            Some(engine) => engine.accepts(self.action),
            None => false,
        }
    }

    pub async fn invoke(&self, input: StepInput) -> FlowProgress {
        if self.action == ContinuationAction::Disabled {
            return FlowProgress::Disabled;
        }
        let Some(engine) = self.engine.upgrade() else {
            return FlowProgress::Detached;
        };
        match self.action {
            ContinuationAction::Advance { from, to } => engine.advance(from, to, input).await,
            ContinuationAction::Finish => engine.acknowledge_completion(),
            ContinuationAction::Disabled => FlowProgress::Disabled,
        }
    }

    /// Atajo para fases sin datos que recolectar.
    pub async fn acknowledge(&self) -> FlowProgress {
        self.invoke(StepInput::empty()).await
    }
}
