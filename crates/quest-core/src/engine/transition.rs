//! Máquina de estados del flujo como funciones de transición puras.
//!
//! Estados: `Fetching`, una posición por fase (`AtPhase`) y `Terminated`.
//! Transiciones válidas:
//! - `Fetching` -> `AtPhase` (resolve exitoso, en cualquier índice: resume)
//! - `Fetching` -> `Terminated` (resolve fallido)
//! - `AtPhase[i]` -> `AtPhase[i+1]` (sólo tras un update confirmado)
//! - `AtPhase[i]` -> `AtPhase[j]`, `j >= i` (re-resolve re-entrante)
//! - `AtPhase` -> `Terminated` (cierre o aborto)
//!
//! No se permiten saltos de índice ni retrocesos.
use thiserror::Error;

use crate::model::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowMachine {
    #[default]
    Fetching,
    AtPhase {
        phase: Phase,
        index: usize,
    },
    Terminated,
}

impl FlowMachine {
    pub fn frontier(&self) -> Option<Phase> {
        match self {
            FlowMachine::AtPhase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        matches!(self, FlowMachine::Terminated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineEvent {
    Resolved { phase: Phase, index: usize },
    ResolveFailed,
    Advanced { phase: Phase, index: usize },
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TransitionError {
    #[error("machine already terminated")]
    Terminated,
    #[error("advance from index {from} to {to} is not a single step")]
    NotSingleStep { from: usize, to: usize },
    #[error("resolved index {resolved} is behind current index {current}")]
    Regressed { current: usize, resolved: usize },
    #[error("event {event:?} is not valid while {state:?}")]
    Illegal { state: FlowMachine, event: MachineEvent },
}

pub fn transition(current: FlowMachine, event: MachineEvent) -> Result<FlowMachine, TransitionError> {
    use FlowMachine::*;
    use MachineEvent::*;
    match (current, event) {
        (Terminated, _) => Err(TransitionError::Terminated),
        (Fetching, Resolved { phase, index }) => Ok(AtPhase { phase, index }),
        (Fetching, ResolveFailed) => Ok(Terminated),
        (AtPhase { index: current, .. }, Resolved { phase, index }) => {
            if index < current {
                Err(TransitionError::Regressed { current,
                                                 resolved: index })
            } else {
                Ok(AtPhase { phase, index })
            }
        }
        (AtPhase { index: from, .. }, Advanced { phase, index }) => {
            if index == from + 1 {
                Ok(AtPhase { phase, index })
            } else {
                Err(TransitionError::NotSingleStep { from, to: index })
            }
        }
        (AtPhase { .. }, Finished) | (Fetching, Finished) => Ok(Terminated),
        (state, event) => Err(TransitionError::Illegal { state, event }),
    }
}
