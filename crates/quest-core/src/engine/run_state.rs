//! Registro de estado explícito de una ejecución del orquestador.
//!
//! Todo lo que el flujo necesita recordar entre suspensiones vive aquí
//! (sesión, grupo, topología, máquina, fases ya mostradas), no en closures
//! dispersas. El set `shown` dura lo que dura la ejecución y garantiza a lo
//! sumo un mensaje por fase, incluso ante invocaciones re-entrantes.
use indexmap::IndexSet;

use super::transition::{transition, FlowMachine, MachineEvent, TransitionError};
use crate::model::{ExperimentGroup, Phase};
use crate::topology::FlowTopology;

#[derive(Debug, Default)]
pub struct RunState {
    pub session_id: Option<String>,
    pub group: Option<ExperimentGroup>,
    pub topology: Option<FlowTopology>,
    pub show_completion: bool,
    pub machine: FlowMachine,
    pub shown: IndexSet<Phase>,
    pub in_flight: bool,
    pub finished: bool,
}

impl RunState {
    pub fn apply(&mut self, event: MachineEvent) -> Result<(), TransitionError> {
        self.machine = transition(self.machine, event)?;
        Ok(())
    }

    /// Marca la fase como mostrada; `false` si ya lo estaba.
    pub fn mark_shown(&mut self, phase: Phase) -> bool {
        self.shown.insert(phase)
    }

    pub fn frontier(&self) -> Option<Phase> {
        self.machine.frontier()
    }

    /// `true` sólo la primera vez: el hook de cierre se invoca una única vez.
    pub fn take_finish(&mut self) -> bool {
        if self.finished {
            false
        } else {
            self.finished = true;
            true
        }
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot { session_id: self.session_id.clone(),
                      group: self.group,
                      machine: self.machine,
                      shown: self.shown.iter().copied().collect(),
                      in_flight: self.in_flight,
                      finished: self.finished }
    }
}

/// Vista inmutable de `RunState` para hosts y tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub session_id: Option<String>,
    pub group: Option<ExperimentGroup>,
    pub machine: FlowMachine,
    /// Fases mostradas, en orden de emisión.
    pub shown: Vec<Phase>,
    pub in_flight: bool,
    pub finished: bool,
}
