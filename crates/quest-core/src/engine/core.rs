//! Orquestador del flujo de experimento.
//!
//! `start` resuelve el estado remoto (fetch, o initialize si no existe),
//! reconstruye la historia con continuaciones deshabilitadas y presenta la
//! frontera con una continuación viva. Cada continuación confirmada hace un
//! `update` contra el gateway y sólo entonces avanza la máquina un índice.
//!
//! El `RunState` vive detrás de un `Mutex` síncrono que nunca se mantiene
//! tomado a través de un `.await`.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};

use super::builder::OrchestratorBuilder;
use super::continuation::{Continuation, ContinuationAction, FlowProgress};
use super::run_state::{RunSnapshot, RunState};
use super::scheduler::PresentationScheduler;
use super::surface::{ChatSurface, FailureNotifier, FinishHook, FinishReason, SessionProvider};
use super::transition::{FlowMachine, MachineEvent};
use crate::config::PresentationConfig;
use crate::errors::{ConfigurationError, FlowError, GatewayError, SessionError};
use crate::gateway::{StateGateway, UpdateRequest};
use crate::model::{ChatMessage, FlowState, Phase};
use crate::phase::{PhaseFactoryMap, StepInput};
use crate::replay::{plan_replay, ReplayPlan};
use crate::topology::TopologyRegistry;

pub(crate) struct EngineShared {
    pub(crate) gateway: Arc<dyn StateGateway>,
    pub(crate) registry: TopologyRegistry,
    pub(crate) factories: PhaseFactoryMap,
    pub(crate) surface: Arc<dyn ChatSurface>,
    pub(crate) notifier: Arc<dyn FailureNotifier>,
    pub(crate) sessions: Arc<dyn SessionProvider>,
    pub(crate) scheduler: Arc<dyn PresentationScheduler>,
    pub(crate) presentation: PresentationConfig,
    pub(crate) finish: FinishHook,
    pub(crate) run: Mutex<RunState>,
}

impl EngineShared {
    fn run(&self) -> MutexGuard<'_, RunState> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn accepts(&self, action: ContinuationAction) -> bool {
        let run = self.run();
        match action {
            ContinuationAction::Disabled => false,
            ContinuationAction::Advance { from, .. } => {
                !run.machine.is_terminated() && !run.in_flight && run.frontier() == Some(from)
            }
            ContinuationAction::Finish => !run.finished,
        }
    }

    pub(crate) async fn start(self: &Arc<Self>) -> FlowProgress {
        if self.scheduler.is_cancelled() {
            return FlowProgress::Cancelled;
        }
        let terminated = self.run().machine.is_terminated();
        if terminated {
            return FlowProgress::Terminated;
        }

        let session_id = match self.sessions.current_session() {
            Some(id) if !id.trim().is_empty() => id,
            _ => return self.abort(SessionError::NoActiveSession.into()),
        };
        self.run().session_id.get_or_insert_with(|| session_id.clone());
        let state = match self.resolve(&session_id).await {
            Ok(state) => state,
            Err(err) => return self.abort(err),
        };
        if self.scheduler.is_cancelled() {
            return FlowProgress::Cancelled;
        }

        let flow = self.registry.flow_for(state.experiment_group).clone();
        let plan = match plan_replay(&state, &flow.topology) {
            Ok(plan) => plan,
            Err(err) => return self.abort(err.into()),
        };
        let resolved = {
            let mut run = self.run();
            let resolved = run.apply(MachineEvent::Resolved { phase: plan.frontier,
                                                              index: plan.frontier_index });
            if resolved.is_ok() {
                run.session_id = Some(session_id.clone());
                run.group = Some(state.experiment_group);
                run.topology = Some(flow.topology.clone());
                run.show_completion = flow.show_completion_message;
            }
            resolved
        };
        if let Err(err) = resolved {
            warn!("start:ignored session={session_id} reason={err}");
            return FlowProgress::Stale;
        }
        info!("start:resolved session={session_id} group={} phase={} topology={}",
              state.experiment_group,
              plan.frontier,
              flow.topology.topology_hash());

        self.replay(&state, &plan).await
    }

    /// fetch, y si no hay estado (o el fetch falló por transporte) initialize.
    async fn resolve(&self, session_id: &str) -> Result<FlowState, FlowError> {
        match self.gateway.fetch(session_id).await {
            Ok(Some(state)) => return Ok(state),
            Ok(None) => debug!("resolve:initialize session={session_id} reason=absent"),
            Err(err) if err.is_transient() => {
                warn!("resolve:fetch_failed session={session_id} error={err}; trying initialize")
            }
            Err(err) => return Err(err.into()),
        }
        Ok(self.gateway.initialize(session_id).await?)
    }

    async fn replay(self: &Arc<Self>, state: &FlowState, plan: &ReplayPlan) -> FlowProgress {
        for &phase in plan.historical() {
            let fresh = self.run().mark_shown(phase);
            if !fresh {
                debug!("replay:skip phase={phase} reason=already_shown");
                continue;
            }
            match self.factories.produce(phase, state, Continuation::disabled()) {
                Ok(messages) => self.emit_now(messages),
                Err(err) => return self.abort(err.into()),
            }
        }
        self.present_frontier(state, plan, false).await
    }

    async fn present_frontier(self: &Arc<Self>, state: &FlowState, plan: &ReplayPlan, paced: bool) -> FlowProgress {
        let phase = plan.frontier;
        if plan.is_terminal() {
            return self.present_completion(state, paced).await;
        }
        let (fresh, next) = {
            let mut run = self.run();
            let next = run.topology.as_ref().and_then(|t| t.get(plan.frontier_index + 1));
            (run.mark_shown(phase), next)
        };
        if !fresh {
            return FlowProgress::AwaitingInput { phase };
        }
        let Some(next) = next else {
            let err = ConfigurationError::InvalidTopology(format!("no phase after {phase}"));
            return self.abort(err.into());
        };
        let messages = match self.factories.produce(phase, state, Continuation::advance(self, phase, next)) {
            Ok(messages) => messages,
            Err(err) => return self.abort(err.into()),
        };
        if !self.emit(phase, messages, paced).await {
            return FlowProgress::Cancelled;
        }
        debug!("frontier:shown phase={phase} next={next}");
        FlowProgress::AwaitingInput { phase }
    }

    async fn present_completion(self: &Arc<Self>, state: &FlowState, paced: bool) -> FlowProgress {
        let show = self.run().show_completion;
        if !show {
            return self.complete();
        }
        let fresh = self.run().mark_shown(Phase::Completed);
        if !fresh {
            return FlowProgress::AwaitingAcknowledgement;
        }
        let messages = match self.factories.produce(Phase::Completed, state, Continuation::finish(self)) {
            Ok(messages) => messages,
            Err(err) => return self.abort(err.into()),
        };
        // Sin mensaje visible nadie podría confirmar el cierre.
        if messages.iter().all(ChatMessage::is_transient) {
            return self.complete();
        }
        if !self.emit(Phase::Completed, messages, paced).await {
            return FlowProgress::Cancelled;
        }
        FlowProgress::AwaitingAcknowledgement
    }

    pub(crate) async fn advance(self: &Arc<Self>, from: Phase, to: Phase, input: StepInput) -> FlowProgress {
        let session_id = {
            let mut run = self.run();
            if run.machine.is_terminated() || run.frontier() != Some(from) {
                return FlowProgress::Stale;
            }
            if run.in_flight {
                return FlowProgress::Busy;
            }
            let Some(session_id) = run.session_id.clone() else {
                return FlowProgress::Stale;
            };
            run.in_flight = true;
            session_id
        };
        debug!("advance:request session={session_id} from={from} to={to} early_stop={}",
               input.is_early_stop());

        let state = match self.gateway.update(&session_id, UpdateRequest::new(to, input)).await {
            Ok(state) => state,
            Err(err) => return self.advance_failed(from, err.into()),
        };
        if self.scheduler.is_cancelled() {
            self.run().in_flight = false;
            return FlowProgress::Cancelled;
        }

        let topology = self.run().topology.clone();
        let plan = match topology.as_ref().map(|t| plan_replay(&state, t)) {
            Some(Ok(plan)) => plan,
            Some(Err(err)) => {
                self.run().in_flight = false;
                return self.abort(err.into());
            }
            None => {
                self.run().in_flight = false;
                return FlowProgress::Stale;
            }
        };
        if plan.frontier != to {
            let err = GatewayError::Rejected(format!("server reports {} after requesting {to}", plan.frontier));
            return self.advance_failed(from, err.into());
        }

        let moved = {
            let mut run = self.run();
            run.in_flight = false;
            run.apply(MachineEvent::Advanced { phase: to,
                                               index: plan.frontier_index })
        };
        if let Err(err) = moved {
            warn!("advance:ignored session={session_id} from={from} to={to} reason={err}");
            return FlowProgress::Stale;
        }
        info!("advance:done session={session_id} from={from} to={to}");

        self.present_frontier(&state, &plan, true).await
    }

    fn advance_failed(&self, from: Phase, err: FlowError) -> FlowProgress {
        self.run().in_flight = false;
        if !err.is_recoverable() {
            return self.abort(err);
        }
        warn!("advance:failed phase={from} error={err}");
        self.notifier.notify_failure(from, &err);
        FlowProgress::Failed(err)
    }

    pub(crate) fn acknowledge_completion(&self) -> FlowProgress {
        let finished = self.run().finished;
        if finished {
            return FlowProgress::Stale;
        }
        self.complete()
    }

    fn complete(&self) -> FlowProgress {
        let session = {
            let mut run = self.run();
            if let Err(err) = run.apply(MachineEvent::Finished) {
                debug!("complete:machine reason={err}");
            }
            run.session_id.clone()
        };
        info!("flow:completed session={}", session.as_deref().unwrap_or("-"));
        self.finish_once(FinishReason::Completed);
        FlowProgress::Finished
    }

    fn abort(&self, err: FlowError) -> FlowProgress {
        let session = {
            let mut run = self.run();
            let event = match run.machine {
                FlowMachine::Fetching => MachineEvent::ResolveFailed,
                _ => MachineEvent::Finished,
            };
            if let Err(reason) = run.apply(event) {
                debug!("abort:machine reason={reason}");
            }
            run.session_id.clone()
        };
        error!("flow:aborted session={} error={err}", session.as_deref().unwrap_or("-"));
        self.finish_once(FinishReason::Aborted(err.clone()));
        FlowProgress::Aborted(err)
    }

    fn finish_once(&self, reason: FinishReason) {
        let first = self.run().take_finish();
        if first {
            (self.finish)(reason);
        }
    }

    fn emit_now(&self, messages: Vec<ChatMessage>) {
        for message in messages.into_iter().filter(|m| !m.is_transient()) {
            self.surface.add_message(message);
        }
    }

    /// Emite con pausas; `false` si el scheduler se canceló a mitad.
    async fn emit(&self, phase: Phase, messages: Vec<ChatMessage>, paced: bool) -> bool {
        if !paced {
            self.emit_now(messages);
            return true;
        }
        for message in messages {
            if message.is_transient() {
                let id = message.id;
                self.surface.add_message(message);
                let waited = self.scheduler.pause(self.presentation.typing_delay()).await;
                self.surface.remove_message(id);
                if !waited {
                    return false;
                }
            } else {
                if !self.scheduler.pause(self.presentation.delay_for(phase)).await {
                    return false;
                }
                self.surface.add_message(message);
            }
        }
        true
    }
}

/// Handle público del motor.
///
/// El host debe mantenerlo vivo mientras haya mensajes en pantalla: las
/// continuaciones sólo guardan una referencia débil y devuelven
/// `FlowProgress::Detached` una vez que el orquestador se libera.
#[derive(Clone)]
pub struct FlowOrchestrator {
    pub(crate) shared: Arc<EngineShared>,
}

impl FlowOrchestrator {
    pub fn builder(gateway: Arc<dyn StateGateway>, surface: Arc<dyn ChatSurface>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(gateway, surface)
    }

    /// Resuelve el estado remoto, reconstruye la historia y presenta la
    /// frontera. Invocarlo otra vez no duplica mensajes.
    pub async fn start(&self) -> FlowProgress {
        self.shared.start().await
    }

    /// Teardown: cancela pausas pendientes; nada más se emite.
    pub fn cleanup(&self) {
        self.shared.scheduler.cancel();
        let session = self.shared.run().session_id.clone();
        info!("flow:cleanup session={}", session.as_deref().unwrap_or("-"));
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.shared.run().snapshot()
    }

    pub fn registry(&self) -> &TopologyRegistry {
        &self.shared.registry
    }
}
