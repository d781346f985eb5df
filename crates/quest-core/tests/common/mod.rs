//! Dobles de prueba compartidos por los tests de integración del orquestador.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record};
use tokio::sync::Semaphore;

use quest_core::engine::{ChatSurface, FailureNotifier, FinishReason, InstantScheduler};
use quest_core::{ChatMessage, ExperimentGroup, FlowCopy, FlowError, FlowOrchestrator, FlowState, GatewayError,
                 GroupAssignment, InMemoryStateGateway, MessageId, Phase, PhaseRecord, PresentationConfig,
                 StateGateway, UpdateRequest};

#[derive(Default)]
pub struct RecordingSurface {
    visible: Mutex<Vec<ChatMessage>>,
    added: AtomicUsize,
    removed: Mutex<Vec<MessageId>>,
}

impl RecordingSurface {
    pub fn visible(&self) -> Vec<ChatMessage> {
        self.visible.lock().unwrap().clone()
    }

    pub fn visible_phases(&self) -> Vec<Phase> {
        self.visible().iter().map(|m| m.phase()).collect()
    }

    pub fn last(&self) -> ChatMessage {
        self.visible().last().cloned().expect("at least one message")
    }

    pub fn added(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }

    pub fn removed(&self) -> Vec<MessageId> {
        self.removed.lock().unwrap().clone()
    }
}

impl ChatSurface for RecordingSurface {
    fn add_message(&self, message: ChatMessage) {
        self.added.fetch_add(1, Ordering::SeqCst);
        self.visible.lock().unwrap().push(message);
    }

    fn remove_message(&self, id: MessageId) {
        self.visible.lock().unwrap().retain(|m| m.id != id);
        self.removed.lock().unwrap().push(id);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub failures: Mutex<Vec<(Phase, FlowError)>>,
}

impl FailureNotifier for RecordingNotifier {
    fn notify_failure(&self, phase: Phase, error: &FlowError) {
        self.failures.lock().unwrap().push((phase, error.clone()));
    }
}

/// Gateway en memoria con fallos programables y una compuerta opcional
/// que retiene los `update` hasta liberar permisos.
pub struct ScriptedGateway {
    pub inner: InMemoryStateGateway,
    fetch_failures: Mutex<VecDeque<GatewayError>>,
    update_failures: Mutex<VecDeque<GatewayError>>,
    stall_updates: AtomicBool,
    yield_fetches: AtomicBool,
    gate: Option<Arc<Semaphore>>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn pinned(group: ExperimentGroup) -> Self {
        Self { inner: InMemoryStateGateway::new().with_assignment(GroupAssignment::Pinned(group)),
               fetch_failures: Mutex::new(VecDeque::new()),
               update_failures: Mutex::new(VecDeque::new()),
               stall_updates: AtomicBool::new(false),
               yield_fetches: AtomicBool::new(false),
               gate: None,
               fetch_calls: AtomicUsize::new(0),
               update_calls: AtomicUsize::new(0) }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn fail_next_fetch(&self, err: GatewayError) {
        self.fetch_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_update(&self, err: GatewayError) {
        self.update_failures.lock().unwrap().push_back(err);
    }

    /// Los `update` devuelven el estado sin aplicar la transición.
    pub fn stall_updates(&self, stall: bool) {
        self.stall_updates.store(stall, Ordering::SeqCst);
    }

    /// Cada `fetch` cede el control una vez antes de responder.
    pub fn yield_on_fetch(&self) {
        self.yield_fetches.store(true, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateGateway for ScriptedGateway {
    async fn fetch(&self, session_id: &str) -> Result<Option<FlowState>, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_fetches.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        let scripted = self.fetch_failures.lock().unwrap().pop_front();
        match scripted {
            Some(err) => Err(err),
            None => self.inner.fetch(session_id).await,
        }
    }

    async fn initialize(&self, session_id: &str) -> Result<FlowState, GatewayError> {
        self.inner.initialize(session_id).await
    }

    async fn update(&self, session_id: &str, request: UpdateRequest) -> Result<FlowState, GatewayError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.expect("gate open");
            permit.forget();
        }
        let scripted = self.update_failures.lock().unwrap().pop_front();
        if let Some(err) = scripted {
            return Err(err);
        }
        if self.stall_updates.load(Ordering::SeqCst) {
            return self.inner
                       .fetch(session_id)
                       .await?
                       .ok_or_else(|| GatewayError::NotFound(session_id.to_string()));
        }
        self.inner.update(session_id, request).await
    }
}

pub type Finishes = Arc<Mutex<Vec<FinishReason>>>;

pub struct Harness {
    pub orchestrator: FlowOrchestrator,
    pub surface: Arc<RecordingSurface>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<ScriptedGateway>,
    pub finishes: Finishes,
}

impl Harness {
    pub fn new(gateway: ScriptedGateway, session: &str) -> Self {
        let gateway = Arc::new(gateway);
        let surface = Arc::new(RecordingSurface::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let finishes: Finishes = Arc::default();
        let sink = finishes.clone();
        let orchestrator = FlowOrchestrator::builder(gateway.clone(), surface.clone()).factories(quest_adapters::standard_factories(&FlowCopy::default()))
                                                                                      .session(session)
                                                                                      .notifier(notifier.clone())
                                                                                      .scheduler(Arc::new(InstantScheduler::new()))
                                                                                      .presentation(PresentationConfig::instant())
                                                                                      .on_finish(move |reason| sink.lock().unwrap().push(reason))
                                                                                      .build()
                                                                                      .expect("standard wiring is valid");
        Self { orchestrator,
               surface,
               notifier,
               gateway,
               finishes }
    }

    pub fn finishes(&self) -> Vec<FinishReason> {
        self.finishes.lock().unwrap().clone()
    }
}

/// Estado persistido con el historial dado (timestamps crecientes).
pub fn persisted(session: &str, group: ExperimentGroup, history: &[Phase]) -> FlowState {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
    let mut state = FlowState::initial(session, group, base);
    state.phase_history = history.iter()
                                 .enumerate()
                                 .map(|(i, p)| PhaseRecord::new(*p, base + Duration::minutes(i as i64)))
                                 .collect();
    state
}

/// Logger global que retiene los registros para inspeccionarlos.
pub struct CapturedLogs {
    records: Mutex<Vec<(Level, String)>>,
}

static LOGS: CapturedLogs = CapturedLogs { records: Mutex::new(Vec::new()) };

impl Log for CapturedLogs {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records.lock().unwrap().push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

impl CapturedLogs {
    /// Registros de nivel `error` que mencionan `needle`.
    pub fn errors_mentioning(&self, needle: &str) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, msg)| *level == Level::Error && msg.contains(needle))
            .count()
    }
}

/// Instala el logger de captura (una vez por binario de test).
pub fn capture_logs() -> &'static CapturedLogs {
    if log::set_logger(&LOGS).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    &LOGS
}
