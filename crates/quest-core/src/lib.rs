//! quest-core: motor del flujo de experimento conversacional.
//!
//! Un cuestionario de chat recorre una secuencia de fases que depende del
//! grupo de experimento asignado a la sesión. El progreso vive en un estado
//! remoto (ver `gateway`); el orquestador lo resuelve, reconstruye la
//! historia en la superficie de chat y avanza fase a fase sólo cuando el
//! servidor confirma cada transición.
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod gateway;
pub mod hashing;
pub mod model;
pub mod phase;
pub mod replay;
pub mod topology;

pub use config::{FlowConfig, FlowCopy, PresentationConfig};
pub use engine::{ChatSurface, Continuation, ContinuationAction, FailureNotifier, FinishReason, FlowOrchestrator,
                 FlowProgress, InstantScheduler, OrchestratorBuilder, PresentationScheduler, RunSnapshot,
                 SessionProvider, StaticSession, TokioScheduler};
pub use errors::{ConfigurationError, FlowError, GatewayError, SessionError};
pub use gateway::{GroupAssignment, InMemoryStateGateway, StateGateway, UpdateRequest};
pub use model::{ChatMessage, ExperimentGroup, FlowState, FlowStateDto, MessageId, MessageKind, Phase, PhaseRecord,
                Renderer, Sender};
pub use phase::{FactoryOutput, PhaseFactory, PhaseFactoryMap, StepInput};
pub use replay::{plan_replay, ReplayPlan};
pub use topology::{FlowTopology, GroupFlow, TopologyRegistry};
