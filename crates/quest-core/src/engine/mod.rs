mod builder;
mod continuation;
mod core;
mod run_state;
mod scheduler;
mod surface;
mod transition;

pub use builder::OrchestratorBuilder;
pub use continuation::{Continuation, ContinuationAction, FlowProgress};
pub use self::core::FlowOrchestrator;
pub use run_state::{RunSnapshot, RunState};
pub use scheduler::{InstantScheduler, PresentationScheduler, TokioScheduler};
pub use surface::{ChatSurface, FailureNotifier, FinishHook, FinishReason, LogNotifier, SessionProvider, StaticSession};
pub use transition::{transition, FlowMachine, MachineEvent, TransitionError};
