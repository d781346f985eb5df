//! Modelos neutrales del flujo (Phase, ExperimentGroup, FlowState, ChatMessage).

pub mod group;
pub mod message;
pub mod phase;
pub mod state;

pub use group::ExperimentGroup;
pub use message::{ChatMessage, MessageId, MessageKind, MessagePayload, Renderer, Sender};
pub use phase::Phase;
pub use state::{FlowState, FlowStateDto, PhaseRecord};
