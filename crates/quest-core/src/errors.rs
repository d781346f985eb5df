//! Errores específicos del core.
//!
//! Taxonomía:
//! - `ConfigurationError`: grupo desconocido, fase fuera de su topología,
//!   factory ausente o topología mal formada.
//! - `SessionError`: no hay identificador de sesión activo.
//! - `GatewayError`: fallo de red/servidor en fetch, initialize o update.
//!
//! `FlowError` agrupa las tres; el orquestador decide si aborta el flujo o si
//! el error es local y recuperable (ver `FlowError::is_recoverable`).

use thiserror::Error;

use crate::model::{ExperimentGroup, Phase};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigurationError {
    #[error("unknown experiment group: {0}")]
    UnknownExperimentGroup(String),
    #[error("no topology registered for group {0}")]
    UnregisteredGroup(ExperimentGroup),
    #[error("phase {phase} is not part of the topology for group {group}")]
    PhaseNotInTopology { phase: Phase, group: ExperimentGroup },
    #[error("no message factory registered for phase {0}")]
    MissingFactory(Phase),
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    #[error("persisted phase history is empty")]
    EmptyHistory,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SessionError {
    #[error("no active session identifier available")]
    NoActiveSession,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("no flow state for session {0}")]
    NotFound(String),
    #[error("update rejected: {0}")]
    Rejected(String),
    #[error("unknown experiment group in response: {0}")]
    UnknownExperimentGroup(String),
    #[error("malformed flow state: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Errores de transporte: un `fetch` fallido todavía permite intentar
    /// `initialize`.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FlowError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("remote state error: {0}")]
    RemoteState(GatewayError),
}

impl From<GatewayError> for FlowError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownExperimentGroup(group) => {
                FlowError::Configuration(ConfigurationError::UnknownExperimentGroup(group))
            }
            other => FlowError::RemoteState(other),
        }
    }
}

impl FlowError {
    /// Sólo un `RemoteStateError` durante un avance en vivo es recuperable;
    /// todo lo demás aborta el flujo.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::RemoteState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_group_from_gateway_is_a_configuration_error() {
        let err: FlowError = GatewayError::UnknownExperimentGroup("beta_v9".into()).into();
        assert_eq!(err,
                   FlowError::Configuration(ConfigurationError::UnknownExperimentGroup("beta_v9".into())));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn transport_errors_stay_remote_and_recoverable() {
        let err: FlowError = GatewayError::Transport("timeout".into()).into();
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "remote state error: transport failure: timeout");
    }
}
