//! Errores de persistencia.
//! Mapea errores de Diesel / IO / serde a variantes semánticas y éstas al
//! `GatewayError` que ve el orquestador.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use quest_core::GatewayError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("no flow state stored for session {0}")]
    NotFound(String),
    #[error("invalid session id: {0:?}")]
    InvalidSessionId(String),
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    #[error("stored state is corrupt: {0}")]
    Corrupt(String),
    #[error("unknown experiment group in stored state: {0}")]
    UnknownExperimentGroup(String),
    #[error("transition rejected: {0}")]
    Rejected(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound("row".into()),
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Corrupt(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Unknown(format!("ser: {e}")),
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::TransientIo(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

impl From<GatewayError> for PersistenceError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(s) => Self::NotFound(s),
            GatewayError::Rejected(s) => Self::Rejected(s),
            GatewayError::UnknownExperimentGroup(g) => Self::UnknownExperimentGroup(g),
            GatewayError::Decode(s) => Self::Corrupt(s),
            GatewayError::Transport(s) => Self::TransientIo(s),
        }
    }
}

impl From<PersistenceError> for GatewayError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(s) => GatewayError::NotFound(s),
            PersistenceError::Rejected(s) => GatewayError::Rejected(s),
            PersistenceError::InvalidSessionId(s) => GatewayError::Rejected(format!("invalid session id {s:?}")),
            PersistenceError::UniqueViolation(s) => GatewayError::Rejected(s),
            PersistenceError::UnknownExperimentGroup(g) => GatewayError::UnknownExperimentGroup(g),
            PersistenceError::Corrupt(s) => GatewayError::Decode(s),
            other => GatewayError::Transport(other.to_string()),
        }
    }
}
