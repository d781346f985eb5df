//! Puertos hacia el host: superficie de chat, notificación de fallos,
//! proveedor de sesión y hook de cierre.
use std::sync::Arc;

use log::warn;

use crate::errors::FlowError;
use crate::model::{ChatMessage, MessageId, Phase};

/// Lista de mensajes visible. Añadir o quitar no falla: la superficie es
/// local al host.
pub trait ChatSurface: Send + Sync {
    fn add_message(&self, message: ChatMessage);
    fn remove_message(&self, id: MessageId);
}

/// Aviso no bloqueante de fallo recuperable (el usuario puede reintentar).
pub trait FailureNotifier: Send + Sync {
    fn notify_failure(&self, phase: Phase, error: &FlowError);
}

/// Notificador por defecto: sólo deja rastro en el log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl FailureNotifier for LogNotifier {
    fn notify_failure(&self, phase: Phase, error: &FlowError) {
        warn!("notify:failure phase={phase} error={error}");
    }
}

/// Fuente del identificador de sesión activo.
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<String>;
}

#[derive(Debug, Default, Clone)]
pub struct StaticSession(Option<String>);

impl StaticSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self(Some(session_id.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl SessionProvider for StaticSession {
    fn current_session(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<F> SessionProvider for F where F: Fn() -> Option<String> + Send + Sync
{
    fn current_session(&self) -> Option<String> {
        self()
    }
}

/// Motivo con el que se invoca el hook de cierre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Completed,
    Aborted(FlowError),
}

pub type FinishHook = Arc<dyn Fn(FinishReason) + Send + Sync>;
