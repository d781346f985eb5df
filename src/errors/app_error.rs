use quest_core::ConfigurationError;
use quest_persistence::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(#[from] ConfigurationError),
    #[error("Error de almacenamiento: {0}")]
    Store(#[from] PersistenceError),
    #[error("Uso inválido: {0}")]
    Usage(String),
}
