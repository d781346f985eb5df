//! Carga de configuración del backend de estado desde variables de entorno.
//!
//! - `QUESTFLOW_STORE`: `file` (por defecto) o `postgres`.
//! - `QUESTFLOW_STATE_DIR`: directorio del backend de archivos.
//! - `DATABASE_URL`, `DATABASE_MIN_CONNECTIONS`, `DATABASE_MAX_CONNECTIONS`.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;

pub const DEFAULT_STATE_DIR: &str = ".questflow/state";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    /// `None` si `DATABASE_URL` no está definido.
    pub fn from_env() -> Option<Self> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
        where F: Fn(&str) -> Option<String>
    {
        let url = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty())?;
        let min_connections = lookup("DATABASE_MIN_CONNECTIONS").and_then(|v| v.parse().ok()).unwrap_or(1);
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS").and_then(|v| v.parse().ok()).unwrap_or(8);
        Some(Self { url,
                    min_connections,
                    max_connections })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    File { state_dir: PathBuf },
    Postgres(DbConfig),
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let backend = lookup("QUESTFLOW_STORE").unwrap_or_default();
        if backend.eq_ignore_ascii_case("postgres") {
            match DbConfig::from_lookup(&lookup) {
                Some(db) => return StoreConfig::Postgres(db),
                None => warn!("config:store backend=postgres but DATABASE_URL is unset; using file store"),
            }
        }
        let state_dir = lookup("QUESTFLOW_STATE_DIR").filter(|d| !d.trim().is_empty())
                                                     .unwrap_or_else(|| DEFAULT_STATE_DIR.to_string());
        StoreConfig::File { state_dir: PathBuf::from(state_dir) }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
