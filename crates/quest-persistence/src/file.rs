//! Backend de archivos: un JSON (`FlowStateDto`, camelCase) por sesión.
//!
//! Pensado para la demo de terminal y para tests: el flujo sobrevive a
//! reinicios del proceso. Las escrituras son atómicas (temporal en el mismo
//! directorio + fsync + persist). `initialize` y `update` toman un lock
//! exclusivo sobre `<session>.lock`, así el read-modify-write no se intercala
//! aunque haya varias instancias o procesos sobre el mismo directorio.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use log::debug;
use quest_core::gateway::{apply_update, GroupAssignment};
use quest_core::{FlowState, FlowStateDto, GatewayError, StateGateway, TopologyRegistry, UpdateRequest};
use tempfile::NamedTempFile;

use crate::error::PersistenceError;

#[derive(Clone)]
pub struct FileStateGateway {
    root: PathBuf,
    registry: Arc<TopologyRegistry>,
    assignment: GroupAssignment,
}

/// Lock de sesión; se libera al soltarlo.
struct SessionLock {
    file: File,
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl FileStateGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(),
               registry: Arc::new(TopologyRegistry::standard()),
               assignment: GroupAssignment::Hashed }
    }

    pub fn with_registry(mut self, registry: TopologyRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_assignment(mut self, assignment: GroupAssignment) -> Self {
        self.assignment = assignment;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ruta del archivo de una sesión.
    pub fn path_for(&self, session_id: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !session_id.is_empty()
                    && session_id.len() <= 128
                    && session_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidSessionId(session_id.to_string()));
        }
        Ok(self.root.join(format!("{session_id}.json")))
    }

    fn lock_session(&self, session_id: &str) -> Result<SessionLock, PersistenceError> {
        let path = self.path_for(session_id)?.with_extension("lock");
        fs::create_dir_all(&self.root)?;
        let file = OpenOptions::new().create(true)
                                     .read(true)
                                     .write(true)
                                     .truncate(false)
                                     .open(&path)?;
        file.lock_exclusive()?;
        Ok(SessionLock { file })
    }

    fn read(&self, session_id: &str) -> Result<Option<FlowState>, PersistenceError> {
        let path = self.path_for(session_id)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let dto: FlowStateDto = serde_json::from_str(&raw)?;
        Ok(Some(FlowState::try_from(dto)?))
    }

    fn write(&self, state: &FlowState) -> Result<(), PersistenceError> {
        let path = self.path_for(&state.session_id)?;
        let body = serde_json::to_vec_pretty(&state.to_dto())?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| PersistenceError::from(e.error))?;
        Ok(())
    }

    fn initialize_locked(&self, session_id: &str) -> Result<FlowState, PersistenceError> {
        let _lock = self.lock_session(session_id)?;
        if let Some(existing) = self.read(session_id)? {
            return Ok(existing);
        }
        let group = self.assignment.assign(session_id, &self.registry);
        let state = FlowState::initial(session_id, group, Utc::now());
        self.write(&state)?;
        debug!("file:initialize session={session_id} group={group} path={}",
               self.root.display());
        Ok(state)
    }

    fn update_locked(&self, session_id: &str, request: &UpdateRequest) -> Result<FlowState, PersistenceError> {
        let _lock = self.lock_session(session_id)?;
        let current = self.read(session_id)?
                          .ok_or_else(|| PersistenceError::NotFound(session_id.to_string()))?;
        let next = apply_update(&current, request, &self.registry, Utc::now())?;
        self.write(&next)?;
        debug!("file:update session={session_id} phase={}", request.target);
        Ok(next)
    }

    /// Ejecuta IO síncrono (y la espera del lock) fuera del runtime.
    async fn blocking<T, F>(&self, work: F) -> Result<T, GatewayError>
        where F: FnOnce(&FileStateGateway) -> Result<T, PersistenceError> + Send + 'static,
              T: Send + 'static
    {
        let gateway = self.clone();
        match tokio::task::spawn_blocking(move || work(&gateway)).await {
            Ok(result) => result.map_err(GatewayError::from),
            Err(join) => Err(GatewayError::Transport(format!("blocking task failed: {join}"))),
        }
    }
}

#[async_trait]
impl StateGateway for FileStateGateway {
    async fn fetch(&self, session_id: &str) -> Result<Option<FlowState>, GatewayError> {
        let id = session_id.to_string();
        self.blocking(move |gw| gw.read(&id)).await
    }

    async fn initialize(&self, session_id: &str) -> Result<FlowState, GatewayError> {
        let id = session_id.to_string();
        self.blocking(move |gw| gw.initialize_locked(&id)).await
    }

    async fn update(&self, session_id: &str, request: UpdateRequest) -> Result<FlowState, GatewayError> {
        let id = session_id.to_string();
        self.blocking(move |gw| gw.update_locked(&id, &request)).await
    }
}
