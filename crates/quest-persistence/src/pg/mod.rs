//! Backend Postgres (Diesel) del Remote State Gateway.
//!
//! - Una fila por sesión en `flow_sessions`; `state` guarda el
//!   `FlowStateDto` completo (camelCase) como JSONB.
//! - `update` corre en una transacción con `SELECT ... FOR UPDATE`, de modo
//!   que dos avances concurrentes sobre la misma sesión se serializan y el
//!   segundo es rechazado por las reglas de `apply_update`.
//! - Diesel es síncrono: cada operación corre en `spawn_blocking`.
//! - Errores transitorios (pool, serialización) se reintentan con backoff.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, warn};
use serde_json::Value;

use quest_core::gateway::{apply_update, GroupAssignment};
use quest_core::{FlowState, FlowStateDto, GatewayError, StateGateway, TopologyRegistry, UpdateRequest};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::flow_sessions;

/// Pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones (pool real o doble de test).
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

#[derive(Queryable, Debug)]
pub struct SessionRow {
    pub session_id: String,
    pub experiment_group: String,
    pub state: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = flow_sessions)]
pub struct NewSessionRow<'a> {
    pub session_id: &'a str,
    pub experiment_group: &'a str,
    pub state: &'a Value,
}

fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict | PersistenceError::TransientIo(_) => true,
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected") || m.contains("connection closed") || m.contains("timeout")
        }
        _ => false,
    }
}

/// Hasta 3 reintentos con backoff de 15ms, 30ms, 45ms.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

fn decode_state(raw: Value) -> Result<FlowState, PersistenceError> {
    let dto: FlowStateDto = serde_json::from_value(raw)?;
    Ok(FlowState::try_from(dto)?)
}

fn encode_state(state: &FlowState) -> Result<Value, PersistenceError> {
    Ok(serde_json::to_value(state.to_dto())?)
}

async fn run_blocking<T, F>(work: F) -> Result<T, GatewayError>
    where F: FnOnce() -> Result<T, PersistenceError> + Send + 'static,
          T: Send + 'static
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(GatewayError::from),
        Err(join) => Err(GatewayError::Transport(format!("blocking task failed: {join}"))),
    }
}

pub struct PgStateGateway<P: ConnectionProvider> {
    provider: Arc<P>,
    registry: Arc<TopologyRegistry>,
    assignment: GroupAssignment,
}

impl<P: ConnectionProvider> PgStateGateway<P> {
    pub fn new(provider: P) -> Self {
        Self { provider: Arc::new(provider),
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
}

fn load_state(conn: &mut PgConnection, session_id: &str) -> Result<Option<FlowState>, PersistenceError> {
    let row: Option<SessionRow> = flow_sessions::table.find(session_id).first(conn).optional()?;
    row.map(|r| decode_state(r.state)).transpose()
}

#[async_trait]
impl<P: ConnectionProvider> StateGateway for PgStateGateway<P> {
    async fn fetch(&self, session_id: &str) -> Result<Option<FlowState>, GatewayError> {
        let provider = self.provider.clone();
        let id = session_id.to_string();
        run_blocking(move || {
            with_retry(|| {
                let mut conn = provider.connection()?;
                load_state(&mut conn, &id)
            })
        }).await
    }

    async fn initialize(&self, session_id: &str) -> Result<FlowState, GatewayError> {
        let provider = self.provider.clone();
        let id = session_id.to_string();
        let group = self.assignment.assign(session_id, &self.registry);
        run_blocking(move || {
            let fresh = FlowState::initial(id.as_str(), group, Utc::now());
            let payload = encode_state(&fresh)?;
            with_retry(|| {
                let mut conn = provider.connection()?;
                let inserted = diesel::insert_into(flow_sessions::table).values(NewSessionRow { session_id: &id,
                                                                                                experiment_group: group.as_str(),
                                                                                                state: &payload })
                                                                        .on_conflict_do_nothing()
                                                                        .execute(&mut conn)?;
                debug!("pg:initialize session={id} group={group} inserted={inserted}");
                load_state(&mut conn, &id)?.ok_or_else(|| PersistenceError::NotFound(id.clone()))
            })
        }).await
    }

    async fn update(&self, session_id: &str, request: UpdateRequest) -> Result<FlowState, GatewayError> {
        let provider = self.provider.clone();
        let registry = self.registry.clone();
        let id = session_id.to_string();
        run_blocking(move || {
            with_retry(|| {
                let mut conn = provider.connection()?;
                conn.build_transaction().read_write().run(|tx| {
                    let row: Option<SessionRow> = flow_sessions::table.find(id.as_str()).for_update().first(tx).optional()?;
                    let row = row.ok_or_else(|| PersistenceError::NotFound(id.clone()))?;
                    let current = decode_state(row.state)?;
                    let next = apply_update(&current, &request, &registry, Utc::now())?;
                    let payload = encode_state(&next)?;
                    diesel::update(flow_sessions::table.find(id.as_str()))
                        .set((flow_sessions::state.eq(&payload), flow_sessions::updated_at.eq(diesel::dsl::now)))
                        .execute(tx)?;
                    debug!("pg:update session={id} phase={} records={}", request.target, next.phase_history.len());
                    Ok::<FlowState, PersistenceError>(next)
                })
            })
        }).await
    }
}

/// Construye un pool Postgres y corre las migraciones pendientes.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let max = max_size.max(1);
    let min = min_size.max(1).min(max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(min))
                                    .max_size(max)
                                    .build(manager)
                               .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                      .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_infrastructure_errors_are_retried() {
        assert!(is_retryable(&PersistenceError::SerializationConflict));
        assert!(is_retryable(&PersistenceError::Unknown("ERROR: deadlock detected".into())));
        assert!(!is_retryable(&PersistenceError::Rejected("target".into())));
        assert!(!is_retryable(&PersistenceError::NotFound("s".into())));
    }

    #[test]
    fn retry_gives_up_after_three_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::TransientIo("down".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 4);
    }

    #[test]
    fn decode_rejects_unknown_group() {
        let raw = serde_json::json!({
            "sessionId": "s",
            "experimentGroup": "mystery",
            "phaseHistory": [{ "phase": "INITIAL", "timestamp": "2026-01-01T00:00:00Z" }]
        });
        assert_eq!(decode_state(raw).unwrap_err(),
                   PersistenceError::UnknownExperimentGroup("mystery".into()));
    }
}
