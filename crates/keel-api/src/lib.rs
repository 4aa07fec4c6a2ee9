//! ---
//! keel_section: "05-http-surface"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Embedded HTTP surface for external integrations."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use keel_common::config::AppConfig;
use keel_common::version::VersionInfo;
use keel_persistence::PersistenceContext;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared API state exposed to handlers.
pub struct ApiState {
    config: RwLock<AppConfig>,
    version: VersionInfo,
    start: Instant,
    started_at: DateTime<Utc>,
    persistence: PersistenceContext,
}

impl ApiState {
    pub fn new(config: AppConfig, version: VersionInfo, persistence: PersistenceContext) -> Self {
        Self {
            config: RwLock::new(config),
            version,
            start: Instant::now(),
            started_at: Utc::now(),
            persistence,
        }
    }

    async fn status(&self) -> StatusResponse {
        StatusResponse {
            version: self.version.cli_string(),
            profile: self.version.profile.clone(),
            uptime_seconds: self.start.elapsed().as_secs(),
            started_at: self.started_at,
            database_ok: self.persistence.ping().await.is_ok(),
        }
    }

    fn config_snapshot(&self) -> AppConfig {
        self.config.read().clone()
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Handle to the running API server.
#[derive(Debug)]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    /// The effective listen address (OS-assigned when bound to port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/status", get(get_status))
        .route("/api/config", get(get_config))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Spawn the REST API on the given address.
pub fn spawn_api_server(state: Arc<ApiState>, addr: SocketAddr) -> Result<ApiServer> {
    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind API listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure API listener as non-blocking")?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve API listener address")?;
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;

    let router = router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %local_addr, "api server listening");
        if let Err(err) = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(address = %local_addr, error = %err, "api server exited with error");
            return Err(err.into());
        }
        Ok(())
    });

    Ok(ApiServer {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    version: String,
    profile: String,
    uptime_seconds: u64,
    started_at: DateTime<Utc>,
    database_ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

async fn get_health(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    state.persistence.ping().await.map_err(|err| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("persistence context unreachable: {err}"),
        )
    })?;
    Ok(Json(HealthResponse { status: "ok" }))
}

async fn get_status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(state.status().await)
}

async fn get_config(State(state): State<Arc<ApiState>>) -> Json<AppConfig> {
    Json(state.config_snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_common::config::DatabaseConfig;
    use std::time::Duration;

    async fn in_memory_state() -> Arc<ApiState> {
        let database = DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        };
        let persistence = PersistenceContext::connect(&database).await.unwrap();
        let config = AppConfig {
            database,
            ..AppConfig::default()
        };
        Arc::new(ApiState::new(config, VersionInfo::current(), persistence))
    }

    #[tokio::test]
    async fn health_reports_ok_while_context_is_up() {
        let state = in_memory_state().await;
        let response = get_health(State(state)).await.unwrap();
        assert_eq!(response.0.status, "ok");
    }

    #[tokio::test]
    async fn health_degrades_when_context_closes() {
        let state = in_memory_state().await;
        state.persistence.close().await;
        let err = get_health(State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn status_reflects_version_and_database() {
        let state = in_memory_state().await;
        let response = get_status(State(state.clone())).await;
        assert_eq!(response.0.version, VersionInfo::current().cli_string());
        assert!(response.0.database_ok);
    }

    #[tokio::test]
    async fn config_snapshot_is_served() {
        let state = in_memory_state().await;
        let response = get_config(State(state)).await;
        assert_eq!(response.0.database.url, "sqlite::memory:");
    }

    #[tokio::test]
    async fn spawn_assigns_port_and_shuts_down() {
        let state = in_memory_state().await;
        let server = spawn_api_server(state, "127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(server.addr().port(), 0);
        server.shutdown().await.unwrap();
    }
}
