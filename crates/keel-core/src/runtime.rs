//! ---
//! keel_section: "01-core-functionality"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Runtime assembly and lifecycle management."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use keel_api::{spawn_api_server, ApiServer, ApiState};
use keel_common::config::AppConfig;
use keel_common::version::VersionInfo;
use keel_persistence::PersistenceContext;
use tracing::{info, warn};

/// Primary runtime entrypoint.
///
/// Wires the persistence context and the embedded HTTP server from a loaded
/// configuration. Call sites needing query helpers construct a
/// [`keel_persistence::QueryFactory`] from the handle's context; nothing is
/// registered process-wide.
#[derive(Debug)]
pub struct Runtime {
    config: Arc<AppConfig>,
    version: VersionInfo,
}

impl Runtime {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            version: VersionInfo::current(),
        }
    }

    /// Start the runtime and return a handle for lifecycle control.
    pub async fn start(self) -> Result<RuntimeHandle> {
        let persistence = PersistenceContext::connect(&self.config.database).await?;

        let mut api_server: Option<ApiServer> = None;
        if self.config.server.enabled {
            let state = Arc::new(ApiState::new(
                (*self.config).clone(),
                self.version.clone(),
                persistence.clone(),
            ));
            match spawn_api_server(state, self.config.server.listen) {
                Ok(server) => {
                    info!(address = %server.addr(), "api server listening");
                    api_server = Some(server);
                }
                Err(err) => {
                    warn!(error = %err, "failed to start api server");
                }
            }
        } else {
            info!("api server disabled by configuration");
        }

        info!(version = %self.version.cli_string(), "runtime started");

        Ok(RuntimeHandle {
            config: self.config,
            persistence,
            api_server,
        })
    }
}

/// Handle returned from runtime startup, used by the CLI for shutdown.
#[derive(Debug)]
pub struct RuntimeHandle {
    config: Arc<AppConfig>,
    persistence: PersistenceContext,
    api_server: Option<ApiServer>,
}

impl RuntimeHandle {
    /// Effective configuration the runtime was assembled from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The managed persistence context.
    pub fn persistence(&self) -> &PersistenceContext {
        &self.persistence
    }

    /// Address of the embedded HTTP server, when enabled and bound.
    pub fn api_addr(&self) -> Option<SocketAddr> {
        self.api_server.as_ref().map(ApiServer::addr)
    }

    /// Tear the runtime down: the HTTP server first, then the pool.
    pub async fn shutdown(self) -> Result<()> {
        if let Some(server) = self.api_server {
            server.shutdown().await?;
        }
        self.persistence.close().await;
        info!("runtime stopped");
        Ok(())
    }
}
