//! Server lifecycle
//!
//! [`BackendServer`] runs inside an existing tokio runtime. [`BackgroundServer`]
//! owns its runtime so blocking callers (the SDK's tests, the demo REPL) can
//! start a backend without being async themselves.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::error::ServerError;
use crate::routes::{routes, SharedState};
use crate::state::BackendState;

/// Where the backend listens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendConfig {
    pub host: IpAddr,
    /// `0` picks a free port
    pub port: u16,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
        }
    }
}

impl BackendConfig {
    /// Loopback on a port chosen by the OS
    pub fn ephemeral() -> Self {
        Self {
            port: 0,
            ..Self::default()
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// A running backend
pub struct BackendServer {
    addr: SocketAddr,
    state: SharedState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl BackendServer {
    /// Start a backend with the default devices and mood
    pub async fn start(config: BackendConfig) -> Result<Self, ServerError> {
        Self::start_with_state(config, BackendState::new()).await
    }

    pub async fn start_with_state(
        config: BackendConfig,
        state: BackendState,
    ) -> Result<Self, ServerError> {
        let state = Arc::new(Mutex::new(state));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let (addr, server) = warp::serve(routes(state.clone()))
            .try_bind_with_graceful_shutdown(config.socket_addr(), async move {
                let _ = shutdown_rx.await;
            })
            .map_err(|e| ServerError::Bind {
                addr: config.socket_addr().to_string(),
                reason: e.to_string(),
            })?;

        let handle = tokio::spawn(server);
        tracing::info!("Backend listening on {}", addr);

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://host:port`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Root of the JSON API, suitable for `GenieClient::new`
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url())
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Backend task ended abnormally: {}", e);
            }
        }
        tracing::info!("Backend on {} stopped", self.addr);
    }
}

impl std::fmt::Debug for BackendServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendServer")
            .field("addr", &self.addr)
            .field("running", &self.shutdown_tx.is_some())
            .finish()
    }
}

/// A backend on its own runtime, stopped when dropped
pub struct BackgroundServer {
    runtime: tokio::runtime::Runtime,
    server: Option<BackendServer>,
}

impl BackgroundServer {
    pub fn start(config: BackendConfig) -> Result<Self, ServerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("genie-backend")
            .enable_all()
            .build()?;
        let server = runtime.block_on(BackendServer::start(config))?;
        Ok(Self {
            runtime,
            server: Some(server),
        })
    }

    /// Loopback on a free port
    pub fn ephemeral() -> Result<Self, ServerError> {
        Self::start(BackendConfig::ephemeral())
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(BackendServer::addr)
    }

    pub fn base_url(&self) -> String {
        self.server
            .as_ref()
            .map(BackendServer::base_url)
            .unwrap_or_default()
    }

    pub fn api_url(&self) -> String {
        self.server
            .as_ref()
            .map(BackendServer::api_url)
            .unwrap_or_default()
    }

    /// Run `f` against the backend state, e.g. to inspect or seed it
    pub fn with_state<T>(&self, f: impl FnOnce(&mut BackendState) -> T) -> Option<T> {
        let server = self.server.as_ref()?;
        let state = server.state().clone();
        Some(self.runtime.block_on(async move {
            let mut guard = state.lock().await;
            f(&mut *guard)
        }))
    }

    /// Stop the backend now; later requests fail to connect
    pub fn stop(&mut self) {
        if let Some(server) = self.server.take() {
            self.runtime.block_on(server.shutdown());
        }
    }
}

impl Drop for BackgroundServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for BackgroundServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundServer")
            .field("server", &self.server)
            .finish()
    }
}
