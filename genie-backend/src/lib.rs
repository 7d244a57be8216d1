//! Simulated genie-home backend
//!
//! An in-memory stand-in for the real home server. It keeps the
//! authoritative device table, applies scenes and moods, and answers chat
//! messages with a keyword parser. User actions are logged so usage
//! insights can be served. Routes are served with `warp`.
//!
//! ```text
//! HTTP ──> routes ──> BackendState ─┬─> DeviceSimulator (devices, scenes)
//!                                   ├─> MoodEngine (themes)
//!                                   ├─> ActionLog (usage insights)
//!                                   └─> commands (chat keywords)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use genie_backend::{BackendConfig, BackendServer};
//!
//! # async fn run() -> Result<(), genie_backend::ServerError> {
//! let server = BackendServer::start(BackendConfig::ephemeral()).await?;
//! println!("API at {}", server.api_url());
//! server.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod automation;
pub mod commands;
pub mod error;
pub mod moods;
pub mod routes;
pub mod scenes;
pub mod server;
pub mod simulator;
pub mod state;

pub use automation::ActionLog;
pub use error::{BackendError, ServerError};
pub use moods::{MoodEngine, DEFAULT_MOOD};
pub use routes::{routes, SharedState};
pub use server::{BackendConfig, BackendServer, BackgroundServer};
pub use simulator::{default_devices, DeviceSimulator};
pub use state::BackendState;
