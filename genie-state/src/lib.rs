//! Genie Home State Management
//!
//! Client-side state for a genie-home dashboard: the device table, the
//! current theme, the mood selection and the chat transcript.
//!
//! # Features
//!
//! - **Single writer**: [`DeviceSyncEngine`] is the only way into the device
//!   table; it validates whole inputs before applying any of them
//! - **Identity-based change detection**: replaced devices get a new `Arc`,
//!   untouched devices keep theirs
//! - **Ordered responses**: replies to older requests never overwrite newer ones
//! - **Explicit theme store**: one setter, injected [`StyleTarget`]s
//!
//! # Architecture
//!
//! ```text
//! backend reply ──> DeviceSyncEngine ──> RevisionedTable<DeviceId, Device>
//!                                            │
//!                                            └──> ChangeIterator (watched ids)
//!
//! mood theme ─────> ThemeStore ──> StyleTarget (e.g. RootStyle)
//!
//! chat ───────────> Transcript (append-only)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use genie_api::{Device, DeviceMap, Door};
//! use genie_state::DeviceSyncEngine;
//!
//! let engine = DeviceSyncEngine::new();
//! let mut table = DeviceMap::new();
//! table.insert("door_front".into(), Device::Door(Door {
//!     name: "Front Door".to_string(),
//!     locked: true,
//! }));
//! engine.apply_scene(table).unwrap();
//!
//! assert!(engine.get(&"door_front".into()).is_some());
//! ```

pub mod error;
pub mod logging;
pub mod mood;
pub mod sync;
pub mod theme;
pub mod transcript;

pub use error::{Result, StateError};
pub use mood::MoodState;
pub use sync::{DeviceSyncEngine, SyncReport, TableSnapshot};
pub use theme::{RootStyle, StyleTarget, ThemeStore};
pub use transcript::{ChatMessage, Sender, Transcript};

// Re-export the table primitives consumers key on
pub use device_table::{ChangeEvent, ChangeIterator, Revision, Sequence};
