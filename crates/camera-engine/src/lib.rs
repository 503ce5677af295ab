//! Viewfinder Camera Engine
//!
//! Orchestrates camera discovery, selection, and per-camera preview
//! sessions. Discovery authorizes, enumerates, health-checks, and classifies
//! devices before publishing an available list; the viewer registry then
//! runs one capture session per selected camera with a bounded-retry start
//! sequence and a small rolling log per viewer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │             DiscoveryCoordinator                  │
//! │   authorize → enumerate → health-check/classify   │
//! │                     │                             │
//! │                     ▼                             │
//! │   available list ──► SelectionSet (toggle)        │
//! └─────────────────────┬────────────────────────────┘
//!                       ▼
//! ┌──────────────────────────────────────────────────┐
//! │                ViewerRegistry                     │
//! │  ┌─────────────┐  ┌─────────────┐                │
//! │  │ Viewer      │  │ Viewer      │   one per      │
//! │  │ session+log │  │ session+log │   selection    │
//! │  └─────────────┘  └─────────────┘                │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod classify;
pub mod discovery;
pub mod health;
pub mod log;
pub mod selection;
pub mod session;
pub mod viewer;

pub use classify::{advisory_warning, classify, DeviceCategory};
pub use discovery::{DeviceSummary, DiscoveredCamera, DiscoveryCoordinator, DiscoveryState};
pub use health::{check_health, HealthVerdict};
pub use log::{LogBuffer, DEFAULT_LOG_LINES};
pub use selection::{SelectionChange, SelectionSet};
pub use session::{CameraSession, CameraSessionState};
pub use viewer::{Viewer, ViewerRegistry};
