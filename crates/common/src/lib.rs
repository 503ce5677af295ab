//! Viewfinder Common Utilities
//!
//! Shared infrastructure for all Viewfinder crates:
//! - Error types and result aliases
//! - Session clock, injectable delays, and retry timing
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
