//! # Hestia - synchronization client for remote thermostat services
//!
//! A Rust client for a remote thermostat-control service: view live
//! temperatures, enable/disable heating programs, edit time-of-day periods,
//! and trigger temporary overrides, with the synchronization handled by a
//! single asynchronous engine.
//!
//! ## Features
//!
//! - **Polling loop**: periodic refresh with explicit reset on interaction
//! - **Debounced readings**: per-device temperature cache behind a global
//!   refresh window
//! - **Server-authoritative edits**: every mutation installs the canonical
//!   snapshot from the response
//! - **Session management**: persisted bearer credential with coarse
//!   invalidation on any authenticated failure
//! - **Override semantics**: the advance control is non-actionable while an
//!   override is pending
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `api`: HTTP contract of the thermostat service
//! - `session`: Session lifecycle and invalidation policy
//! - `persistence`: Durable session storage
//! - `cache`: Debounced temperature readings
//! - `roster`: Sorted device collection and selection
//! - `schedule`: Program toggling, period editing, overrides
//! - `poller`: Polling tick source
//! - `engine`: Orchestration and the UI boundary

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod poller;
pub mod roster;
pub mod schedule;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use engine::{DisplayState, EngineCommand, SyncEngine};
pub use error::{HestiaError, Result};
