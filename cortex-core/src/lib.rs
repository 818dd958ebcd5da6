//! # Cortex Core - lifecycle hooks for agent orchestration
//!
//! Core types, traits, and abstractions for the Cortex framework.
//!
//! This crate provides:
//! - Extension system (`plugin`) - capability traits and the hook registry
//! - Identifiers (`id`) - prefix-qualified, time-ordered ids
//! - Hook context (`context`) - cancellation and tenant scope
//! - Engine (`engine`) - registry ownership and graceful shutdown
//! - Configuration (`config`) - YAML-backed engine settings
//! - Logging (`logging`) - tracing subscriber bootstrap

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod id;
pub mod logging;
pub mod plugin;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::config::CortexConfig;
    pub use crate::context::HookContext;
    pub use crate::engine::{Engine, EngineBuilder};
    pub use crate::error::{DynError, Error, Result};
    pub use crate::id::{AgentId, CheckpointId, OrchestrationId, RunId};
    pub use crate::plugin::*;
}
