//! Lifecycle extension system
//!
//! - [`hooks`]: the base [`Extension`] trait and one capability trait per event
//! - [`kind`]: the closed [`HookKind`] enumeration
//! - [`registry`]: registration, dispatch and introspection

pub mod hooks;
pub mod kind;
pub mod registry;

pub use hooks::*;
pub use kind::HookKind;
pub use registry::{capabilities, Registry, RegistryBuilder};
