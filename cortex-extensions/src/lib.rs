//! # Cortex Extensions
//!
//! Built-in lifecycle extensions for the Cortex framework.
//!
//! - [`audit`] - audit trail with pluggable recorders
//! - [`metrics`] - per-event counters
//! - [`log`] - one log record per event
//! - [`factory`] - build the enabled set from configuration

#![warn(missing_docs)]

// Re-export core types for convenience
pub use cortex_core::error::{Error, Result};
pub use cortex_core::plugin::{Extension, Registry};

pub mod actions;
pub mod factory;

#[cfg(feature = "audit")]
pub mod audit;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "log")]
pub mod log;

pub use factory::{from_config, Builtins};

/// Whole milliseconds, saturating at `u64::MAX`
#[cfg(any(feature = "audit", feature = "log"))]
pub(crate) fn millis(elapsed: std::time::Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(all(test, any(feature = "audit", feature = "log")))]
mod tests {
    use super::millis;
    use std::time::Duration;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_micros(42_900)), 42);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
