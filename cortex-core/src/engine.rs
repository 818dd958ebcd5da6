//! Engine lifecycle
//!
//! The engine owns the frozen extension [`Registry`] and the configuration it
//! was built with. Orchestration code fetches the registry through
//! [`Engine::extensions`] and emits lifecycle events on it directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::CortexConfig;
use crate::context::HookContext;
use crate::error::Result;
use crate::plugin::{capabilities, Extension, Registry};

/// Central coordinator holding the extension registry
pub struct Engine {
    config: CortexConfig,
    extensions: Arc<Registry>,
    stopped: AtomicBool,
}

impl Engine {
    /// Start building an engine
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Mark the engine ready for use
    pub async fn start(&self, _ctx: &HookContext) -> Result<()> {
        info!(
            extensions = self.extensions.len(),
            run_concurrency = self.config.run_concurrency,
            "cortex engine started"
        );
        Ok(())
    }

    /// Broadcast `shutdown` to every subscribed extension.
    ///
    /// Only the first call emits. The broadcast is bounded by
    /// `shutdown_timeout_secs`; when the bound is hit the remaining handlers
    /// are dropped and `ctx` is cancelled.
    pub async fn stop(&self, ctx: &HookContext) -> Result<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            debug!("cortex engine already stopped");
            return Ok(());
        }

        let limit = Duration::from_secs(self.config.shutdown_timeout_secs);
        if tokio::time::timeout(limit, self.extensions.emit_shutdown(ctx))
            .await
            .is_err()
        {
            warn!(
                timeout_secs = self.config.shutdown_timeout_secs,
                "shutdown hooks did not finish in time"
            );
            ctx.cancel();
        }

        info!("cortex engine stopped");
        Ok(())
    }

    /// Whether [`stop`](Self::stop) has been called
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The extension registry
    pub fn extensions(&self) -> Arc<Registry> {
        Arc::clone(&self.extensions)
    }

    /// The engine configuration
    pub fn config(&self) -> &CortexConfig {
        &self.config
    }
}

/// Builder for [`Engine`]
#[derive(Default)]
pub struct EngineBuilder {
    config: CortexConfig,
    pending: Vec<Arc<dyn Extension>>,
}

impl EngineBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    pub fn config(mut self, config: CortexConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue an extension for registration
    pub fn extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.pending.push(extension);
        self
    }

    /// Queue several extensions, keeping their order
    pub fn extensions(mut self, extensions: impl IntoIterator<Item = Arc<dyn Extension>>) -> Self {
        self.pending.extend(extensions);
        self
    }

    /// Validate the configuration, register queued extensions and freeze
    /// the registry
    pub fn build(self) -> Result<Engine> {
        self.config.validate()?;

        let mut registry = Registry::builder();
        for ext in self.pending {
            debug!(
                extension = ext.name(),
                hooks = ?capabilities(&ext),
                "registering extension"
            );
            registry.register_arc(ext);
        }

        Ok(Engine {
            config: self.config,
            extensions: Arc::new(registry.build()),
            stopped: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{HookKind, Shutdown};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct ShutdownCounter {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl Shutdown for ShutdownCounter {
        async fn on_shutdown(&self, _ctx: &HookContext) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Extension for ShutdownCounter {
        fn name(&self) -> &str {
            "shutdown-counter"
        }

        fn as_shutdown(self: Arc<Self>) -> Option<Arc<dyn Shutdown>> {
            Some(self)
        }
    }

    fn counter(delay: Duration) -> Arc<ShutdownCounter> {
        Arc::new(ShutdownCounter {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    #[tokio::test]
    async fn test_build_registers_in_order() {
        let engine = Engine::builder()
            .extension(counter(Duration::ZERO))
            .extension(counter(Duration::ZERO))
            .build()
            .unwrap();

        let registry = engine.extensions();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.subscriber_count(HookKind::Shutdown), 2);
        assert_eq!(engine.config(), &CortexConfig::default());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = CortexConfig {
            run_concurrency: 0,
            ..CortexConfig::default()
        };
        assert!(Engine::builder().config(config).build().is_err());
    }

    #[tokio::test]
    async fn test_zero_shutdown_timeout_is_rejected_at_build() {
        let config = CortexConfig {
            shutdown_timeout_secs: 0,
            ..CortexConfig::default()
        };
        let err = Engine::builder()
            .config(config)
            .extension(counter(Duration::from_millis(5)))
            .build()
            .err()
            .unwrap();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_awaiting_shutdown_handler_completes_within_bound() {
        let ext = counter(Duration::from_millis(5));
        let engine = Engine::builder().extension(ext.clone()).build().unwrap();
        let ctx = HookContext::new();

        tokio_test::assert_ok!(engine.stop(&ctx).await);

        assert_eq!(ext.calls.load(Ordering::SeqCst), 1);
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_stop_emits_shutdown_once() {
        let ext = counter(Duration::ZERO);
        let engine = Engine::builder().extension(ext.clone()).build().unwrap();
        let ctx = HookContext::new();

        tokio_test::assert_ok!(engine.start(&ctx).await);
        tokio_test::assert_ok!(engine.stop(&ctx).await);
        tokio_test::assert_ok!(engine.stop(&ctx).await);

        assert!(engine.is_stopped());
        assert_eq!(ext.calls.load(Ordering::SeqCst), 1);
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_stop_times_out_and_cancels() {
        let ext = counter(Duration::from_secs(30));
        let config = CortexConfig {
            shutdown_timeout_secs: 1,
            ..CortexConfig::default()
        };
        let engine = Engine::builder()
            .config(config)
            .extension(ext.clone())
            .build()
            .unwrap();
        let ctx = HookContext::new();

        engine.stop(&ctx).await.unwrap();

        assert!(ctx.is_cancelled());
        assert_eq!(ext.calls.load(Ordering::SeqCst), 0);
    }
}
