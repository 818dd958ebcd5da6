//! Build the enabled built-in extensions from configuration
//!
//! Order is fixed: audit, metrics, log. Extensions enabled in configuration
//! but compiled out by cargo features are skipped with a warning.

use std::sync::Arc;

use cortex_core::config::ExtensionsConfig;
use cortex_core::plugin::Extension;
use tracing::debug;

#[cfg(feature = "audit")]
use crate::audit::{AuditHook, LogRecorder, Recorder};
#[cfg(feature = "log")]
use crate::log::LogExtension;
#[cfg(feature = "metrics")]
use crate::metrics::{InMemoryMetrics, MetricFactory, MetricsExtension};

/// Assembles built-in extensions from an [`ExtensionsConfig`]
pub struct Builtins<'a> {
    config: &'a ExtensionsConfig,
    #[cfg(feature = "audit")]
    recorder: Option<Arc<dyn Recorder>>,
    #[cfg(feature = "metrics")]
    metrics: Option<Arc<dyn MetricFactory>>,
}

impl<'a> Builtins<'a> {
    /// Start from configuration alone
    pub fn new(config: &'a ExtensionsConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "audit")]
            recorder: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Audit backend; defaults to [`LogRecorder`]
    #[cfg(feature = "audit")]
    pub fn recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Counter source; defaults to a fresh [`InMemoryMetrics`]
    #[cfg(feature = "metrics")]
    pub fn metrics(mut self, factory: Arc<dyn MetricFactory>) -> Self {
        self.metrics = Some(factory);
        self
    }

    /// The enabled extensions, in registration order
    pub fn build(self) -> Vec<Arc<dyn Extension>> {
        let mut out: Vec<Arc<dyn Extension>> = Vec::new();

        if self.config.audit.enabled {
            #[cfg(feature = "audit")]
            {
                let recorder = self
                    .recorder
                    .unwrap_or_else(|| Arc::new(LogRecorder) as Arc<dyn Recorder>);
                let mut hook = AuditHook::new(recorder);
                if !self.config.audit.actions.is_empty() {
                    hook = hook.with_actions(self.config.audit.actions.iter().cloned());
                }
                out.push(Arc::new(hook));
            }
            #[cfg(not(feature = "audit"))]
            tracing::warn!(extension = "audit-hook", "enabled in config but not compiled in");
        }

        if self.config.metrics.enabled {
            #[cfg(feature = "metrics")]
            {
                let factory = self
                    .metrics
                    .unwrap_or_else(|| Arc::new(InMemoryMetrics::new()) as Arc<dyn MetricFactory>);
                let prefix = self.config.metrics.prefix.as_deref();
                out.push(Arc::new(MetricsExtension::with_prefix(
                    factory.as_ref(),
                    prefix,
                )));
            }
            #[cfg(not(feature = "metrics"))]
            tracing::warn!(
                extension = "observability-metrics",
                "enabled in config but not compiled in"
            );
        }

        if self.config.log.enabled {
            #[cfg(feature = "log")]
            out.push(Arc::new(LogExtension::new()));
            #[cfg(not(feature = "log"))]
            tracing::warn!(extension = "log", "enabled in config but not compiled in");
        }

        debug!(count = out.len(), "built-in extensions assembled");
        out
    }
}

/// Enabled built-ins with default backends
pub fn from_config(config: &ExtensionsConfig) -> Vec<Arc<dyn Extension>> {
    Builtins::new(config).build()
}

#[cfg(all(test, feature = "full"))]
mod tests {
    use super::*;
    use crate::audit::MemoryRecorder;
    use cortex_core::config::{AuditConfig, LogExtensionConfig, MetricsConfig};

    fn all_enabled() -> ExtensionsConfig {
        ExtensionsConfig {
            audit: AuditConfig {
                enabled: true,
                actions: vec![],
            },
            metrics: MetricsConfig {
                enabled: true,
                prefix: None,
            },
            log: LogExtensionConfig { enabled: true },
        }
    }

    #[test]
    fn test_nothing_enabled_by_default() {
        assert!(from_config(&ExtensionsConfig::default()).is_empty());
    }

    #[test]
    fn test_fixed_order() {
        let names: Vec<String> = from_config(&all_enabled())
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["audit-hook", "observability-metrics", "log"]);
    }

    #[test]
    fn test_custom_backends() {
        let recorder = Arc::new(MemoryRecorder::new());
        let metrics = Arc::new(InMemoryMetrics::new());
        let mut config = all_enabled();
        config.log.enabled = false;
        config.metrics.prefix = Some("svc".to_string());

        let exts = Builtins::new(&config)
            .recorder(recorder)
            .metrics(metrics.clone())
            .build();

        assert_eq!(exts.len(), 2);
        assert!(metrics.snapshot().contains_key("svc.cortex.agent.run.started"));
    }
}
