//! Lifecycle counters
//!
//! [`MetricsExtension`] increments one counter per observed event. Counter
//! names match the audit action names, optionally under a prefix.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cortex_core::prelude::*;
use cortex_macros::extension;
use dashmap::DashMap;
use serde_json::Value;

use crate::actions;

/// Monotonic counter
pub trait Counter: Send + Sync {
    /// Add one
    fn inc(&self) {
        self.add(1);
    }

    /// Add `n`
    fn add(&self, n: u64);

    /// Current value
    fn get(&self) -> u64;
}

/// Source of named counters
pub trait MetricFactory: Send + Sync {
    /// Counter registered under `name`, created on first use
    fn counter(&self, name: &str) -> Arc<dyn Counter>;
}

/// Lock-free counter backed by an atomic
#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicU64);

impl Counter for AtomicCounter {
    fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Process-local metric registry
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: DashMap<String, Arc<AtomicCounter>>,
}

impl InMemoryMetrics {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the counter named `name`, zero if it does not exist
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).map(|c| c.get()).unwrap_or(0)
    }

    /// All counters, sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get()))
            .collect()
    }
}

impl MetricFactory for InMemoryMetrics {
    fn counter(&self, name: &str) -> Arc<dyn Counter> {
        self.counters.entry(name.to_string()).or_default().clone()
    }
}

/// Counts lifecycle events
#[extension(
    name = "observability-metrics",
    hooks(
        RunStarted,
        RunCompleted,
        RunFailed,
        ToolCalled,
        ToolCompleted,
        ToolFailed,
        PersonaResolved,
        BehaviorTriggered,
        CognitivePhaseChanged,
        CheckpointCreated,
        CheckpointResolved,
    )
)]
pub struct MetricsExtension {
    run_started: Arc<dyn Counter>,
    run_completed: Arc<dyn Counter>,
    run_failed: Arc<dyn Counter>,
    tool_called: Arc<dyn Counter>,
    tool_completed: Arc<dyn Counter>,
    tool_failed: Arc<dyn Counter>,
    persona_resolved: Arc<dyn Counter>,
    behavior_triggered: Arc<dyn Counter>,
    cognitive_phase_changed: Arc<dyn Counter>,
    checkpoint_created: Arc<dyn Counter>,
    checkpoint_resolved: Arc<dyn Counter>,
}

impl MetricsExtension {
    /// Create counters through `factory`
    pub fn new(factory: &dyn MetricFactory) -> Self {
        Self::with_prefix(factory, None)
    }

    /// Create counters through `factory`, named `<prefix>.<action>` when a
    /// prefix is given
    pub fn with_prefix(factory: &dyn MetricFactory, prefix: Option<&str>) -> Self {
        let counter = |action: &str| match prefix {
            Some(p) if !p.is_empty() => factory.counter(&format!("{p}.{action}")),
            _ => factory.counter(action),
        };

        Self {
            run_started: counter(actions::RUN_STARTED),
            run_completed: counter(actions::RUN_COMPLETED),
            run_failed: counter(actions::RUN_FAILED),
            tool_called: counter(actions::TOOL_CALLED),
            tool_completed: counter(actions::TOOL_COMPLETED),
            tool_failed: counter(actions::TOOL_FAILED),
            persona_resolved: counter(actions::PERSONA_RESOLVED),
            behavior_triggered: counter(actions::BEHAVIOR_TRIGGERED),
            cognitive_phase_changed: counter(actions::COGNITIVE_PHASE_CHANGED),
            checkpoint_created: counter(actions::CHECKPOINT_CREATED),
            checkpoint_resolved: counter(actions::CHECKPOINT_RESOLVED),
        }
    }
}

#[async_trait]
impl RunStarted for MetricsExtension {
    async fn on_run_started(
        &self,
        _ctx: &HookContext,
        _agent_id: AgentId,
        _run_id: RunId,
        _input: &str,
    ) -> Result<()> {
        self.run_started.inc();
        Ok(())
    }
}

#[async_trait]
impl RunCompleted for MetricsExtension {
    async fn on_run_completed(
        &self,
        _ctx: &HookContext,
        _agent_id: AgentId,
        _run_id: RunId,
        _output: &str,
        _elapsed: Duration,
    ) -> Result<()> {
        self.run_completed.inc();
        Ok(())
    }
}

#[async_trait]
impl RunFailed for MetricsExtension {
    async fn on_run_failed(
        &self,
        _ctx: &HookContext,
        _agent_id: AgentId,
        _run_id: RunId,
        _error: &DynError,
    ) -> Result<()> {
        self.run_failed.inc();
        Ok(())
    }
}

#[async_trait]
impl ToolCalled for MetricsExtension {
    async fn on_tool_called(
        &self,
        _ctx: &HookContext,
        _run_id: RunId,
        _tool_name: &str,
        _arguments: &Value,
    ) -> Result<()> {
        self.tool_called.inc();
        Ok(())
    }
}

#[async_trait]
impl ToolCompleted for MetricsExtension {
    async fn on_tool_completed(
        &self,
        _ctx: &HookContext,
        _run_id: RunId,
        _tool_name: &str,
        _result: &str,
        _elapsed: Duration,
    ) -> Result<()> {
        self.tool_completed.inc();
        Ok(())
    }
}

#[async_trait]
impl ToolFailed for MetricsExtension {
    async fn on_tool_failed(
        &self,
        _ctx: &HookContext,
        _run_id: RunId,
        _tool_name: &str,
        _error: &DynError,
    ) -> Result<()> {
        self.tool_failed.inc();
        Ok(())
    }
}

#[async_trait]
impl PersonaResolved for MetricsExtension {
    async fn on_persona_resolved(
        &self,
        _ctx: &HookContext,
        _agent_id: AgentId,
        _persona_name: &str,
    ) -> Result<()> {
        self.persona_resolved.inc();
        Ok(())
    }
}

#[async_trait]
impl BehaviorTriggered for MetricsExtension {
    async fn on_behavior_triggered(
        &self,
        _ctx: &HookContext,
        _run_id: RunId,
        _behavior_name: &str,
    ) -> Result<()> {
        self.behavior_triggered.inc();
        Ok(())
    }
}

#[async_trait]
impl CognitivePhaseChanged for MetricsExtension {
    async fn on_cognitive_phase_changed(
        &self,
        _ctx: &HookContext,
        _run_id: RunId,
        _from_phase: &str,
        _to_phase: &str,
    ) -> Result<()> {
        self.cognitive_phase_changed.inc();
        Ok(())
    }
}

#[async_trait]
impl CheckpointCreated for MetricsExtension {
    async fn on_checkpoint_created(
        &self,
        _ctx: &HookContext,
        _checkpoint_id: CheckpointId,
        _run_id: RunId,
        _reason: &str,
    ) -> Result<()> {
        self.checkpoint_created.inc();
        Ok(())
    }
}

#[async_trait]
impl CheckpointResolved for MetricsExtension {
    async fn on_checkpoint_resolved(
        &self,
        _ctx: &HookContext,
        _checkpoint_id: CheckpointId,
        _decision: &str,
    ) -> Result<()> {
        self.checkpoint_resolved.inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declares_audit_superset() {
        let metrics = InMemoryMetrics::new();
        let ext: Arc<dyn Extension> = Arc::new(MetricsExtension::new(&metrics));
        assert_eq!(ext.name(), "observability-metrics");

        let caps = capabilities(&ext);
        assert_eq!(caps.len(), 11);
        assert!(caps.contains(&HookKind::CognitivePhaseChanged));
        assert!(!caps.contains(&HookKind::AgentHandoff));
    }

    #[test]
    fn test_counters_registered_up_front() {
        let metrics = InMemoryMetrics::new();
        let _ext = MetricsExtension::new(&metrics);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.len(), 11);
        assert!(snapshot.values().all(|v| *v == 0));
        assert!(snapshot.contains_key("cortex.cognitive.phase_changed"));
    }

    #[tokio::test]
    async fn test_prefixed_counters() {
        let metrics = InMemoryMetrics::new();
        let ext = MetricsExtension::with_prefix(&metrics, Some("app"));

        ext.on_tool_called(&HookContext::new(), RunId::new(), "calc", &Value::Null)
            .await
            .unwrap();
        ext.on_tool_called(&HookContext::new(), RunId::new(), "calc", &Value::Null)
            .await
            .unwrap();

        assert_eq!(metrics.get("app.cortex.tool.called"), 2);
        assert_eq!(metrics.get("cortex.tool.called"), 0);
    }

    #[test]
    fn test_factory_returns_shared_counter() {
        let metrics = InMemoryMetrics::new();
        let a = metrics.counter("x");
        let b = metrics.counter("x");
        a.inc();
        b.add(2);
        assert_eq!(metrics.get("x"), 3);
    }
}
