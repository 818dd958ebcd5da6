//! Audit trail extension
//!
//! [`AuditHook`] turns ten lifecycle events into [`AuditEvent`]s and hands
//! them to a [`Recorder`]. Recorder failures are logged here and never
//! surface to the registry.
//!
//! ```rust
//! use std::sync::Arc;
//! use cortex_core::plugin::Registry;
//! use cortex_extensions::audit::{AuditHook, MemoryRecorder};
//!
//! let recorder = Arc::new(MemoryRecorder::new());
//! let hook = AuditHook::new(recorder.clone()).with_actions(["cortex.tool.failed"]);
//! let registry = Registry::builder().with_extension(Arc::new(hook)).build();
//! assert_eq!(registry.len(), 1);
//! ```

pub mod event;
pub mod recorder;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cortex_core::prelude::*;
use cortex_macros::extension;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::millis;

pub use event::{actions, categories, resources, AuditEvent, Outcome, Severity};
#[cfg(feature = "http")]
pub use recorder::{HttpConfig, HttpRecorder};
pub use recorder::{ChannelRecorder, LogRecorder, MemoryRecorder, Recorder, RecorderFn};

/// Bridges lifecycle events to an audit trail backend
#[extension(
    name = "audit-hook",
    hooks(
        RunStarted,
        RunCompleted,
        RunFailed,
        ToolCalled,
        ToolCompleted,
        ToolFailed,
        PersonaResolved,
        BehaviorTriggered,
        CheckpointCreated,
        CheckpointResolved,
    )
)]
pub struct AuditHook {
    recorder: Arc<dyn Recorder>,
    enabled: Option<HashSet<String>>,
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl AuditHook {
    /// Create a hook that records every audited action
    pub fn new(recorder: Arc<dyn Recorder>) -> Self {
        Self {
            recorder,
            enabled: None,
        }
    }

    /// Record only the listed actions. An empty list records nothing.
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Whether `action` passes the allow-list
    pub fn is_enabled(&self, action: &str) -> bool {
        self.enabled
            .as_ref()
            .map_or(true, |set| set.contains(action))
    }

    async fn record(&self, ctx: &HookContext, event: AuditEvent) -> Result<()> {
        if !self.is_enabled(&event.action) {
            return Ok(());
        }

        if let Err(e) = self.recorder.record(ctx, &event).await {
            warn!(
                action = %event.action,
                resource_id = %event.resource_id,
                error = %e,
                "audit_hook: failed to record audit event"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl RunStarted for AuditHook {
    async fn on_run_started(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        input: &str,
    ) -> Result<()> {
        let meta = object(json!({
            "agent_id": agent_id.to_string(),
            "input_length": input.len(),
        }));
        let event = AuditEvent::success(
            actions::RUN_STARTED,
            resources::RUN,
            categories::AGENT,
            run_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl RunCompleted for AuditHook {
    async fn on_run_completed(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        _output: &str,
        elapsed: Duration,
    ) -> Result<()> {
        let meta = object(json!({
            "agent_id": agent_id.to_string(),
            "elapsed_ms": millis(elapsed),
        }));
        let event = AuditEvent::success(
            actions::RUN_COMPLETED,
            resources::RUN,
            categories::AGENT,
            run_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl RunFailed for AuditHook {
    async fn on_run_failed(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        error: &DynError,
    ) -> Result<()> {
        let meta = object(json!({ "agent_id": agent_id.to_string() }));
        let event = AuditEvent::failure(
            actions::RUN_FAILED,
            resources::RUN,
            categories::AGENT,
            run_id.to_string(),
            meta,
            error,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl ToolCalled for AuditHook {
    async fn on_tool_called(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        _arguments: &Value,
    ) -> Result<()> {
        let meta = object(json!({ "tool_name": tool_name }));
        let event = AuditEvent::success(
            actions::TOOL_CALLED,
            resources::TOOL,
            categories::TOOL,
            run_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl ToolCompleted for AuditHook {
    async fn on_tool_completed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        _result: &str,
        elapsed: Duration,
    ) -> Result<()> {
        let meta = object(json!({
            "tool_name": tool_name,
            "elapsed_ms": millis(elapsed),
        }));
        let event = AuditEvent::success(
            actions::TOOL_COMPLETED,
            resources::TOOL,
            categories::TOOL,
            run_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl ToolFailed for AuditHook {
    async fn on_tool_failed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        error: &DynError,
    ) -> Result<()> {
        let meta = object(json!({ "tool_name": tool_name }));
        let event = AuditEvent::failure(
            actions::TOOL_FAILED,
            resources::TOOL,
            categories::TOOL,
            run_id.to_string(),
            meta,
            error,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl PersonaResolved for AuditHook {
    async fn on_persona_resolved(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        persona_name: &str,
    ) -> Result<()> {
        let meta = object(json!({ "persona_name": persona_name }));
        let event = AuditEvent::success(
            actions::PERSONA_RESOLVED,
            resources::PERSONA,
            categories::PERSONA,
            agent_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl BehaviorTriggered for AuditHook {
    async fn on_behavior_triggered(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        behavior_name: &str,
    ) -> Result<()> {
        // behaviors are grouped with personas
        let meta = object(json!({ "behavior_name": behavior_name }));
        let event = AuditEvent::success(
            actions::BEHAVIOR_TRIGGERED,
            resources::BEHAVIOR,
            categories::PERSONA,
            run_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl CheckpointCreated for AuditHook {
    async fn on_checkpoint_created(
        &self,
        ctx: &HookContext,
        checkpoint_id: CheckpointId,
        run_id: RunId,
        reason: &str,
    ) -> Result<()> {
        let meta = object(json!({
            "run_id": run_id.to_string(),
            "reason": reason,
        }));
        let event = AuditEvent::success(
            actions::CHECKPOINT_CREATED,
            resources::CHECKPOINT,
            categories::CHECKPOINT,
            checkpoint_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}

#[async_trait]
impl CheckpointResolved for AuditHook {
    async fn on_checkpoint_resolved(
        &self,
        ctx: &HookContext,
        checkpoint_id: CheckpointId,
        decision: &str,
    ) -> Result<()> {
        let meta = object(json!({ "decision": decision }));
        let event = AuditEvent::success(
            actions::CHECKPOINT_RESOLVED,
            resources::CHECKPOINT,
            categories::CHECKPOINT,
            checkpoint_id.to_string(),
            meta,
        );
        self.record(ctx, event).await
    }
}
