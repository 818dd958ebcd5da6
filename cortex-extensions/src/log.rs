//! One `info` record per lifecycle event

use std::time::Duration;

use async_trait::async_trait;
use cortex_core::prelude::*;
use cortex_macros::extension;
use serde_json::Value;
use tracing::info;

use crate::millis;

/// Logs every lifecycle event on the `cortex::lifecycle` target
#[extension(
    name = "log",
    hooks(
        RunStarted,
        RunCompleted,
        RunFailed,
        StepStarted,
        StepCompleted,
        ToolCalled,
        ToolCompleted,
        ToolFailed,
        PersonaResolved,
        BehaviorTriggered,
        CognitivePhaseChanged,
        CheckpointCreated,
        CheckpointResolved,
        OrchestrationStarted,
        OrchestrationCompleted,
        AgentHandoff,
        Shutdown,
    )
)]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogExtension;

impl LogExtension {
    /// Create the extension
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RunStarted for LogExtension {
    async fn on_run_started(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        input: &str,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %agent_id,
            %run_id,
            input_length = input.len(),
            tenant = ctx.tenant_id().unwrap_or(""),
            "run started"
        );
        Ok(())
    }
}

#[async_trait]
impl RunCompleted for LogExtension {
    async fn on_run_completed(
        &self,
        _ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        output: &str,
        elapsed: Duration,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %agent_id,
            %run_id,
            output_length = output.len(),
            elapsed_ms = millis(elapsed),
            "run completed"
        );
        Ok(())
    }
}

#[async_trait]
impl RunFailed for LogExtension {
    async fn on_run_failed(
        &self,
        _ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        error: &DynError,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %agent_id, %run_id, %error, "run failed");
        Ok(())
    }
}

#[async_trait]
impl StepStarted for LogExtension {
    async fn on_step_started(
        &self,
        _ctx: &HookContext,
        run_id: RunId,
        step_index: usize,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %run_id, step_index, "step started");
        Ok(())
    }
}

#[async_trait]
impl StepCompleted for LogExtension {
    async fn on_step_completed(
        &self,
        _ctx: &HookContext,
        run_id: RunId,
        step_index: usize,
        elapsed: Duration,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %run_id,
            step_index,
            elapsed_ms = millis(elapsed),
            "step completed"
        );
        Ok(())
    }
}

#[async_trait]
impl ToolCalled for LogExtension {
    async fn on_tool_called(
        &self,
        _ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %run_id, tool_name, %arguments, "tool called");
        Ok(())
    }
}

#[async_trait]
impl ToolCompleted for LogExtension {
    async fn on_tool_completed(
        &self,
        _ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        result: &str,
        elapsed: Duration,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %run_id,
            tool_name,
            result_length = result.len(),
            elapsed_ms = millis(elapsed),
            "tool completed"
        );
        Ok(())
    }
}

#[async_trait]
impl ToolFailed for LogExtension {
    async fn on_tool_failed(
        &self,
        _ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        error: &DynError,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %run_id, tool_name, %error, "tool failed");
        Ok(())
    }
}

#[async_trait]
impl PersonaResolved for LogExtension {
    async fn on_persona_resolved(
        &self,
        _ctx: &HookContext,
        agent_id: AgentId,
        persona_name: &str,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %agent_id, persona_name, "persona resolved");
        Ok(())
    }
}

#[async_trait]
impl BehaviorTriggered for LogExtension {
    async fn on_behavior_triggered(
        &self,
        _ctx: &HookContext,
        run_id: RunId,
        behavior_name: &str,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %run_id, behavior_name, "behavior triggered");
        Ok(())
    }
}

#[async_trait]
impl CognitivePhaseChanged for LogExtension {
    async fn on_cognitive_phase_changed(
        &self,
        _ctx: &HookContext,
        run_id: RunId,
        from_phase: &str,
        to_phase: &str,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %run_id,
            from_phase,
            to_phase,
            "cognitive phase changed"
        );
        Ok(())
    }
}

#[async_trait]
impl CheckpointCreated for LogExtension {
    async fn on_checkpoint_created(
        &self,
        _ctx: &HookContext,
        checkpoint_id: CheckpointId,
        run_id: RunId,
        reason: &str,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %checkpoint_id,
            %run_id,
            reason,
            "checkpoint created"
        );
        Ok(())
    }
}

#[async_trait]
impl CheckpointResolved for LogExtension {
    async fn on_checkpoint_resolved(
        &self,
        _ctx: &HookContext,
        checkpoint_id: CheckpointId,
        decision: &str,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %checkpoint_id, decision, "checkpoint resolved");
        Ok(())
    }
}

#[async_trait]
impl OrchestrationStarted for LogExtension {
    async fn on_orchestration_started(
        &self,
        _ctx: &HookContext,
        orchestration_id: OrchestrationId,
        strategy: &str,
    ) -> Result<()> {
        info!(target: "cortex::lifecycle", %orchestration_id, strategy, "orchestration started");
        Ok(())
    }
}

#[async_trait]
impl OrchestrationCompleted for LogExtension {
    async fn on_orchestration_completed(
        &self,
        _ctx: &HookContext,
        orchestration_id: OrchestrationId,
        elapsed: Duration,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %orchestration_id,
            elapsed_ms = millis(elapsed),
            "orchestration completed"
        );
        Ok(())
    }
}

#[async_trait]
impl AgentHandoff for LogExtension {
    async fn on_agent_handoff(
        &self,
        _ctx: &HookContext,
        orchestration_id: OrchestrationId,
        from_agent: &str,
        to_agent: &str,
        payload: &str,
    ) -> Result<()> {
        info!(
            target: "cortex::lifecycle",
            %orchestration_id,
            from_agent,
            to_agent,
            payload_length = payload.len(),
            "agent handoff"
        );
        Ok(())
    }
}

#[async_trait]
impl Shutdown for LogExtension {
    async fn on_shutdown(&self, ctx: &HookContext) -> Result<()> {
        info!(target: "cortex::lifecycle", cancelled = ctx.is_cancelled(), "shutdown");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_subscribes_to_everything() {
        let ext: Arc<dyn Extension> = Arc::new(LogExtension::new());
        assert_eq!(ext.name(), "log");
        assert_eq!(capabilities(&ext), HookKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_handlers_never_fail() {
        let registry = Registry::builder()
            .with_extension(Arc::new(LogExtension))
            .build();
        let ctx = HookContext::new().tenant("acme");
        let err = std::io::Error::other("boom");

        // nothing to assert beyond "no panic"; every handler returns Ok
        registry
            .emit_run_started(&ctx, AgentId::new(), RunId::new(), "q")
            .await;
        registry
            .emit_run_failed(&ctx, AgentId::new(), RunId::new(), &err)
            .await;
        registry
            .emit_agent_handoff(&ctx, OrchestrationId::new(), "a", "b", "{}")
            .await;
        registry.emit_shutdown(&ctx).await;

        tokio_test::assert_ok!(LogExtension.on_step_started(&ctx, RunId::new(), 3).await);
    }
}
