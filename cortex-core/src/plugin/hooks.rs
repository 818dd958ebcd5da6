//! Capability interfaces
//!
//! Each lifecycle moment has its own single-method trait so an extension opts
//! in to exactly the events it cares about. The base [`Extension`] trait
//! carries the extension's name plus one accessor per capability; an
//! extension advertises a capability by overriding the accessor to return
//! `Some(self)`. The registry asks once, at registration time.
//!
//! Handlers run on whatever task the orchestration loop is using when the
//! event fires and may be invoked concurrently with themselves. A returned
//! error is logged by the registry and goes no further.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::HookContext;
use crate::error::{DynError, Result};
use crate::id::{AgentId, CheckpointId, OrchestrationId, RunId};

// ============ Base extension ============

/// Base trait every cortex extension implements
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use cortex_core::prelude::*;
///
/// struct RunCounter;
///
/// #[async_trait]
/// impl RunStarted for RunCounter {
///     async fn on_run_started(
///         &self,
///         _ctx: &HookContext,
///         _agent_id: AgentId,
///         _run_id: RunId,
///         _input: &str,
///     ) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// impl Extension for RunCounter {
///     fn name(&self) -> &str {
///         "run-counter"
///     }
///
///     fn as_run_started(self: Arc<Self>) -> Option<Arc<dyn RunStarted>> {
///         Some(self)
///     }
/// }
/// ```
pub trait Extension: Send + Sync {
    /// Human-readable name, used only in diagnostics
    fn name(&self) -> &str;

    /// Capability accessor for [`RunStarted`]
    fn as_run_started(self: Arc<Self>) -> Option<Arc<dyn RunStarted>> {
        None
    }

    /// Capability accessor for [`RunCompleted`]
    fn as_run_completed(self: Arc<Self>) -> Option<Arc<dyn RunCompleted>> {
        None
    }

    /// Capability accessor for [`RunFailed`]
    fn as_run_failed(self: Arc<Self>) -> Option<Arc<dyn RunFailed>> {
        None
    }

    /// Capability accessor for [`StepStarted`]
    fn as_step_started(self: Arc<Self>) -> Option<Arc<dyn StepStarted>> {
        None
    }

    /// Capability accessor for [`StepCompleted`]
    fn as_step_completed(self: Arc<Self>) -> Option<Arc<dyn StepCompleted>> {
        None
    }

    /// Capability accessor for [`ToolCalled`]
    fn as_tool_called(self: Arc<Self>) -> Option<Arc<dyn ToolCalled>> {
        None
    }

    /// Capability accessor for [`ToolCompleted`]
    fn as_tool_completed(self: Arc<Self>) -> Option<Arc<dyn ToolCompleted>> {
        None
    }

    /// Capability accessor for [`ToolFailed`]
    fn as_tool_failed(self: Arc<Self>) -> Option<Arc<dyn ToolFailed>> {
        None
    }

    /// Capability accessor for [`PersonaResolved`]
    fn as_persona_resolved(self: Arc<Self>) -> Option<Arc<dyn PersonaResolved>> {
        None
    }

    /// Capability accessor for [`BehaviorTriggered`]
    fn as_behavior_triggered(self: Arc<Self>) -> Option<Arc<dyn BehaviorTriggered>> {
        None
    }

    /// Capability accessor for [`CognitivePhaseChanged`]
    fn as_cognitive_phase_changed(self: Arc<Self>) -> Option<Arc<dyn CognitivePhaseChanged>> {
        None
    }

    /// Capability accessor for [`CheckpointCreated`]
    fn as_checkpoint_created(self: Arc<Self>) -> Option<Arc<dyn CheckpointCreated>> {
        None
    }

    /// Capability accessor for [`CheckpointResolved`]
    fn as_checkpoint_resolved(self: Arc<Self>) -> Option<Arc<dyn CheckpointResolved>> {
        None
    }

    /// Capability accessor for [`OrchestrationStarted`]
    fn as_orchestration_started(self: Arc<Self>) -> Option<Arc<dyn OrchestrationStarted>> {
        None
    }

    /// Capability accessor for [`OrchestrationCompleted`]
    fn as_orchestration_completed(self: Arc<Self>) -> Option<Arc<dyn OrchestrationCompleted>> {
        None
    }

    /// Capability accessor for [`AgentHandoff`]
    fn as_agent_handoff(self: Arc<Self>) -> Option<Arc<dyn AgentHandoff>> {
        None
    }

    /// Capability accessor for [`Shutdown`]
    fn as_shutdown(self: Arc<Self>) -> Option<Arc<dyn Shutdown>> {
        None
    }
}

// ============ Agent run hooks ============

/// Called when an agent run begins
#[async_trait]
pub trait RunStarted: Send + Sync {
    /// Handle the event
    async fn on_run_started(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        input: &str,
    ) -> Result<()>;
}

/// Called when an agent run finishes successfully
#[async_trait]
pub trait RunCompleted: Send + Sync {
    /// Handle the event
    async fn on_run_completed(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        output: &str,
        elapsed: Duration,
    ) -> Result<()>;
}

/// Called when an agent run fails
#[async_trait]
pub trait RunFailed: Send + Sync {
    /// Handle the event
    async fn on_run_failed(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        error: &DynError,
    ) -> Result<()>;
}

// ============ Reasoning step hooks ============

/// Called when a reasoning step begins
#[async_trait]
pub trait StepStarted: Send + Sync {
    /// Handle the event
    async fn on_step_started(&self, ctx: &HookContext, run_id: RunId, step_index: usize)
        -> Result<()>;
}

/// Called when a reasoning step finishes
#[async_trait]
pub trait StepCompleted: Send + Sync {
    /// Handle the event
    async fn on_step_completed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        step_index: usize,
        elapsed: Duration,
    ) -> Result<()>;
}

// ============ Tool hooks ============

/// Called when a tool invocation begins
#[async_trait]
pub trait ToolCalled: Send + Sync {
    /// Handle the event
    async fn on_tool_called(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<()>;
}

/// Called when a tool invocation finishes successfully
#[async_trait]
pub trait ToolCompleted: Send + Sync {
    /// Handle the event
    async fn on_tool_completed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        result: &str,
        elapsed: Duration,
    ) -> Result<()>;
}

/// Called when a tool invocation fails
#[async_trait]
pub trait ToolFailed: Send + Sync {
    /// Handle the event
    async fn on_tool_failed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        error: &DynError,
    ) -> Result<()>;
}

// ============ Persona hooks ============

/// Called when a persona is resolved for an agent
#[async_trait]
pub trait PersonaResolved: Send + Sync {
    /// Handle the event
    async fn on_persona_resolved(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        persona_name: &str,
    ) -> Result<()>;
}

/// Called when a behavior fires during a run
#[async_trait]
pub trait BehaviorTriggered: Send + Sync {
    /// Handle the event
    async fn on_behavior_triggered(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        behavior_name: &str,
    ) -> Result<()>;
}

/// Called when the cognitive engine switches phases
#[async_trait]
pub trait CognitivePhaseChanged: Send + Sync {
    /// Handle the event
    async fn on_cognitive_phase_changed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        from_phase: &str,
        to_phase: &str,
    ) -> Result<()>;
}

// ============ Checkpoint hooks ============

/// Called when a checkpoint is created
#[async_trait]
pub trait CheckpointCreated: Send + Sync {
    /// Handle the event
    async fn on_checkpoint_created(
        &self,
        ctx: &HookContext,
        checkpoint_id: CheckpointId,
        run_id: RunId,
        reason: &str,
    ) -> Result<()>;
}

/// Called when a checkpoint is resolved
#[async_trait]
pub trait CheckpointResolved: Send + Sync {
    /// Handle the event
    async fn on_checkpoint_resolved(
        &self,
        ctx: &HookContext,
        checkpoint_id: CheckpointId,
        decision: &str,
    ) -> Result<()>;
}

// ============ Orchestration hooks ============

/// Called when multi-agent orchestration begins
#[async_trait]
pub trait OrchestrationStarted: Send + Sync {
    /// Handle the event
    async fn on_orchestration_started(
        &self,
        ctx: &HookContext,
        orchestration_id: OrchestrationId,
        strategy: &str,
    ) -> Result<()>;
}

/// Called when orchestration finishes
#[async_trait]
pub trait OrchestrationCompleted: Send + Sync {
    /// Handle the event
    async fn on_orchestration_completed(
        &self,
        ctx: &HookContext,
        orchestration_id: OrchestrationId,
        elapsed: Duration,
    ) -> Result<()>;
}

/// Called when one agent hands off to another
#[async_trait]
pub trait AgentHandoff: Send + Sync {
    /// Handle the event
    async fn on_agent_handoff(
        &self,
        ctx: &HookContext,
        orchestration_id: OrchestrationId,
        from_agent: &str,
        to_agent: &str,
        payload: &str,
    ) -> Result<()>;
}

// ============ Shutdown hook ============

/// Called during graceful shutdown
#[async_trait]
pub trait Shutdown: Send + Sync {
    /// Handle the event
    async fn on_shutdown(&self, ctx: &HookContext) -> Result<()>;
}
