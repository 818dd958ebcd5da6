//! Extension registry and lifecycle event dispatch
//!
//! Extensions are classified once, when they are registered: for every
//! capability the extension advertises, a subscription is appended to that
//! capability's list. Emitting an event then walks only the list for its
//! kind, in registration order.
//!
//! Registration happens on a [`RegistryBuilder`]. Calling
//! [`RegistryBuilder::build`] freezes the lists into a [`Registry`] that has
//! no mutating methods and can be shared across tasks behind an `Arc`.
//!
//! Every `emit_*` method is infallible. A hook that returns an error, or
//! panics, is logged and skipped; the next subscriber still runs.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tracing::{error, warn};

use super::hooks::*;
use super::kind::HookKind;
use crate::context::HookContext;
use crate::error::{DynError, Result};
use crate::id::{AgentId, CheckpointId, OrchestrationId, RunId};

/// A hook implementation paired with the extension name captured at
/// registration time
struct Subscription<H: ?Sized> {
    name: String,
    hook: Arc<H>,
}

impl<H: ?Sized> Subscription<H> {
    fn new(name: &str, hook: Arc<H>) -> Self {
        Self {
            name: name.to_string(),
            hook,
        }
    }
}

fn names<H: ?Sized>(list: &[Subscription<H>]) -> Vec<&str> {
    list.iter().map(|s| s.name.as_str()).collect()
}

/// Holds registered extensions and dispatches lifecycle events to them
#[derive(Default)]
pub struct Registry {
    extensions: Vec<Arc<dyn Extension>>,

    run_started: Vec<Subscription<dyn RunStarted>>,
    run_completed: Vec<Subscription<dyn RunCompleted>>,
    run_failed: Vec<Subscription<dyn RunFailed>>,
    step_started: Vec<Subscription<dyn StepStarted>>,
    step_completed: Vec<Subscription<dyn StepCompleted>>,
    tool_called: Vec<Subscription<dyn ToolCalled>>,
    tool_completed: Vec<Subscription<dyn ToolCompleted>>,
    tool_failed: Vec<Subscription<dyn ToolFailed>>,
    persona_resolved: Vec<Subscription<dyn PersonaResolved>>,
    behavior_triggered: Vec<Subscription<dyn BehaviorTriggered>>,
    cognitive_phase_changed: Vec<Subscription<dyn CognitivePhaseChanged>>,
    checkpoint_created: Vec<Subscription<dyn CheckpointCreated>>,
    checkpoint_resolved: Vec<Subscription<dyn CheckpointResolved>>,
    orchestration_started: Vec<Subscription<dyn OrchestrationStarted>>,
    orchestration_completed: Vec<Subscription<dyn OrchestrationCompleted>>,
    agent_handoff: Vec<Subscription<dyn AgentHandoff>>,
    shutdown: Vec<Subscription<dyn Shutdown>>,
}

/// Mutable registration phase of a [`Registry`]
#[derive(Default)]
pub struct RegistryBuilder {
    inner: Registry,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an owned extension
    pub fn register<E: Extension + 'static>(&mut self, extension: E) -> &mut Self {
        self.register_arc(Arc::new(extension))
    }

    /// Register a shared extension.
    ///
    /// Every capability accessor is consulted exactly once here. Registering
    /// the same instance twice is not deduplicated: it will be notified twice
    /// per event.
    pub fn register_arc(&mut self, extension: Arc<dyn Extension>) -> &mut Self {
        let r = &mut self.inner;
        r.extensions.push(Arc::clone(&extension));
        let name = extension.name().to_string();

        if let Some(h) = Arc::clone(&extension).as_run_started() {
            r.run_started.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_run_completed() {
            r.run_completed.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_run_failed() {
            r.run_failed.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_step_started() {
            r.step_started.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_step_completed() {
            r.step_completed.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_tool_called() {
            r.tool_called.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_tool_completed() {
            r.tool_completed.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_tool_failed() {
            r.tool_failed.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_persona_resolved() {
            r.persona_resolved.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_behavior_triggered() {
            r.behavior_triggered.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_cognitive_phase_changed() {
            r.cognitive_phase_changed.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_checkpoint_created() {
            r.checkpoint_created.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_checkpoint_resolved() {
            r.checkpoint_resolved.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_orchestration_started() {
            r.orchestration_started.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_orchestration_completed() {
            r.orchestration_completed.push(Subscription::new(&name, h));
        }
        if let Some(h) = Arc::clone(&extension).as_agent_handoff() {
            r.agent_handoff.push(Subscription::new(&name, h));
        }
        if let Some(h) = extension.as_shutdown() {
            r.shutdown.push(Subscription::new(&name, h));
        }

        self
    }

    /// Chaining form of [`register_arc`](Self::register_arc)
    pub fn with_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.register_arc(extension);
        self
    }

    /// Number of extensions registered so far
    pub fn len(&self) -> usize {
        self.inner.extensions.len()
    }

    /// Whether nothing has been registered yet
    pub fn is_empty(&self) -> bool {
        self.inner.extensions.is_empty()
    }

    /// Freeze registration and hand out the dispatcher
    pub fn build(self) -> Registry {
        self.inner
    }
}

/// Kinds an extension subscribes to, in [`HookKind::ALL`] order
pub fn capabilities(extension: &Arc<dyn Extension>) -> Vec<HookKind> {
    let e = || Arc::clone(extension);
    let checks = [
        (HookKind::RunStarted, e().as_run_started().is_some()),
        (HookKind::RunCompleted, e().as_run_completed().is_some()),
        (HookKind::RunFailed, e().as_run_failed().is_some()),
        (HookKind::StepStarted, e().as_step_started().is_some()),
        (HookKind::StepCompleted, e().as_step_completed().is_some()),
        (HookKind::ToolCalled, e().as_tool_called().is_some()),
        (HookKind::ToolCompleted, e().as_tool_completed().is_some()),
        (HookKind::ToolFailed, e().as_tool_failed().is_some()),
        (HookKind::PersonaResolved, e().as_persona_resolved().is_some()),
        (HookKind::BehaviorTriggered, e().as_behavior_triggered().is_some()),
        (HookKind::CognitivePhaseChanged, e().as_cognitive_phase_changed().is_some()),
        (HookKind::CheckpointCreated, e().as_checkpoint_created().is_some()),
        (HookKind::CheckpointResolved, e().as_checkpoint_resolved().is_some()),
        (HookKind::OrchestrationStarted, e().as_orchestration_started().is_some()),
        (HookKind::OrchestrationCompleted, e().as_orchestration_completed().is_some()),
        (HookKind::AgentHandoff, e().as_agent_handoff().is_some()),
        (HookKind::Shutdown, e().as_shutdown().is_some()),
    ];
    checks
        .into_iter()
        .filter_map(|(kind, present)| present.then_some(kind))
        .collect()
}

impl Registry {
    /// An empty registry; every emit is a no-op
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a registration phase
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All registered extensions, in registration order
    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    /// Number of registered extensions
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether no extension is registered
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Names of the extensions that receive `kind`, in delivery order
    pub fn subscribers(&self, kind: HookKind) -> Vec<&str> {
        match kind {
            HookKind::RunStarted => names(&self.run_started),
            HookKind::RunCompleted => names(&self.run_completed),
            HookKind::RunFailed => names(&self.run_failed),
            HookKind::StepStarted => names(&self.step_started),
            HookKind::StepCompleted => names(&self.step_completed),
            HookKind::ToolCalled => names(&self.tool_called),
            HookKind::ToolCompleted => names(&self.tool_completed),
            HookKind::ToolFailed => names(&self.tool_failed),
            HookKind::PersonaResolved => names(&self.persona_resolved),
            HookKind::BehaviorTriggered => names(&self.behavior_triggered),
            HookKind::CognitivePhaseChanged => names(&self.cognitive_phase_changed),
            HookKind::CheckpointCreated => names(&self.checkpoint_created),
            HookKind::CheckpointResolved => names(&self.checkpoint_resolved),
            HookKind::OrchestrationStarted => names(&self.orchestration_started),
            HookKind::OrchestrationCompleted => names(&self.orchestration_completed),
            HookKind::AgentHandoff => names(&self.agent_handoff),
            HookKind::Shutdown => names(&self.shutdown),
        }
    }

    /// Number of extensions that receive `kind`
    pub fn subscriber_count(&self, kind: HookKind) -> usize {
        self.subscribers(kind).len()
    }

    // ============ Run events ============

    /// Notify subscribers that an agent run began
    pub async fn emit_run_started(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        input: &str,
    ) {
        for s in &self.run_started {
            let fut = s.hook.on_run_started(ctx, agent_id, run_id, input);
            invoke(HookKind::RunStarted, &s.name, fut).await;
        }
    }

    /// Notify subscribers that an agent run finished
    pub async fn emit_run_completed(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        output: &str,
        elapsed: Duration,
    ) {
        for s in &self.run_completed {
            let fut = s.hook.on_run_completed(ctx, agent_id, run_id, output, elapsed);
            invoke(HookKind::RunCompleted, &s.name, fut).await;
        }
    }

    /// Notify subscribers that an agent run failed
    pub async fn emit_run_failed(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        run_id: RunId,
        run_error: &DynError,
    ) {
        for s in &self.run_failed {
            let fut = s.hook.on_run_failed(ctx, agent_id, run_id, run_error);
            invoke(HookKind::RunFailed, &s.name, fut).await;
        }
    }

    // ============ Step events ============

    /// Notify subscribers that a reasoning step began
    pub async fn emit_step_started(&self, ctx: &HookContext, run_id: RunId, step_index: usize) {
        for s in &self.step_started {
            let fut = s.hook.on_step_started(ctx, run_id, step_index);
            invoke(HookKind::StepStarted, &s.name, fut).await;
        }
    }

    /// Notify subscribers that a reasoning step finished
    pub async fn emit_step_completed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        step_index: usize,
        elapsed: Duration,
    ) {
        for s in &self.step_completed {
            let fut = s.hook.on_step_completed(ctx, run_id, step_index, elapsed);
            invoke(HookKind::StepCompleted, &s.name, fut).await;
        }
    }

    // ============ Tool events ============

    /// Notify subscribers that a tool invocation began
    pub async fn emit_tool_called(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        arguments: &Value,
    ) {
        for s in &self.tool_called {
            let fut = s.hook.on_tool_called(ctx, run_id, tool_name, arguments);
            invoke(HookKind::ToolCalled, &s.name, fut).await;
        }
    }

    /// Notify subscribers that a tool invocation finished
    pub async fn emit_tool_completed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        result: &str,
        elapsed: Duration,
    ) {
        for s in &self.tool_completed {
            let fut = s.hook.on_tool_completed(ctx, run_id, tool_name, result, elapsed);
            invoke(HookKind::ToolCompleted, &s.name, fut).await;
        }
    }

    /// Notify subscribers that a tool invocation failed
    pub async fn emit_tool_failed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        tool_name: &str,
        tool_error: &DynError,
    ) {
        for s in &self.tool_failed {
            let fut = s.hook.on_tool_failed(ctx, run_id, tool_name, tool_error);
            invoke(HookKind::ToolFailed, &s.name, fut).await;
        }
    }

    // ============ Persona events ============

    /// Notify subscribers that a persona was resolved
    pub async fn emit_persona_resolved(
        &self,
        ctx: &HookContext,
        agent_id: AgentId,
        persona_name: &str,
    ) {
        for s in &self.persona_resolved {
            let fut = s.hook.on_persona_resolved(ctx, agent_id, persona_name);
            invoke(HookKind::PersonaResolved, &s.name, fut).await;
        }
    }

    /// Notify subscribers that a behavior fired
    pub async fn emit_behavior_triggered(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        behavior_name: &str,
    ) {
        for s in &self.behavior_triggered {
            let fut = s.hook.on_behavior_triggered(ctx, run_id, behavior_name);
            invoke(HookKind::BehaviorTriggered, &s.name, fut).await;
        }
    }

    /// Notify subscribers that the cognitive phase changed
    pub async fn emit_cognitive_phase_changed(
        &self,
        ctx: &HookContext,
        run_id: RunId,
        from_phase: &str,
        to_phase: &str,
    ) {
        for s in &self.cognitive_phase_changed {
            let fut = s
                .hook
                .on_cognitive_phase_changed(ctx, run_id, from_phase, to_phase);
            invoke(HookKind::CognitivePhaseChanged, &s.name, fut).await;
        }
    }

    // ============ Checkpoint events ============

    /// Notify subscribers that a checkpoint was created
    pub async fn emit_checkpoint_created(
        &self,
        ctx: &HookContext,
        checkpoint_id: CheckpointId,
        run_id: RunId,
        reason: &str,
    ) {
        for s in &self.checkpoint_created {
            let fut = s
                .hook
                .on_checkpoint_created(ctx, checkpoint_id, run_id, reason);
            invoke(HookKind::CheckpointCreated, &s.name, fut).await;
        }
    }

    /// Notify subscribers that a checkpoint was resolved
    pub async fn emit_checkpoint_resolved(
        &self,
        ctx: &HookContext,
        checkpoint_id: CheckpointId,
        decision: &str,
    ) {
        for s in &self.checkpoint_resolved {
            let fut = s.hook.on_checkpoint_resolved(ctx, checkpoint_id, decision);
            invoke(HookKind::CheckpointResolved, &s.name, fut).await;
        }
    }

    // ============ Orchestration events ============

    /// Notify subscribers that orchestration began
    pub async fn emit_orchestration_started(
        &self,
        ctx: &HookContext,
        orchestration_id: OrchestrationId,
        strategy: &str,
    ) {
        for s in &self.orchestration_started {
            let fut = s
                .hook
                .on_orchestration_started(ctx, orchestration_id, strategy);
            invoke(HookKind::OrchestrationStarted, &s.name, fut).await;
        }
    }

    /// Notify subscribers that orchestration finished
    pub async fn emit_orchestration_completed(
        &self,
        ctx: &HookContext,
        orchestration_id: OrchestrationId,
        elapsed: Duration,
    ) {
        for s in &self.orchestration_completed {
            let fut = s
                .hook
                .on_orchestration_completed(ctx, orchestration_id, elapsed);
            invoke(HookKind::OrchestrationCompleted, &s.name, fut).await;
        }
    }

    /// Notify subscribers that one agent handed off to another
    pub async fn emit_agent_handoff(
        &self,
        ctx: &HookContext,
        orchestration_id: OrchestrationId,
        from_agent: &str,
        to_agent: &str,
        payload: &str,
    ) {
        for s in &self.agent_handoff {
            let fut = s
                .hook
                .on_agent_handoff(ctx, orchestration_id, from_agent, to_agent, payload);
            invoke(HookKind::AgentHandoff, &s.name, fut).await;
        }
    }

    // ============ Shutdown event ============

    /// Notify subscribers that the engine is shutting down
    pub async fn emit_shutdown(&self, ctx: &HookContext) {
        for s in &self.shutdown {
            let fut = s.hook.on_shutdown(ctx);
            invoke(HookKind::Shutdown, &s.name, fut).await;
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.extensions.iter().map(|e| e.name()).collect();
        f.debug_struct("Registry")
            .field("extensions", &names)
            .finish_non_exhaustive()
    }
}

/// Run one hook, turning an error or a panic into a log record.
async fn invoke<F>(kind: HookKind, extension: &str, fut: F)
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!(
                hook = %kind.hook_name(),
                extension = %extension,
                error = %e,
                "extension hook error"
            );
        }
        Err(payload) => {
            error!(
                hook = %kind.hook_name(),
                extension = %extension,
                error = %panic_message(payload.as_ref()),
                "extension hook panicked"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
