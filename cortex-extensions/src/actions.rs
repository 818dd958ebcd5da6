//! Action names, one per audited or counted lifecycle moment

/// Agent run began
pub const RUN_STARTED: &str = "cortex.agent.run.started";
/// Agent run finished
pub const RUN_COMPLETED: &str = "cortex.agent.run.completed";
/// Agent run failed
pub const RUN_FAILED: &str = "cortex.agent.run.failed";
/// Tool invocation began
pub const TOOL_CALLED: &str = "cortex.tool.called";
/// Tool invocation finished
pub const TOOL_COMPLETED: &str = "cortex.tool.completed";
/// Tool invocation failed
pub const TOOL_FAILED: &str = "cortex.tool.failed";
/// Persona resolved
pub const PERSONA_RESOLVED: &str = "cortex.persona.resolved";
/// Behavior fired
pub const BEHAVIOR_TRIGGERED: &str = "cortex.behavior.triggered";
/// Cognitive phase switched
pub const COGNITIVE_PHASE_CHANGED: &str = "cortex.cognitive.phase_changed";
/// Checkpoint created
pub const CHECKPOINT_CREATED: &str = "cortex.checkpoint.created";
/// Checkpoint resolved
pub const CHECKPOINT_RESOLVED: &str = "cortex.checkpoint.resolved";
