//! The closed set of lifecycle moments an extension can observe

use std::fmt;

use serde::{Deserialize, Serialize};

/// One lifecycle moment with a fixed payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// An agent run began
    RunStarted,
    /// An agent run finished successfully
    RunCompleted,
    /// An agent run failed
    RunFailed,
    /// A reasoning step began
    StepStarted,
    /// A reasoning step finished
    StepCompleted,
    /// A tool invocation began
    ToolCalled,
    /// A tool invocation finished successfully
    ToolCompleted,
    /// A tool invocation failed
    ToolFailed,
    /// A persona was resolved for an agent
    PersonaResolved,
    /// A behavior fired during a run
    BehaviorTriggered,
    /// The cognitive engine switched phases
    CognitivePhaseChanged,
    /// A checkpoint was created
    CheckpointCreated,
    /// A checkpoint was resolved
    CheckpointResolved,
    /// Multi-agent orchestration began
    OrchestrationStarted,
    /// Multi-agent orchestration finished
    OrchestrationCompleted,
    /// One agent handed off to another
    AgentHandoff,
    /// The engine is shutting down
    Shutdown,
}

impl HookKind {
    /// Every kind, in declaration order
    pub const ALL: [HookKind; 17] = [
        Self::RunStarted,
        Self::RunCompleted,
        Self::RunFailed,
        Self::StepStarted,
        Self::StepCompleted,
        Self::ToolCalled,
        Self::ToolCompleted,
        Self::ToolFailed,
        Self::PersonaResolved,
        Self::BehaviorTriggered,
        Self::CognitivePhaseChanged,
        Self::CheckpointCreated,
        Self::CheckpointResolved,
        Self::OrchestrationStarted,
        Self::OrchestrationCompleted,
        Self::AgentHandoff,
        Self::Shutdown,
    ];

    /// Snake-case name of the kind, e.g. `run_started`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunStarted => "run_started",
            Self::RunCompleted => "run_completed",
            Self::RunFailed => "run_failed",
            Self::StepStarted => "step_started",
            Self::StepCompleted => "step_completed",
            Self::ToolCalled => "tool_called",
            Self::ToolCompleted => "tool_completed",
            Self::ToolFailed => "tool_failed",
            Self::PersonaResolved => "persona_resolved",
            Self::BehaviorTriggered => "behavior_triggered",
            Self::CognitivePhaseChanged => "cognitive_phase_changed",
            Self::CheckpointCreated => "checkpoint_created",
            Self::CheckpointResolved => "checkpoint_resolved",
            Self::OrchestrationStarted => "orchestration_started",
            Self::OrchestrationCompleted => "orchestration_completed",
            Self::AgentHandoff => "agent_handoff",
            Self::Shutdown => "shutdown",
        }
    }

    /// Name of the handler method, used in diagnostics, e.g. `on_run_started`
    pub fn hook_name(&self) -> &'static str {
        match self {
            Self::RunStarted => "on_run_started",
            Self::RunCompleted => "on_run_completed",
            Self::RunFailed => "on_run_failed",
            Self::StepStarted => "on_step_started",
            Self::StepCompleted => "on_step_completed",
            Self::ToolCalled => "on_tool_called",
            Self::ToolCompleted => "on_tool_completed",
            Self::ToolFailed => "on_tool_failed",
            Self::PersonaResolved => "on_persona_resolved",
            Self::BehaviorTriggered => "on_behavior_triggered",
            Self::CognitivePhaseChanged => "on_cognitive_phase_changed",
            Self::CheckpointCreated => "on_checkpoint_created",
            Self::CheckpointResolved => "on_checkpoint_resolved",
            Self::OrchestrationStarted => "on_orchestration_started",
            Self::OrchestrationCompleted => "on_orchestration_completed",
            Self::AgentHandoff => "on_agent_handoff",
            Self::Shutdown => "on_shutdown",
        }
    }

    /// Whether the payload of this kind carries a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::RunFailed | Self::ToolFailed)
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = HookKind::ALL.iter().map(|k| k.as_str()).collect();
        let hooks: HashSet<_> = HookKind::ALL.iter().map(|k| k.hook_name()).collect();
        assert_eq!(names.len(), 17);
        assert_eq!(hooks.len(), 17);
    }

    #[test]
    fn test_hook_name_matches_kind() {
        for kind in HookKind::ALL {
            assert_eq!(kind.hook_name(), format!("on_{}", kind.as_str()));
        }
    }

    #[test]
    fn test_serde_matches_as_str() {
        for kind in HookKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }
}
