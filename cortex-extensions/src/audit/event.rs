//! Audit record shape and the vocabulary used to fill it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use crate::actions;

/// Resource kinds an audit record can point at
pub mod resources {
    /// An agent run
    pub const RUN: &str = "run";
    /// A tool invocation
    pub const TOOL: &str = "tool";
    /// A persona
    pub const PERSONA: &str = "persona";
    /// A behavior
    pub const BEHAVIOR: &str = "behavior";
    /// A checkpoint
    pub const CHECKPOINT: &str = "checkpoint";
}

/// Coarse grouping of audit records
pub mod categories {
    /// Agent lifecycle
    pub const AGENT: &str = "agent";
    /// Tool usage
    pub const TOOL: &str = "tool";
    /// Persona and behavior
    pub const PERSONA: &str = "persona";
    /// Human-in-the-loop checkpoints
    pub const CHECKPOINT: &str = "checkpoint";
}

/// How serious an audit record is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine event
    Info,
    /// Needs attention
    Warning,
    /// Something failed
    Critical,
}

/// Whether the audited operation succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Operation succeeded
    Success,
    /// Operation failed
    Failure,
}

/// One audit trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Dotted action name, see [`actions`]
    pub action: String,
    /// Resource kind, see [`resources`]
    pub resource: String,
    /// Category, see [`categories`]
    pub category: String,
    /// Identifier of the affected resource
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
    /// Event-specific details
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Success or failure
    pub outcome: Outcome,
    /// Severity
    pub severity: Severity,
    /// Failure description, set only for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// When the event was built
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// A successful, informational record
    pub fn success(
        action: &str,
        resource: &str,
        category: &str,
        resource_id: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            action: action.to_string(),
            resource: resource.to_string(),
            category: category.to_string(),
            resource_id: resource_id.into(),
            metadata,
            outcome: Outcome::Success,
            severity: Severity::Info,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    /// A critical failure record; `error` is copied into `reason` and
    /// `metadata.error`
    pub fn failure(
        action: &str,
        resource: &str,
        category: &str,
        resource_id: impl Into<String>,
        mut metadata: Map<String, Value>,
        error: impl ToString,
    ) -> Self {
        let error = error.to_string();
        metadata.insert("error".to_string(), Value::String(error.clone()));
        Self {
            outcome: Outcome::Failure,
            severity: Severity::Critical,
            reason: Some(error),
            ..Self::success(action, resource, category, resource_id, metadata)
        }
    }

    /// Metadata value by key
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_sets_reason_and_metadata() {
        let evt = AuditEvent::failure(
            actions::TOOL_FAILED,
            resources::TOOL,
            categories::TOOL,
            "arun_x",
            Map::new(),
            "rate limited",
        );
        assert_eq!(evt.outcome, Outcome::Failure);
        assert_eq!(evt.severity, Severity::Critical);
        assert_eq!(evt.reason.as_deref(), Some("rate limited"));
        assert_eq!(evt.meta("error"), Some(&json!("rate limited")));
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let evt = AuditEvent::success(
            actions::CHECKPOINT_RESOLVED,
            resources::CHECKPOINT,
            categories::CHECKPOINT,
            "",
            Map::new(),
        );
        let value = serde_json::to_value(&evt).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("resource_id"));
        assert!(!obj.contains_key("metadata"));
        assert!(!obj.contains_key("reason"));
        assert_eq!(obj["severity"], json!("info"));
        assert_eq!(obj["outcome"], json!("success"));
    }
}
