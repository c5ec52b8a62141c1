use crate::domain::workflow_definition::WorkflowType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value object: Workflow instance ID, allocated monotonically by the store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkflowInstanceId(pub u64);

impl fmt::Display for WorkflowInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value object: Caller-assigned business key, unique per workflow type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Create a correlation id from anything string-like
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for CorrelationId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of one occurrence of a workflow definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    /// Unique identifier
    pub id: WorkflowInstanceId,

    /// Definition this instance runs
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,

    /// Business key
    pub correlation_id: CorrelationId,

    /// Current state; always a state of the definition
    pub state: String,

    /// User currently responsible for the instance
    pub assignee: Option<String>,

    /// Creation timestamp
    pub started: DateTime<Utc>,

    /// Set once the instance enters a terminal state
    pub completed: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
    /// Whether the instance has reached a terminal state
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }
}
