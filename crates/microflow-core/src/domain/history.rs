//! Append-only transition history of a workflow instance.
//!
//! A [`HistoryLog`] can only grow through [`InstanceRecord`](super::instance_record::InstanceRecord),
//! which appends an entry in the same step that moves the instance's current state. Each
//! appended entry starts where the previous one ended, so sequences stay contiguous and the
//! last entry always names the current state.

use crate::domain::workflow_instance::WorkflowInstanceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trigger recorded on the creation entry of every instance
pub const CREATE_TRIGGER: &str = "create";

/// Immutable record of one transition applied to an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Owning instance
    pub instance_id: WorkflowInstanceId,

    /// Position in the instance's history, starting at 0 for the creation entry
    pub sequence: u64,

    /// State before the transition; `None` for the creation entry
    pub from_state: Option<String>,

    /// State after the transition
    pub to_state: String,

    /// Event or command that caused the transition
    pub trigger: String,

    /// User who applied the transition, when known
    pub actor: Option<String>,

    /// When the transition was applied
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of one instance, oldest first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Start a history with the creation entry
    pub(crate) fn started(
        instance_id: WorkflowInstanceId,
        initial_state: &str,
        actor: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut entries = Vec::with_capacity(8);
        entries.push(HistoryEntry {
            instance_id,
            sequence: 0,
            from_state: None,
            to_state: initial_state.to_string(),
            trigger: CREATE_TRIGGER.to_string(),
            actor,
            timestamp,
        });
        Self { entries }
    }

    /// Append the next entry, chained from the last recorded state
    pub(crate) fn append(
        &mut self,
        to_state: &str,
        trigger: &str,
        actor: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> &HistoryEntry {
        let (instance_id, sequence, from_state) = {
            let last = self.last();
            (last.instance_id, last.sequence + 1, last.to_state.clone())
        };

        self.entries.push(HistoryEntry {
            instance_id,
            sequence,
            from_state: Some(from_state),
            to_state: to_state.to_string(),
            trigger: trigger.to_string(),
            actor,
            timestamp,
        });
        self.last()
    }

    /// All entries, oldest first
    #[inline]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent entry
    #[inline]
    pub fn last(&self) -> &HistoryEntry {
        // `started` guarantees at least one entry and nothing removes entries
        &self.entries[self.entries.len() - 1]
    }

    /// Number of recorded entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries; a started log always has one
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
