use crate::domain::workflow_instance::WorkflowInstanceId;
use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{BTreeMap, Entry};

/// A named value attached to a workflow instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowVariable {
    /// Owning instance
    pub instance_id: WorkflowInstanceId,

    /// Name, unique per instance
    pub name: String,

    /// Opaque value; no schema is imposed
    pub value: serde_json::Value,

    /// Last write timestamp
    pub updated_at: DateTime<Utc>,
}

/// Variable bag of one instance. Writes overwrite by name; no history is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStore {
    instance_id: WorkflowInstanceId,
    entries: BTreeMap<String, WorkflowVariable>,
}

impl VariableStore {
    pub(crate) fn new(instance_id: WorkflowInstanceId) -> Self {
        Self {
            instance_id,
            entries: BTreeMap::new(),
        }
    }

    /// Insert or overwrite a variable
    pub(crate) fn set(
        &mut self,
        name: &str,
        value: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Result<&WorkflowVariable, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Variable name must not be empty".to_string(),
            ));
        }

        let variable = WorkflowVariable {
            instance_id: self.instance_id,
            name: name.to_string(),
            value,
            updated_at,
        };

        match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(variable);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(variable)),
        }
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&WorkflowVariable> {
        self.entries.get(name)
    }

    /// All variables, ordered by name
    pub fn list(&self) -> Vec<WorkflowVariable> {
        self.entries.values().cloned().collect()
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variable has been set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
