use crate::{
    domain::history::{HistoryEntry, HistoryLog},
    domain::variables::{VariableStore, WorkflowVariable},
    domain::workflow_definition::WorkflowDefinition,
    domain::workflow_instance::{CorrelationId, WorkflowInstance, WorkflowInstanceId},
    CoreError,
};
use chrono::Utc;

/// Aggregate: a workflow instance together with its history and variables.
///
/// Every mutation goes through this type so the current state and the history can
/// never disagree. Stores keep one record per instance behind a per-instance lock.
#[derive(Debug, Clone)]
pub struct InstanceRecord {
    instance: WorkflowInstance,
    history: HistoryLog,
    variables: VariableStore,
}

impl InstanceRecord {
    /// Start a new instance in the definition's initial state
    pub fn start(
        id: WorkflowInstanceId,
        definition: &WorkflowDefinition,
        correlation_id: CorrelationId,
        assignee: Option<String>,
        actor: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let completed = definition
            .is_terminal(&definition.initial_state)
            .then_some(now);

        Self {
            instance: WorkflowInstance {
                id,
                workflow_type: definition.workflow_type.clone(),
                correlation_id,
                state: definition.initial_state.clone(),
                assignee,
                started: now,
                completed,
            },
            history: HistoryLog::started(id, &definition.initial_state, actor, now),
            variables: VariableStore::new(id),
        }
    }

    /// Fire `trigger` from the current state.
    ///
    /// Fails without touching the record when the definition is for another type or
    /// no transition matches.
    pub fn apply_transition(
        &mut self,
        definition: &WorkflowDefinition,
        trigger: &str,
        actor: Option<String>,
    ) -> Result<&HistoryEntry, CoreError> {
        if definition.workflow_type != self.instance.workflow_type {
            return Err(CoreError::ValidationError(format!(
                "Instance {} is of type {}, not {}",
                self.instance.id, self.instance.workflow_type, definition.workflow_type
            )));
        }

        let target = definition
            .find_transition(&self.instance.state, trigger)
            .map(|t| t.to.clone())
            .ok_or_else(|| CoreError::InvalidTransition {
                state: self.instance.state.clone(),
                trigger: trigger.to_string(),
            })?;

        let now = Utc::now();
        if self.instance.completed.is_none() && definition.is_terminal(&target) {
            self.instance.completed = Some(now);
        }
        self.instance.state = target;

        Ok(self.history.append(&self.instance.state, trigger, actor, now))
    }

    /// Insert or overwrite a variable
    pub fn set_variable(
        &mut self,
        name: &str,
        value: serde_json::Value,
    ) -> Result<WorkflowVariable, CoreError> {
        self.variables.set(name, value, Utc::now()).cloned()
    }

    /// Current snapshot of the instance
    #[inline]
    pub fn instance(&self) -> &WorkflowInstance {
        &self.instance
    }

    /// Transition history, oldest first
    #[inline]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Variable bag
    #[inline]
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }
}
