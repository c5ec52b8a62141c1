//! Repository traits for the Microflow engine
//!
//! This module defines the storage seam used by the engine. External crates
//! implement these traits to provide different persistence mechanisms.

use async_trait::async_trait;

use super::history::HistoryEntry;
use super::query::{Page, PageRequest, WorkflowSearchFilter};
use super::variables::WorkflowVariable;
use super::workflow_definition::{WorkflowDefinition, WorkflowType};
use super::workflow_instance::{CorrelationId, WorkflowInstance, WorkflowInstanceId};
use crate::CoreError;

/// Durable record of workflow instances, their history and their variables.
///
/// Implementations must serialise writes per instance, keep writes to different
/// instances independent, and never let a reader observe a state change without the
/// history entry that records it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowInstanceRepository: Send + Sync {
    /// Create an instance of `definition` in its initial state.
    ///
    /// The `(type, correlation_id)` uniqueness check and the insert are one atomic step;
    /// a duplicate fails with [`CoreError::ConflictError`].
    async fn create(
        &self,
        definition: &WorkflowDefinition,
        correlation_id: &CorrelationId,
        assignee: Option<String>,
        actor: Option<String>,
    ) -> Result<WorkflowInstance, CoreError>;

    /// Find an instance by ID
    async fn find_by_id(&self, id: WorkflowInstanceId)
        -> Result<Option<WorkflowInstance>, CoreError>;

    /// Find an instance by its business key
    async fn find_by_correlation(
        &self,
        workflow_type: &WorkflowType,
        correlation_id: &CorrelationId,
    ) -> Result<Option<WorkflowInstance>, CoreError>;

    /// Fire `trigger` on an instance and append the matching history entry atomically.
    ///
    /// Fails with [`CoreError::NotFound`] for an unknown instance and
    /// [`CoreError::InvalidTransition`] when no transition matches; neither mutates.
    async fn apply_transition(
        &self,
        id: WorkflowInstanceId,
        definition: &WorkflowDefinition,
        trigger: &str,
        actor: Option<String>,
    ) -> Result<WorkflowInstance, CoreError>;

    /// Insert or overwrite a variable on an instance
    async fn set_variable(
        &self,
        id: WorkflowInstanceId,
        name: &str,
        value: serde_json::Value,
    ) -> Result<WorkflowVariable, CoreError>;

    /// History of an instance, oldest first; `None` if the instance does not exist
    async fn history(&self, id: WorkflowInstanceId)
        -> Result<Option<Vec<HistoryEntry>>, CoreError>;

    /// Variables of an instance ordered by name; `None` if the instance does not exist
    async fn variables(
        &self,
        id: WorkflowInstanceId,
    ) -> Result<Option<Vec<WorkflowVariable>>, CoreError>;

    /// Filter, order by ID ascending and paginate instances
    async fn search(
        &self,
        filter: &WorkflowSearchFilter,
        page: &PageRequest,
    ) -> Result<Page<WorkflowInstance>, CoreError>;
}
