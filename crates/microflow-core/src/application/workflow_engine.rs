use crate::{
    domain::definition_registry::DefinitionRegistry,
    domain::graph::GraphRenderer,
    domain::history::HistoryEntry,
    domain::query::{Page, PageRequest, WorkflowSearchFilter, DEFAULT_PAGE_SIZE},
    domain::repository::WorkflowInstanceRepository,
    domain::variables::WorkflowVariable,
    domain::workflow_definition::{WorkflowDefinition, WorkflowDefinitionSummary, WorkflowType},
    domain::workflow_instance::{CorrelationId, WorkflowInstance, WorkflowInstanceId},
    CoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest page size accepted when none is configured
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 500;

/// Tunables of the engine facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Page size used when a caller does not name one
    pub default_page_size: u32,

    /// Largest page size a caller may request
    pub max_page_size: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Command: start a new workflow instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartWorkflow {
    /// Definition to instantiate
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,

    /// Business key, unique per type
    pub correlation_id: CorrelationId,

    /// Initial assignee
    #[serde(default)]
    pub assignee: Option<String>,

    /// User starting the workflow
    #[serde(default)]
    pub actor: Option<String>,
}

impl StartWorkflow {
    /// Start `workflow_type` for `correlation_id`
    pub fn new(workflow_type: impl Into<String>, correlation_id: impl Into<CorrelationId>) -> Self {
        Self {
            workflow_type: WorkflowType::new(workflow_type),
            correlation_id: correlation_id.into(),
            assignee: None,
            actor: None,
        }
    }

    /// Set the initial assignee
    pub fn assigned_to(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Record who started the workflow
    pub fn by(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

/// Facade binding the query and command operations to the registry, the instance
/// store and the graph renderer. Authorization-agnostic; callers gate access.
#[derive(Clone)]
pub struct WorkflowEngine {
    registry: Arc<DefinitionRegistry>,
    instances: Arc<dyn WorkflowInstanceRepository>,
    settings: EngineSettings,
}

impl WorkflowEngine {
    /// Create an engine with default settings
    pub fn new(
        registry: Arc<DefinitionRegistry>,
        instances: Arc<dyn WorkflowInstanceRepository>,
    ) -> Self {
        Self {
            registry,
            instances,
            settings: EngineSettings::default(),
        }
    }

    /// Replace the settings
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Engine settings
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Definition registry
    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    /// Build a page request, filling in the configured default size
    pub fn page_request(&self, page_index: Option<u32>, page_size: Option<u32>) -> PageRequest {
        PageRequest::new(
            page_index.unwrap_or(0),
            page_size.unwrap_or(self.settings.default_page_size),
        )
    }

    // ---- queries ----

    /// List instances matching `filter`, ordered by ID
    pub async fn list_instances(
        &self,
        filter: &WorkflowSearchFilter,
        page: &PageRequest,
    ) -> Result<Page<WorkflowInstance>, CoreError> {
        page.validate()?;
        if page.page_size > self.settings.max_page_size {
            return Err(CoreError::ValidationError(format!(
                "Page size {} exceeds the maximum of {}",
                page.page_size, self.settings.max_page_size
            )));
        }

        let result = self.instances.search(filter, page).await?;
        debug!(
            total_count = result.total_count,
            page_index = page.page_index,
            page_size = page.page_size,
            "Listed workflow instances"
        );
        Ok(result)
    }

    /// Get an instance by ID
    pub async fn get_instance(&self, id: WorkflowInstanceId) -> Result<WorkflowInstance, CoreError> {
        self.instances
            .find_by_id(id)
            .await?
            .ok_or_else(|| instance_not_found(id))
    }

    /// History of an instance, oldest first
    pub async fn get_history(&self, id: WorkflowInstanceId) -> Result<Vec<HistoryEntry>, CoreError> {
        self.instances
            .history(id)
            .await?
            .ok_or_else(|| instance_not_found(id))
    }

    /// Variables of an instance, ordered by name
    pub async fn get_variables(
        &self,
        id: WorkflowInstanceId,
    ) -> Result<Vec<WorkflowVariable>, CoreError> {
        self.instances
            .variables(id)
            .await?
            .ok_or_else(|| instance_not_found(id))
    }

    /// Get an instance by type and business key
    pub async fn get_instance_by_correlation(
        &self,
        workflow_type: &WorkflowType,
        correlation_id: &CorrelationId,
    ) -> Result<WorkflowInstance, CoreError> {
        self.instances
            .find_by_correlation(workflow_type, correlation_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!(
                    "Workflow instance {} with correlation id {}",
                    workflow_type, correlation_id
                ))
            })
    }

    /// Summaries of every registered definition, ordered by type
    pub fn list_definitions(&self) -> Result<Vec<WorkflowDefinitionSummary>, CoreError> {
        self.registry.summaries()
    }

    /// DOT graph of a definition
    pub fn render_graph(&self, workflow_type: &WorkflowType) -> Result<String, CoreError> {
        let definition = self.registry.get(workflow_type)?;
        Ok(GraphRenderer::render(&definition))
    }

    /// DOT graph of a definition with one instance's path and current state marked
    pub async fn render_graph_with_history(
        &self,
        workflow_type: &WorkflowType,
        correlation_id: &CorrelationId,
    ) -> Result<String, CoreError> {
        let definition = self.registry.get(workflow_type)?;
        let instance = self
            .get_instance_by_correlation(workflow_type, correlation_id)
            .await?;
        let history = self.get_history(instance.id).await?;

        Ok(GraphRenderer::render_with_history(&definition, &history))
    }

    // ---- commands ----

    /// Validate and register a definition
    pub fn register_definition(&self, definition: WorkflowDefinition) -> Result<(), CoreError> {
        self.registry.register(definition)
    }

    /// Start a new instance in its definition's initial state
    #[tracing::instrument(
        skip(self, command),
        fields(workflow_type = %command.workflow_type, correlation_id = %command.correlation_id)
    )]
    pub async fn create_instance(&self, command: StartWorkflow) -> Result<WorkflowInstance, CoreError> {
        let definition = self
            .registry
            .get(&command.workflow_type)
            .map_err(|e| match e {
                CoreError::NotFound(_) => CoreError::ValidationError(format!(
                    "Workflow type {} is not registered",
                    command.workflow_type
                )),
                other => other,
            })?;

        match self
            .instances
            .create(
                &definition,
                &command.correlation_id,
                command.assignee,
                command.actor,
            )
            .await
        {
            Ok(instance) => {
                info!(instance_id = %instance.id, state = %instance.state, "Workflow instance created");
                Ok(instance)
            }
            Err(e) => {
                warn!(error = %e, "Workflow instance not created");
                Err(e)
            }
        }
    }

    /// Fire `trigger` on an instance
    #[tracing::instrument(skip(self, actor))]
    pub async fn apply_transition(
        &self,
        id: WorkflowInstanceId,
        trigger: &str,
        actor: Option<String>,
    ) -> Result<WorkflowInstance, CoreError> {
        // The type of an instance never changes, so resolving it before the locked
        // transition is safe.
        let current = self.get_instance(id).await?;
        let definition = self.registry.get(&current.workflow_type)?;

        match self
            .instances
            .apply_transition(id, &definition, trigger, actor)
            .await
        {
            Ok(instance) => {
                info!(state = %instance.state, completed = instance.is_completed(), "Transition applied");
                Ok(instance)
            }
            Err(e) => {
                warn!(error = %e, "Transition rejected");
                Err(e)
            }
        }
    }

    /// Insert or overwrite a variable on an instance
    #[tracing::instrument(skip(self, value))]
    pub async fn set_variable(
        &self,
        id: WorkflowInstanceId,
        name: &str,
        value: serde_json::Value,
    ) -> Result<WorkflowVariable, CoreError> {
        let variable = self.instances.set_variable(id, name, value).await?;
        debug!("Variable set");
        Ok(variable)
    }
}

fn instance_not_found(id: WorkflowInstanceId) -> CoreError {
    CoreError::NotFound(format!("Workflow instance {}", id))
}
