use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::debug;

use microflow_core::{
    CorrelationId, CoreError, HistoryEntry, InstanceRecord, Page, PageRequest,
    WorkflowDefinition, WorkflowInstance, WorkflowInstanceId, WorkflowInstanceRepository,
    WorkflowSearchFilter, WorkflowType, WorkflowVariable,
};

/// One instance behind its own lock; writers to different instances never contend
type SharedRecord = Arc<RwLock<InstanceRecord>>;

/// Composite business key
type CorrelationKey = (WorkflowType, CorrelationId);

/// In-memory implementation of the WorkflowInstanceRepository.
///
/// Records live in a concurrent map keyed by instance ID, each guarded by a
/// read/write lock, so readers never block each other and writes serialise per
/// instance only. A second map indexes `(type, correlation id)` to the same record.
pub struct InMemoryWorkflowInstanceRepository {
    instances: Arc<DashMap<WorkflowInstanceId, SharedRecord>>,
    correlations: Arc<DashMap<CorrelationKey, WorkflowInstanceId>>,
    next_id: AtomicU64,
}

impl InMemoryWorkflowInstanceRepository {
    /// Create an empty repository; the first instance gets ID 1
    pub fn new() -> Self {
        Self {
            instances: Arc::new(DashMap::with_capacity(64)),
            correlations: Arc::new(DashMap::with_capacity(64)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instance has been created
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn record(&self, id: WorkflowInstanceId) -> Option<SharedRecord> {
        self.instances.get(&id).map(|entry| entry.value().clone())
    }

    fn record_or_not_found(&self, id: WorkflowInstanceId) -> Result<SharedRecord, CoreError> {
        self.record(id)
            .ok_or_else(|| CoreError::NotFound(format!("Workflow instance {}", id)))
    }

    fn correlated_id(
        &self,
        workflow_type: &WorkflowType,
        correlation_id: &CorrelationId,
    ) -> Option<WorkflowInstanceId> {
        self.correlations
            .get(&(workflow_type.clone(), correlation_id.clone()))
            .map(|entry| *entry.value())
    }
}

impl Default for InMemoryWorkflowInstanceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowInstanceRepository for InMemoryWorkflowInstanceRepository {
    async fn create(
        &self,
        definition: &WorkflowDefinition,
        correlation_id: &CorrelationId,
        assignee: Option<String>,
        actor: Option<String>,
    ) -> Result<WorkflowInstance, CoreError> {
        let key = (definition.workflow_type.clone(), correlation_id.clone());

        // The entry holds the index shard locked until the record is visible, which makes
        // check-and-insert on the business key a single step.
        match self.correlations.entry(key) {
            Entry::Occupied(_) => Err(CoreError::ConflictError(format!(
                "Workflow instance {} with correlation id {} already exists",
                definition.workflow_type, correlation_id
            ))),
            Entry::Vacant(slot) => {
                let id = WorkflowInstanceId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let record = InstanceRecord::start(
                    id,
                    definition,
                    correlation_id.clone(),
                    assignee,
                    actor,
                );
                let instance = record.instance().clone();

                self.instances.insert(id, Arc::new(RwLock::new(record)));
                slot.insert(id);

                debug!(instance_id = %id, "Stored workflow instance");
                Ok(instance)
            }
        }
    }

    async fn find_by_id(
        &self,
        id: WorkflowInstanceId,
    ) -> Result<Option<WorkflowInstance>, CoreError> {
        match self.record(id) {
            Some(record) => Ok(Some(record.read().await.instance().clone())),
            None => Ok(None),
        }
    }

    async fn find_by_correlation(
        &self,
        workflow_type: &WorkflowType,
        correlation_id: &CorrelationId,
    ) -> Result<Option<WorkflowInstance>, CoreError> {
        match self.correlated_id(workflow_type, correlation_id) {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn apply_transition(
        &self,
        id: WorkflowInstanceId,
        definition: &WorkflowDefinition,
        trigger: &str,
        actor: Option<String>,
    ) -> Result<WorkflowInstance, CoreError> {
        let record = self.record_or_not_found(id)?;
        let mut record = record.write().await;

        let entry = record.apply_transition(definition, trigger, actor)?;
        debug!(instance_id = %id, sequence = entry.sequence, "Appended history entry");

        Ok(record.instance().clone())
    }

    async fn set_variable(
        &self,
        id: WorkflowInstanceId,
        name: &str,
        value: serde_json::Value,
    ) -> Result<WorkflowVariable, CoreError> {
        let record = self.record_or_not_found(id)?;
        let mut record = record.write().await;
        record.set_variable(name, value)
    }

    async fn history(
        &self,
        id: WorkflowInstanceId,
    ) -> Result<Option<Vec<HistoryEntry>>, CoreError> {
        match self.record(id) {
            Some(record) => Ok(Some(record.read().await.history().entries().to_vec())),
            None => Ok(None),
        }
    }

    async fn variables(
        &self,
        id: WorkflowInstanceId,
    ) -> Result<Option<Vec<WorkflowVariable>>, CoreError> {
        match self.record(id) {
            Some(record) => Ok(Some(record.read().await.variables().list())),
            None => Ok(None),
        }
    }

    async fn search(
        &self,
        filter: &WorkflowSearchFilter,
        page: &PageRequest,
    ) -> Result<Page<WorkflowInstance>, CoreError> {
        page.validate()?;

        // A fully specified business key needs no scan
        let candidates: Vec<SharedRecord> = match (&filter.workflow_type, &filter.correlation_id) {
            (Some(workflow_type), Some(correlation_id)) => self
                .correlated_id(workflow_type, correlation_id)
                .and_then(|id| self.record(id))
                .into_iter()
                .collect(),
            _ => self
                .instances
                .iter()
                .map(|entry| entry.value().clone())
                .collect(),
        };

        let mut matches = Vec::with_capacity(candidates.len());
        for record in candidates {
            let record = record.read().await;
            if filter.matches(record.instance()) {
                matches.push(record.instance().clone());
            }
        }
        matches.sort_by_key(|instance| instance.id);

        Page::from_ordered(matches, page)
    }
}
