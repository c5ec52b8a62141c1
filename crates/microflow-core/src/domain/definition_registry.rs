use crate::domain::workflow_definition::{
    WorkflowDefinition, WorkflowDefinitionSummary, WorkflowType,
};
use crate::CoreError;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Registry of known workflow definitions, keyed by type name.
///
/// Built at start-up and read on every request afterwards. Definitions are validated on
/// registration and immutable once registered.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: RwLock<BTreeMap<WorkflowType, Arc<WorkflowDefinition>>>,
}

impl DefinitionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a definition.
    ///
    /// A definition without a title gets its type name as title.
    pub fn register(&self, mut definition: WorkflowDefinition) -> Result<(), CoreError> {
        definition.validate()?;
        if definition.title.trim().is_empty() {
            definition.title = definition.workflow_type.0.clone();
        }

        let mut definitions = self.definitions.write()?;
        if definitions.contains_key(&definition.workflow_type) {
            tracing::warn!(
                workflow_type = %definition.workflow_type,
                "Rejected duplicate workflow definition"
            );
            return Err(CoreError::ConflictError(format!(
                "Workflow type {} is already registered",
                definition.workflow_type
            )));
        }

        tracing::info!(
            workflow_type = %definition.workflow_type,
            states = definition.states.len(),
            transitions = definition.transitions.len(),
            "Workflow definition registered"
        );
        definitions.insert(definition.workflow_type.clone(), Arc::new(definition));

        Ok(())
    }

    /// Get a definition by type
    pub fn get(&self, workflow_type: &WorkflowType) -> Result<Arc<WorkflowDefinition>, CoreError> {
        let definitions = self.definitions.read()?;
        definitions
            .get(workflow_type)
            .cloned()
            .ok_or_else(|| {
                CoreError::NotFound(format!("Workflow definition {}", workflow_type))
            })
    }

    /// All definitions, ordered by type name
    pub fn list(&self) -> Result<Vec<Arc<WorkflowDefinition>>, CoreError> {
        let definitions = self.definitions.read()?;
        Ok(definitions.values().cloned().collect())
    }

    /// Listing view of all definitions, ordered by type name
    pub fn summaries(&self) -> Result<Vec<WorkflowDefinitionSummary>, CoreError> {
        let definitions = self.definitions.read()?;
        Ok(definitions.values().map(|d| d.summary()).collect())
    }

    /// Number of registered definitions
    pub fn len(&self) -> Result<usize, CoreError> {
        Ok(self.definitions.read()?.len())
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.definitions.read()?.is_empty())
    }

    /// Poison the lock by panicking while holding it
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = self.definitions.write();
                    panic!("registry writer panicked");
                })
                .join();
        });
    }
}
