//! In-memory state store for the Microflow engine
//!
//! This crate provides the in-memory implementation of the instance repository
//! defined in microflow-core. Nothing outlives the process, which suits development,
//! testing and hosts that rebuild their state on start-up.

use std::sync::Arc;

use microflow_core::WorkflowInstanceRepository;

pub mod repositories;
pub use repositories::InMemoryWorkflowInstanceRepository;

/// Provider for in-memory state store repositories
#[derive(Clone, Default)]
pub struct InMemoryStateStoreProvider {
    instances: Arc<InMemoryWorkflowInstanceRepository>,
}

impl InMemoryStateStoreProvider {
    /// Create a provider backed by an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository handle for use with the workflow engine.
    ///
    /// Every handle returned by one provider shares the same underlying store.
    pub fn create_repository(&self) -> Arc<dyn WorkflowInstanceRepository> {
        self.instances.clone()
    }

    /// Number of instances currently held
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}
