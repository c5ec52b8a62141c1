//!
//! Microflow Core - Workflow instance engine
//!
//! This crate owns workflow definitions (state machines), workflow instances with
//! their transition history and variables, filtered paginated search, and DOT
//! rendering of state graphs. Storage is pluggable through
//! [`WorkflowInstanceRepository`]; transports consume [`WorkflowEngine`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - core business models, entities, and rules
pub mod domain;

/// Application services - the engine facade
pub mod application;

/// Error types
pub mod error;

// Re-export key types
pub use error::{CoreError, ErrorKind};

pub use application::workflow_engine::{
    EngineSettings, StartWorkflow, WorkflowEngine, DEFAULT_MAX_PAGE_SIZE,
};
pub use domain::definition_registry::DefinitionRegistry;
pub use domain::graph::GraphRenderer;
pub use domain::history::{HistoryEntry, HistoryLog, CREATE_TRIGGER};
pub use domain::instance_record::InstanceRecord;
pub use domain::query::{Page, PageRequest, WorkflowSearchFilter, DEFAULT_PAGE_SIZE};
pub use domain::repository::WorkflowInstanceRepository;
pub use domain::variables::{VariableStore, WorkflowVariable};
pub use domain::workflow_definition::{
    Transition, WorkflowDefinition, WorkflowDefinitionSummary, WorkflowType,
};
pub use domain::workflow_instance::{CorrelationId, WorkflowInstance, WorkflowInstanceId};
