/// Workflow definition domain models
pub mod workflow_definition;

/// Workflow instance domain models
pub mod workflow_instance;

/// Transition history
pub mod history;

/// Instance variables
pub mod variables;

/// Instance aggregate: state, history and variables under one owner
pub mod instance_record;

/// Registry of workflow definitions
pub mod definition_registry;

/// Search filters and pagination
pub mod query;

/// DOT graph rendering
pub mod graph;

/// Repository interfaces
pub mod repository;
