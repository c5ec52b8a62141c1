/// Workflow engine facade
pub mod workflow_engine;
