//!
//! Microflow Host - process bootstrap for the Microflow engine
//!
//! Loads configuration from the environment, initialises logging, registers the
//! workflow definitions found on disk and wires the engine to its state store.

use std::sync::Arc;

use microflow_core::{DefinitionRegistry, WorkflowEngine};
use microflow_state_inmemory::InMemoryStateStoreProvider;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Definition loading module
pub mod loader;

// Re-export key types
pub use config::HostConfig;
pub use error::{HostError, HostResult};
pub use loader::{load_definitions, parse_definitions, register_definitions};

/// Build a ready-to-use engine from configuration
pub fn bootstrap(config: &HostConfig) -> HostResult<WorkflowEngine> {
    config.validate()?;

    let registry = Arc::new(DefinitionRegistry::new());
    if let Some(path) = &config.definitions_path {
        register_definitions(&registry, path)?;
    } else {
        tracing::warn!("No MICROFLOW_DEFINITIONS_PATH provided - engine starts without definitions");
    }

    let store = InMemoryStateStoreProvider::new();
    let engine = WorkflowEngine::new(registry, store.create_repository())
        .with_settings(config.engine_settings());

    let definitions = engine.registry().len()?;
    tracing::info!(definitions, "Workflow engine ready");
    Ok(engine)
}

/// Initialize logging with `log_filter` as fallback for RUST_LOG
pub fn init_logging(log_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
