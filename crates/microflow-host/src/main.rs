use anyhow::{Context, Result};
use microflow_core::WorkflowType;
use microflow_host::HostConfig;

/// Boot the engine and print the registered definitions.
///
/// With a workflow type as first argument, print that type's DOT graph instead.
#[tokio::main]
async fn main() -> Result<()> {
    // Installed before the configuration loads, which logs
    microflow_host::init_logging(&HostConfig::log_filter_from_env());

    // Load configuration from environment variables
    let config = HostConfig::load().context("Failed to load configuration")?;

    let engine = microflow_host::bootstrap(&config).context("Failed to start workflow engine")?;

    match std::env::args().nth(1) {
        Some(workflow_type) => {
            let dot = engine
                .render_graph(&WorkflowType::new(workflow_type.as_str()))
                .with_context(|| format!("Failed to render workflow {}", workflow_type))?;
            print!("{}", dot);
        }
        None => {
            for summary in engine.list_definitions().context("Failed to list definitions")? {
                println!("{}\t{}", summary.workflow_type, summary.title);
            }
        }
    }

    Ok(())
}
