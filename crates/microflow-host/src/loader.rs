//! Workflow definition loading from YAML.
//!
//! A definitions document lists workflows under a top-level `workflows` key:
//!
//! ```yaml
//! workflows:
//!   - type: Order
//!     title: Order processing
//!     initial_state: New
//!     states: [New, Paid, Shipped]
//!     transitions:
//!       - { from: New, trigger: pay, to: Paid }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use microflow_core::{DefinitionRegistry, WorkflowDefinition};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{HostError, HostResult};

/// Top level of a definitions document
#[derive(Debug, Default, Deserialize)]
struct DefinitionsDocument {
    #[serde(default)]
    workflows: Vec<WorkflowDefinition>,
}

/// Parse a YAML string into workflow definitions.
///
/// Only the document shape is checked here; state-machine validation happens on
/// registration.
pub fn parse_definitions(yaml_str: &str) -> Result<Vec<WorkflowDefinition>, serde_yaml::Error> {
    let document: DefinitionsDocument = serde_yaml::from_str(yaml_str)?;
    Ok(document.workflows)
}

/// Read definitions from a file, or from every `*.yaml`/`*.yml` file of a directory in
/// file name order.
pub fn load_definitions(path: &Path) -> HostResult<Vec<WorkflowDefinition>> {
    let files = if path.is_dir() {
        definition_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut definitions = Vec::new();
    for file in files {
        let yaml = fs::read_to_string(&file).map_err(|e| HostError::io(&file, e))?;
        let parsed = parse_definitions(&yaml).map_err(|e| HostError::yaml(&file, e))?;
        debug!(file = %file.display(), count = parsed.len(), "Parsed definitions file");
        definitions.extend(parsed);
    }

    Ok(definitions)
}

/// Load definitions from `path` into `registry`, stopping at the first rejected one.
///
/// Returns the number of registered definitions.
pub fn register_definitions(registry: &DefinitionRegistry, path: &Path) -> HostResult<usize> {
    let definitions = load_definitions(path)?;
    let count = definitions.len();

    for definition in definitions {
        registry.register(definition)?;
    }

    info!(path = %path.display(), count, "Workflow definitions loaded");
    Ok(count)
}

fn definition_files(dir: &Path) -> HostResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| HostError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| HostError::io(dir, e))?.path();
        if path.is_file() && is_yaml(&path) {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use microflow_core::{CoreError, Transition, WorkflowType};
    use pretty_assertions::assert_eq;

    const ORDER_YAML: &str = r#"
workflows:
  - type: Order
    title: Order processing
    description: Customer orders from checkout to delivery
    route: /orders
    initial_state: New
    states: [New, Paid, Shipped]
    transitions:
      - { from: New, trigger: pay, to: Paid }
      - { from: Paid, trigger: ship, to: Shipped }
"#;

    #[test]
    fn test_parse_document() {
        let definitions = parse_definitions(ORDER_YAML).unwrap();
        assert_eq!(definitions.len(), 1);

        let order = &definitions[0];
        assert_eq!(order.workflow_type, WorkflowType::new("Order"));
        assert_eq!(order.title, "Order processing");
        assert_eq!(order.route.as_deref(), Some("/orders"));
        assert_eq!(order.states, vec!["New", "Paid", "Shipped"]);
        assert_eq!(
            order.transitions,
            vec![
                Transition::new("New", "pay", "Paid"),
                Transition::new("Paid", "ship", "Shipped"),
            ]
        );
    }

    #[test]
    fn test_optional_fields() {
        let yaml = r#"
workflows:
  - type: Ticket
    initial_state: Open
    states: [Open]
"#;
        let definitions = parse_definitions(yaml).unwrap();
        assert_eq!(definitions[0].title, "");
        assert!(definitions[0].description.is_none());
        assert!(definitions[0].transitions.is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_definitions("workflows: []").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_yaml_syntax() {
        let yaml = r#"
workflows:
  - type: Order
    states: [New
"#;
        assert!(parse_definitions(yaml).is_err());
    }

    #[test]
    fn test_malformed_definition_rejected_on_register() {
        let yaml = r#"
workflows:
  - type: Order
    initial_state: Missing
    states: [New]
"#;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("order.yaml");
        fs::write(&file, yaml).unwrap();

        let registry = DefinitionRegistry::new();
        let err = register_definitions(&registry, &file).unwrap_err();
        assert!(matches!(err, HostError::Core(CoreError::ValidationError(_))));
    }
}
