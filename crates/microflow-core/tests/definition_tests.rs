use std::sync::Arc;

use microflow_core::{
    CoreError, DefinitionRegistry, ErrorKind, GraphRenderer, Transition, WorkflowDefinition,
    WorkflowType,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn holiday_definition() -> WorkflowDefinition {
    WorkflowDefinition::new(
        "Holiday",
        ["Requested", "Approved", "Rejected"],
        "Requested",
        [
            Transition::new("Requested", "approve", "Approved"),
            Transition::new("Requested", "reject", "Rejected"),
        ],
    )
    .with_title("Holiday request")
    .with_route("/holidays")
}

#[test]
fn test_definition_from_json() {
    let definition: WorkflowDefinition = serde_json::from_value(json!({
        "type": "Holiday",
        "title": "Holiday request",
        "route": "/holidays",
        "states": ["Requested", "Approved", "Rejected"],
        "initial_state": "Requested",
        "transitions": [
            { "from": "Requested", "trigger": "approve", "to": "Approved" },
            { "from": "Requested", "trigger": "reject", "to": "Rejected" }
        ]
    }))
    .unwrap();

    assert_eq!(definition, holiday_definition());
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(DefinitionRegistry::new());
    registry.register(holiday_definition()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                registry
                    .get(&WorkflowType::new("Holiday"))
                    .map(|definition| definition.title.clone())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "Holiday request");
    }
}

#[test]
fn test_nondeterministic_definition_rejected() {
    let registry = DefinitionRegistry::new();
    let definition = WorkflowDefinition::new(
        "Holiday",
        ["Requested", "Approved", "Rejected"],
        "Requested",
        [
            Transition::new("Requested", "decide", "Approved"),
            Transition::new("Requested", "decide", "Rejected"),
        ],
    );

    let err = registry.register(definition).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_terminal_states() {
    let definition = holiday_definition();
    assert!(!definition.is_terminal("Requested"));
    assert!(definition.is_terminal("Approved"));
    assert!(definition.is_terminal("Rejected"));
}

#[test]
fn test_render_registered_definition() {
    let registry = DefinitionRegistry::new();
    registry.register(holiday_definition()).unwrap();

    let definition = registry.get(&WorkflowType::new("Holiday")).unwrap();
    let expected = "\
digraph \"Holiday\" {
  rankdir=LR;
  \"Requested\" [shape=doublecircle];
  \"Approved\" [shape=circle];
  \"Rejected\" [shape=circle];
  \"Requested\" -> \"Approved\" [label=\"approve\"];
  \"Requested\" -> \"Rejected\" [label=\"reject\"];
}
";
    assert_eq!(GraphRenderer::render(&definition), expected);
}

#[test]
fn test_render_unknown_type_is_not_found() {
    let registry = DefinitionRegistry::new();
    let err = registry.get(&WorkflowType::new("Holiday")).unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}
