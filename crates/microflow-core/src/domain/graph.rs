//! Graphviz DOT rendering of workflow definitions.
//!
//! Output is deterministic: nodes follow the definition's state order and edges its
//! transition order, so equal inputs always produce byte-identical strings.

use crate::domain::history::HistoryEntry;
use crate::domain::workflow_definition::{Transition, WorkflowDefinition};
use std::collections::HashSet;

const INITIAL_SHAPE: &str = "doublecircle";
const STATE_SHAPE: &str = "circle";
const CURRENT_FILL: &str = "lightblue";
const VISITED_COLOR: &str = "green";

/// Renders state graphs as DOT strings
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphRenderer;

/// Execution overlay drawn on top of a definition graph
struct Overlay<'a> {
    visited: HashSet<(&'a str, &'a str, &'a str)>,
    current: Option<&'a str>,
}

impl GraphRenderer {
    /// Render the state graph of a definition
    pub fn render(definition: &WorkflowDefinition) -> String {
        write_graph(definition, None)
    }

    /// Render the state graph with an instance's history overlaid.
    ///
    /// Every transition traversed at least once is marked visited, and the state named by
    /// the last history entry is marked current.
    pub fn render_with_history(definition: &WorkflowDefinition, history: &[HistoryEntry]) -> String {
        let visited = history
            .iter()
            .filter_map(|entry| {
                entry
                    .from_state
                    .as_deref()
                    .map(|from| (from, entry.trigger.as_str(), entry.to_state.as_str()))
            })
            .collect();

        let overlay = Overlay {
            visited,
            current: history.last().map(|entry| entry.to_state.as_str()),
        };

        write_graph(definition, Some(&overlay))
    }
}

fn write_graph(definition: &WorkflowDefinition, overlay: Option<&Overlay<'_>>) -> String {
    let mut out = String::with_capacity(64 + 48 * (definition.states.len() + definition.transitions.len()));

    out.push_str(&format!("digraph {} {{\n", quote(definition.workflow_type.as_str())));
    out.push_str("  rankdir=LR;\n");

    for state in &definition.states {
        let shape = if *state == definition.initial_state {
            INITIAL_SHAPE
        } else {
            STATE_SHAPE
        };
        let mut attributes = vec![format!("shape={}", shape)];
        if overlay.and_then(|o| o.current) == Some(state.as_str()) {
            attributes.push("style=filled".to_string());
            attributes.push(format!("fillcolor={}", quote(CURRENT_FILL)));
        }
        out.push_str(&format!("  {} [{}];\n", quote(state), attributes.join(", ")));
    }

    for transition in &definition.transitions {
        let mut attributes = vec![format!("label={}", quote(&transition.trigger))];
        if overlay.is_some_and(|o| was_visited(o, transition)) {
            attributes.push(format!("color={}", quote(VISITED_COLOR)));
            attributes.push("penwidth=2".to_string());
        }
        out.push_str(&format!(
            "  {} -> {} [{}];\n",
            quote(&transition.from),
            quote(&transition.to),
            attributes.join(", ")
        ));
    }

    out.push_str("}\n");
    out
}

fn was_visited(overlay: &Overlay<'_>, transition: &Transition) -> bool {
    overlay.visited.contains(&(
        transition.from.as_str(),
        transition.trigger.as_str(),
        transition.to.as_str(),
    ))
}

/// Quote a DOT identifier, escaping backslashes and double quotes
fn quote(id: &str) -> String {
    let mut quoted = String::with_capacity(id.len() + 2);
    quoted.push('"');
    for c in id.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
