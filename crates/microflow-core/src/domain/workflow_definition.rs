use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Value object: Workflow type name, unique across registered definitions
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowType(pub String);

impl WorkflowType {
    /// Create a workflow type from anything string-like
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the type name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A legal move of the state machine: `from --trigger--> to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Source state
    pub from: String,

    /// Name of the event or command that fires the transition
    pub trigger: String,

    /// Target state
    pub to: String,
}

impl Transition {
    /// Create a transition
    pub fn new(from: impl Into<String>, trigger: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            trigger: trigger.into(),
            to: to.into(),
        }
    }
}

/// A named finite state machine describing the legal lifecycle of one class of entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Unique type name
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Description of the workflow
    #[serde(default)]
    pub description: Option<String>,

    /// Route hint for user interfaces that display instances of this type
    #[serde(default)]
    pub route: Option<String>,

    /// State names, in display order
    pub states: Vec<String>,

    /// State every new instance starts in
    pub initial_state: String,

    /// Transitions, in registration order
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Listing view of a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinitionSummary {
    /// Unique type name
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,

    /// Human-readable title
    pub title: String,

    /// Description of the workflow
    pub description: Option<String>,

    /// Route hint for user interfaces
    pub route: Option<String>,
}

impl WorkflowDefinition {
    /// Create a definition with no metadata
    pub fn new<S: Into<String>>(
        workflow_type: impl Into<String>,
        states: impl IntoIterator<Item = S>,
        initial_state: impl Into<String>,
        transitions: impl IntoIterator<Item = Transition>,
    ) -> Self {
        let workflow_type = WorkflowType::new(workflow_type);
        Self {
            title: workflow_type.0.clone(),
            workflow_type,
            description: None,
            route: None,
            states: states.into_iter().map(Into::into).collect(),
            initial_state: initial_state.into(),
            transitions: transitions.into_iter().collect(),
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the route hint
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Validate the state machine.
    ///
    /// The type name must be non-empty, states must be non-empty and unique, the initial
    /// state and every transition endpoint must be a declared state, trigger names must be
    /// non-empty and no two transitions may share a `(from, trigger)` pair.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.workflow_type.0.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Workflow type must not be empty".to_string(),
            ));
        }

        if self.states.is_empty() {
            return Err(CoreError::ValidationError(format!(
                "Workflow {} must declare at least one state",
                self.workflow_type
            )));
        }

        let mut states = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !states.insert(state.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "Workflow {} declares state {} more than once",
                    self.workflow_type, state
                )));
            }
        }

        if !states.contains(self.initial_state.as_str()) {
            return Err(CoreError::ValidationError(format!(
                "Workflow {} has initial state {} which is not a declared state",
                self.workflow_type, self.initial_state
            )));
        }

        let mut edges = HashSet::with_capacity(self.transitions.len());
        for transition in &self.transitions {
            if transition.trigger.is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "Workflow {} has a transition from {} with an empty trigger",
                    self.workflow_type, transition.from
                )));
            }

            for endpoint in [&transition.from, &transition.to] {
                if !states.contains(endpoint.as_str()) {
                    return Err(CoreError::ValidationError(format!(
                        "Workflow {} transition {} -> {} references unknown state {}",
                        self.workflow_type, transition.from, transition.to, endpoint
                    )));
                }
            }

            if !edges.insert((transition.from.as_str(), transition.trigger.as_str())) {
                return Err(CoreError::ValidationError(format!(
                    "Workflow {} has more than one transition for trigger {} from state {}",
                    self.workflow_type, transition.trigger, transition.from
                )));
            }
        }

        Ok(())
    }

    /// Check whether a state is declared
    #[inline]
    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// Find the transition fired by `trigger` in state `from`
    pub fn find_transition(&self, from: &str, trigger: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.trigger == trigger)
    }

    /// Triggers accepted in the given state, in registration order
    pub fn triggers_from<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.transitions
            .iter()
            .filter(move |t| t.from == state)
            .map(|t| t.trigger.as_str())
    }

    /// A state with no outgoing transitions ends the workflow
    #[inline]
    pub fn is_terminal(&self, state: &str) -> bool {
        !self.transitions.iter().any(|t| t.from == state)
    }

    /// Listing view of this definition
    pub fn summary(&self) -> WorkflowDefinitionSummary {
        WorkflowDefinitionSummary {
            workflow_type: self.workflow_type.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            route: self.route.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_definition() -> WorkflowDefinition {
        WorkflowDefinition::new(
            "Order",
            ["New", "Paid", "Shipped"],
            "New",
            [
                Transition::new("New", "pay", "Paid"),
                Transition::new("Paid", "ship", "Shipped"),
            ],
        )
    }

    #[test]
    fn test_valid_definition() {
        let definition = order_definition();
        assert!(definition.validate().is_ok());
        assert_eq!(definition.title, "Order");
        assert!(definition.is_terminal("Shipped"));
        assert!(!definition.is_terminal("New"));
        assert_eq!(
            definition.find_transition("New", "pay").map(|t| t.to.as_str()),
            Some("Paid")
        );
        assert!(definition.find_transition("Shipped", "pay").is_none());
        assert_eq!(definition.triggers_from("Paid").collect::<Vec<_>>(), vec!["ship"]);
    }

    #[test]
    fn test_unknown_initial_state() {
        let mut definition = order_definition();
        definition.initial_state = "Draft".to_string();

        let err = definition.validate().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(msg) if msg.contains("Draft")));
    }

    #[test]
    fn test_transition_to_unknown_state() {
        let mut definition = order_definition();
        definition
            .transitions
            .push(Transition::new("Shipped", "return", "Returned"));

        let err = definition.validate().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(msg) if msg.contains("Returned")));
    }

    #[test]
    fn test_empty_and_duplicate_states() {
        let empty = WorkflowDefinition::new("Empty", Vec::<String>::new(), "x", []);
        assert!(empty.validate().is_err());

        let duplicate = WorkflowDefinition::new("Dup", ["A", "A"], "A", []);
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_ambiguous_trigger() {
        let mut definition = order_definition();
        definition
            .transitions
            .push(Transition::new("New", "pay", "Shipped"));

        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_empty_trigger() {
        let mut definition = order_definition();
        definition.transitions.push(Transition::new("New", "", "Paid"));

        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_metadata() {
        let json = serde_json::json!({
            "type": "Holiday",
            "title": "Holiday approval",
            "route": "holiday",
            "states": ["New", "Approved"],
            "initial_state": "New",
            "transitions": [{"from": "New", "trigger": "approve", "to": "Approved"}]
        });

        let definition: WorkflowDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(definition.workflow_type, WorkflowType::new("Holiday"));
        assert_eq!(definition.summary().route.as_deref(), Some("holiday"));
        assert!(definition.description.is_none());
        assert!(definition.validate().is_ok());
    }
}
