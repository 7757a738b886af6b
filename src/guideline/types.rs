// SPDX-License-Identifier: MIT

//! Legacy linked-node guideline types
//!
//! A legacy guideline is a set of patient inputs plus decision nodes that
//! reference each other by id. Evaluation always starts at the node with
//! id `root`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the node every evaluation starts from
pub const ROOT_NODE_ID: &str = "root";

/// A legacy guideline document
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Guideline {
    pub guideline_id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub citation: String,
    #[serde(default)]
    pub citation_url: String,
    /// Patient data fields, in interview order
    pub inputs: Vec<GuidelineInput>,
    /// Decision nodes; order is irrelevant, lookup is by id
    pub nodes: Vec<DecisionNode>,
}

impl Guideline {
    /// Find the first node with the given id
    pub fn node(&self, id: &str) -> Option<&DecisionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find the declared input with the given id
    pub fn input(&self, id: &str) -> Option<&GuidelineInput> {
        self.inputs.iter().find(|i| i.id == id)
    }
}

/// One patient-data field a guideline asks for
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GuidelineInput {
    /// Variable name used in conditions
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Supported input types
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Number,
    Boolean,
    Text,
}

/// A terminal recommendation
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ActionOutput {
    pub level: ActionLevel,
    pub text: String,
}

impl ActionOutput {
    pub fn new(level: ActionLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Clinical urgency of an action, lowest first
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActionLevel {
    Info,
    Advice,
    Start,
    Urgent,
}

impl ActionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionLevel::Info => "info",
            ActionLevel::Advice => "advice",
            ActionLevel::Start => "start",
            ActionLevel::Urgent => "urgent",
        }
    }

    /// Headline shown above a recommendation
    pub fn heading(&self) -> String {
        match self {
            ActionLevel::Urgent => "URGENT ACTION REQUIRED".to_string(),
            ActionLevel::Info => "Info Recommendation".to_string(),
            ActionLevel::Advice => "Advice Recommendation".to_string(),
            ActionLevel::Start => "Start Recommendation".to_string(),
        }
    }
}

impl fmt::Display for ActionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note collected when its condition holds on a visited node
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConditionalNote {
    #[serde(rename = "if")]
    pub condition: String,
    pub text: String,
}

/// One vertex of the legacy decision tree
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct DecisionNode {
    pub id: String,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "then", default, skip_serializing_if = "Option::is_none")]
    pub then_node: Option<String>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub else_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then_action: Option<ActionOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub else_action: Option<ActionOutput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ConditionalNote>,
}

impl DecisionNode {
    /// Branch condition, with a blank `if` counted as absent
    pub fn branch_condition(&self) -> Option<&str> {
        non_blank(self.condition.as_deref())
    }

    /// Next-node id and terminal action for one branch
    pub fn branch(&self, taken: bool) -> (Option<&str>, Option<&ActionOutput>) {
        if taken {
            (non_blank(self.then_node.as_deref()), self.then_action.as_ref())
        } else {
            (non_blank(self.else_node.as_deref()), self.else_action.as_ref())
        }
    }

    /// Ids this node can move to, `then` first
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        [self.then_node.as_deref(), self.else_node.as_deref()]
            .into_iter()
            .filter_map(|t| non_blank(t))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_deserializes_keyword_fields() {
        let node: DecisionNode = serde_json::from_value(json!({
            "id": "root",
            "if": "bp >= 180",
            "then_action": {"level": "urgent", "text": "Treat now"},
            "else": "n2",
            "notes": [{"if": "age >= 65", "text": "Consider age-related dosing"}]
        }))
        .unwrap();

        assert_eq!(node.condition.as_deref(), Some("bp >= 180"));
        assert_eq!(node.else_node.as_deref(), Some("n2"));
        assert!(node.then_node.is_none());
        assert_eq!(
            node.then_action,
            Some(ActionOutput::new(ActionLevel::Urgent, "Treat now"))
        );
        assert_eq!(node.notes.len(), 1);
        assert_eq!(node.notes[0].condition, "age >= 65");
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let node = DecisionNode {
            id: "n2".into(),
            then_action: Some(ActionOutput::new(ActionLevel::Advice, "Routine follow-up")),
            ..Default::default()
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"id": "n2", "then_action": {"level": "advice", "text": "Routine follow-up"}})
        );
    }

    #[test]
    fn test_blank_condition_and_targets_are_absent() {
        let node = DecisionNode {
            id: "n".into(),
            condition: Some("  ".into()),
            then_node: Some("".into()),
            else_node: Some("n3".into()),
            ..Default::default()
        };
        assert!(node.branch_condition().is_none());
        assert_eq!(node.branch(true), (None, None));
        assert_eq!(node.branch(false).0, Some("n3"));
        assert_eq!(node.targets().collect::<Vec<_>>(), vec!["n3"]);
    }

    #[test]
    fn test_input_type_and_unit() {
        let input: GuidelineInput = serde_json::from_value(json!({
            "id": "bp", "label": "Blood Pressure", "type": "number", "unit": "mmHg"
        }))
        .unwrap();
        assert_eq!(input.input_type, InputType::Number);
        assert_eq!(input.unit.as_deref(), Some("mmHg"));

        let bad = serde_json::from_value::<GuidelineInput>(json!({
            "id": "x", "label": "X", "type": "date"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_action_level_ordering_and_heading() {
        assert!(ActionLevel::Info < ActionLevel::Advice);
        assert!(ActionLevel::Start < ActionLevel::Urgent);
        assert_eq!(ActionLevel::Urgent.heading(), "URGENT ACTION REQUIRED");
        assert_eq!(ActionLevel::Advice.heading(), "Advice Recommendation");
        assert_eq!(ActionLevel::Start.to_string(), "start");
    }

    #[test]
    fn test_first_node_with_id_wins() {
        let guideline = Guideline {
            guideline_id: "g".into(),
            name: "G".into(),
            version: String::new(),
            citation: String::new(),
            citation_url: String::new(),
            inputs: vec![],
            nodes: vec![
                DecisionNode {
                    id: "root".into(),
                    then_action: Some(ActionOutput::new(ActionLevel::Info, "first")),
                    ..Default::default()
                },
                DecisionNode {
                    id: "root".into(),
                    then_action: Some(ActionOutput::new(ActionLevel::Info, "second")),
                    ..Default::default()
                },
            ],
        };
        let node = guideline.node("root").unwrap();
        assert_eq!(node.then_action.as_ref().unwrap().text, "first");
        assert!(guideline.node("missing").is_none());
    }
}
