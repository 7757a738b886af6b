// SPDX-License-Identifier: MIT

//! Graph/rules (NICE) guideline types
//!
//! This format is applied conversationally by an external reasoner, which
//! reports back the path of node ids it followed. Nothing here evaluates
//! the rules; the helpers only render them and explain a reported path.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A graph/rules guideline document
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NiceGuideline {
    pub guideline_id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub citation: String,
    #[serde(default)]
    pub citation_url: String,
    /// Free-text IF-THEN rules, for explanation only
    pub rules: Vec<String>,
    pub nodes: Vec<NiceGraphNode>,
    pub edges: Vec<NiceGraphEdge>,
}

/// A typed node in the guideline graph
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NiceGraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NiceNodeType,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NiceNodeType {
    Condition,
    Action,
}

/// A labeled directed edge (`yes`, `no`, `next`, ...)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NiceGraphEdge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One entry of an explained decision path
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExplanationStep {
    pub node_id: String,
    pub node_type: NiceNodeType,
    pub text: String,
    /// Label of the edge leading to the next step, if it says anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_label: Option<String>,
}

impl NiceGuideline {
    /// Rules as one block of text, separated by blank lines
    pub fn rules_text(&self) -> String {
        self.rules.join("\n\n")
    }

    /// Map a reported path onto the document's nodes and edge labels
    ///
    /// Ids unknown to the document are skipped. A `next` label carries no
    /// decision and is dropped.
    pub fn explain_path<S: AsRef<str>>(&self, path: &[S]) -> Vec<ExplanationStep> {
        let nodes: HashMap<&str, &NiceGraphNode> =
            self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut labels: HashMap<(&str, &str), &str> = HashMap::new();
        for edge in &self.edges {
            // Later edges overwrite earlier ones between the same pair
            labels.insert(
                (edge.from.as_str(), edge.to.as_str()),
                edge.label.as_deref().unwrap_or(""),
            );
        }

        let known: Vec<&NiceGraphNode> = path
            .iter()
            .filter_map(|id| nodes.get(id.as_ref()).copied())
            .collect();

        known
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let edge_label = known
                    .get(i + 1)
                    .and_then(|next| labels.get(&(node.id.as_str(), next.id.as_str())))
                    .filter(|label| !label.is_empty() && !label.eq_ignore_ascii_case("next"))
                    .map(|label| label.to_string());

                ExplanationStep {
                    node_id: node.id.clone(),
                    node_type: node.node_type,
                    text: node.text.clone(),
                    edge_label,
                }
            })
            .collect()
    }

    /// Edges whose `from` or `to` does not name a node
    pub fn dangling_edges(&self) -> Vec<&NiceGraphEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.from.as_str()) || !ids.contains(e.to.as_str()))
            .collect()
    }
}
