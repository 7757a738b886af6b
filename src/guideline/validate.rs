// SPDX-License-Identifier: MIT

//! Static checks for legacy guideline documents
//!
//! Validation reports problems up front; it never changes how the engine
//! evaluates a document. Errors are defects the engine would abort on (or
//! could silently mis-route on), warnings are suspicious but evaluable.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::types::{DecisionNode, Guideline, ROOT_NODE_ID};
use crate::engine::condition::{self, Expression};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found in a guideline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    MissingRoot,
    DuplicateNodeId { id: String },
    DuplicateInputId { id: String },
    InvalidInputId { id: String },
    UnknownTarget { node: String, target: String },
    IncompleteBranch { node: String, branch: &'static str },
    MissingTerminalAction { node: String },
    UnparsableCondition { node: String, condition: String, message: String },
    UndeclaredInput { node: String, name: String },
    UnreachableNode { node: String },
    Cycle { path: Vec<String> },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::UnparsableCondition { .. }
            | Issue::UndeclaredInput { .. }
            | Issue::UnreachableNode { .. }
            | Issue::Cycle { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingRoot => write!(f, "no node with id '{}'", ROOT_NODE_ID),
            Issue::DuplicateNodeId { id } => write!(f, "duplicate node id '{}'", id),
            Issue::DuplicateInputId { id } => write!(f, "duplicate input id '{}'", id),
            Issue::InvalidInputId { id } => {
                write!(f, "input id '{}' is not a valid identifier", id)
            }
            Issue::UnknownTarget { node, target } => {
                write!(f, "node '{}' points to unknown node '{}'", node, target)
            }
            Issue::IncompleteBranch { node, branch } => write!(
                f,
                "node '{}' {} branch has neither a next node nor an action",
                node, branch
            ),
            Issue::MissingTerminalAction { node } => write!(
                f,
                "node '{}' has no condition and no then_action",
                node
            ),
            Issue::UnparsableCondition {
                node,
                condition,
                message,
            } => write!(
                f,
                "node '{}' condition '{}' does not parse: {}",
                node, condition, message
            ),
            Issue::UndeclaredInput { node, name } => {
                write!(f, "node '{}' references undeclared input '{}'", node, name)
            }
            Issue::UnreachableNode { node } => write!(f, "node '{}' is unreachable", node),
            Issue::Cycle { path } => write!(f, "cycle: {}", path.join(" -> ")),
        }
    }
}

/// All issues found in a guideline, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// True when no error-level issue was found
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Warning)
    }
}

/// Check a legacy guideline for structural problems
pub fn validate(guideline: &Guideline) -> ValidationReport {
    let mut issues = Vec::new();

    let mut declared: HashSet<&str> = HashSet::new();
    for input in &guideline.inputs {
        if !declared.insert(input.id.as_str()) {
            issues.push(Issue::DuplicateInputId {
                id: input.id.clone(),
            });
        }
        if !is_identifier(&input.id) {
            issues.push(Issue::InvalidInputId {
                id: input.id.clone(),
            });
        }
    }

    let mut index: HashMap<&str, &DecisionNode> = HashMap::new();
    for node in &guideline.nodes {
        if index.contains_key(node.id.as_str()) {
            issues.push(Issue::DuplicateNodeId {
                id: node.id.clone(),
            });
        } else {
            index.insert(node.id.as_str(), node);
        }
    }

    for node in &guideline.nodes {
        check_node(node, &index, &declared, &mut issues);
    }

    if !index.contains_key(ROOT_NODE_ID) {
        issues.push(Issue::MissingRoot);
        return ValidationReport { issues };
    }

    let mut walk = Walk::new(&index);
    walk.visit(ROOT_NODE_ID);

    for node in &guideline.nodes {
        let indexed = index
            .get(node.id.as_str())
            .is_some_and(|n| std::ptr::eq(*n, node));
        if indexed && !walk.visited.contains(node.id.as_str()) {
            issues.push(Issue::UnreachableNode {
                node: node.id.clone(),
            });
        }
    }
    issues.extend(walk.cycles.into_iter().map(|path| Issue::Cycle { path }));

    ValidationReport { issues }
}

fn check_node(
    node: &DecisionNode,
    index: &HashMap<&str, &DecisionNode>,
    declared: &HashSet<&str>,
    issues: &mut Vec<Issue>,
) {
    let conditions = node
        .branch_condition()
        .into_iter()
        .chain(node.notes.iter().map(|n| n.condition.as_str()));
    for text in conditions {
        check_condition(&node.id, text, declared, issues);
    }

    if node.branch_condition().is_none() {
        if node.then_action.is_none() {
            issues.push(Issue::MissingTerminalAction {
                node: node.id.clone(),
            });
        }
        return;
    }

    for (taken, branch) in [(true, "then"), (false, "else")] {
        match node.branch(taken) {
            (_, Some(_)) => {}
            (Some(target), None) => {
                if !index.contains_key(target) {
                    issues.push(Issue::UnknownTarget {
                        node: node.id.clone(),
                        target: target.to_string(),
                    });
                }
            }
            (None, None) => issues.push(Issue::IncompleteBranch {
                node: node.id.clone(),
                branch,
            }),
        }
    }
}

fn check_condition(node: &str, text: &str, declared: &HashSet<&str>, issues: &mut Vec<Issue>) {
    match condition::parse(text) {
        Ok(expr) => {
            for name in expr.variables() {
                if !declared.contains(name) {
                    issues.push(Issue::UndeclaredInput {
                        node: node.to_string(),
                        name: name.to_string(),
                    });
                }
            }
        }
        Err(e) => issues.push(Issue::UnparsableCondition {
            node: node.to_string(),
            condition: text.to_string(),
            message: e.to_string(),
        }),
    }
}

/// An input id is usable in conditions when it parses as a bare variable
fn is_identifier(id: &str) -> bool {
    matches!(condition::parse(id), Ok(Expression::Variable(name)) if name == id)
}

/// Depth-first walk over the edges the engine can actually follow
struct Walk<'a> {
    index: &'a HashMap<&'a str, &'a DecisionNode>,
    visited: HashSet<&'a str>,
    stack: Vec<&'a str>,
    /// Position of each id in `stack`
    on_stack: HashMap<&'a str, usize>,
    cycles: Vec<Vec<String>>,
}

/// Pending targets of one node on the walk stack
struct Frame<'a> {
    targets: Vec<&'a str>,
    next: usize,
}

impl<'a> Walk<'a> {
    fn new(index: &'a HashMap<&'a str, &'a DecisionNode>) -> Self {
        Self {
            index,
            visited: HashSet::new(),
            stack: Vec::new(),
            on_stack: HashMap::new(),
            cycles: Vec::new(),
        }
    }

    fn visit(&mut self, start: &'a str) {
        let mut frames: Vec<Frame<'a>> = self.enter(start).into_iter().collect();

        while let Some(frame) = frames.last_mut() {
            let Some(next) = frame.targets.get(frame.next).copied() else {
                frames.pop();
                if let Some(id) = self.stack.pop() {
                    self.on_stack.remove(id);
                }
                continue;
            };
            frame.next += 1;

            if let Some(&pos) = self.on_stack.get(next) {
                let mut path: Vec<String> =
                    self.stack[pos..].iter().map(|s| s.to_string()).collect();
                path.push(next.to_string());
                self.cycles.push(path);
            } else if !self.visited.contains(next) {
                frames.extend(self.enter(next));
            }
        }
    }

    fn enter(&mut self, id: &'a str) -> Option<Frame<'a>> {
        let node = self.index.get(id).copied()?;
        self.visited.insert(id);
        self.on_stack.insert(id, self.stack.len());
        self.stack.push(id);
        Some(Frame {
            targets: followable(node),
            next: 0,
        })
    }
}

/// Targets of branches that do not end in an action
fn followable(node: &DecisionNode) -> Vec<&str> {
    if node.branch_condition().is_none() {
        return Vec::new();
    }
    [true, false]
        .into_iter()
        .filter_map(|taken| match node.branch(taken) {
            (Some(next), None) => Some(next),
            _ => None,
        })
        .collect()
}
