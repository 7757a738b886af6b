// SPDX-License-Identifier: MIT

//! Decision tree evaluator for legacy guidelines
//!
//! Walks from `root` to exactly one terminal action, collecting the path
//! and the notes whose conditions hold. Condition failures count as
//! `false`; document defects abort the walk.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::engine::condition;
use crate::engine::inputs::PatientInputs;
use crate::error::EngineError;
use crate::guideline::{ActionOutput, DecisionNode, Guideline, ROOT_NODE_ID};

/// Default hop ceiling for one evaluation
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecisionResult {
    pub action: ActionOutput,
    /// Visited node ids, root first
    pub path: Vec<String>,
    /// Triggered note texts in evaluation order
    pub notes: Vec<String>,
}

impl DecisionResult {
    /// Path rendered for display, e.g. `root → n2`
    pub fn path_display(&self) -> String {
        self.path.join(" → ")
    }
}

/// Engine-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum nodes visited before giving up
    pub max_steps: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Evaluator bound to one guideline, with nodes indexed by id
///
/// Holds only shared references, so one engine can serve evaluations from
/// many threads at once.
pub struct DecisionEngine<'g> {
    guideline: &'g Guideline,
    index: HashMap<&'g str, &'g DecisionNode>,
    options: EngineOptions,
}

impl<'g> DecisionEngine<'g> {
    /// Create an engine with default options
    pub fn new(guideline: &'g Guideline) -> Self {
        Self::with_options(guideline, EngineOptions::default())
    }

    pub fn with_options(guideline: &'g Guideline, options: EngineOptions) -> Self {
        let mut index = HashMap::with_capacity(guideline.nodes.len());
        for node in &guideline.nodes {
            // First occurrence wins
            index.entry(node.id.as_str()).or_insert(node);
        }

        Self {
            guideline,
            index,
            options,
        }
    }

    pub fn guideline(&self) -> &'g Guideline {
        self.guideline
    }

    fn lookup(&self, id: &str) -> Result<&'g DecisionNode, EngineError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| EngineError::not_found(id))
    }

    /// Walk the tree for one set of patient inputs
    pub fn evaluate(&self, inputs: &PatientInputs) -> Result<DecisionResult, EngineError> {
        log::debug!("Evaluating guideline '{}'", self.guideline.guideline_id);

        let result = self.walk(inputs);
        if let Err(e) = &result {
            log::error!(
                "Evaluation of guideline '{}' failed: {}",
                self.guideline.guideline_id,
                e
            );
        }
        result
    }

    fn walk(&self, inputs: &PatientInputs) -> Result<DecisionResult, EngineError> {
        let mut current = self.lookup(ROOT_NODE_ID)?;
        let mut path: Vec<String> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut notes: Vec<String> = Vec::new();

        loop {
            if path.len() >= self.options.max_steps {
                return Err(EngineError::TraversalLimit {
                    limit: self.options.max_steps,
                });
            }

            log::debug!("Visiting node: {}", current.id);
            path.push(current.id.clone());
            visited.insert(current.id.as_str());

            for note in &current.notes {
                if condition::condition_holds(&note.condition, inputs) {
                    notes.push(note.text.clone());
                }
            }

            let Some(cond) = current.branch_condition() else {
                // Unconditional node: must be terminal
                return match &current.then_action {
                    Some(action) => Ok(DecisionResult {
                        action: action.clone(),
                        path,
                        notes,
                    }),
                    None => Err(EngineError::malformed(
                        &current.id,
                        "node has neither a condition nor a then_action",
                    )),
                };
            };

            let condition_met = condition::condition_holds(cond, inputs);
            let (next, action) = current.branch(condition_met);
            let branch = if condition_met { "then" } else { "else" };

            // A terminal action wins over continued navigation
            if let Some(action) = action {
                return Ok(DecisionResult {
                    action: action.clone(),
                    path,
                    notes,
                });
            }

            let Some(next_id) = next else {
                return Err(EngineError::malformed(
                    &current.id,
                    format!("{} branch has neither a next node nor an action", branch),
                ));
            };

            let next_node = self.lookup(next_id)?;
            if visited.contains(next_node.id.as_str()) {
                path.push(next_node.id.clone());
                return Err(EngineError::CycleDetected { path });
            }
            current = next_node;
        }
    }
}

/// Evaluate a guideline with default options
pub fn evaluate(
    guideline: &Guideline,
    inputs: &PatientInputs,
) -> Result<DecisionResult, EngineError> {
    DecisionEngine::new(guideline).evaluate(inputs)
}
