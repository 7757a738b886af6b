// SPDX-License-Identifier: MIT

//! Clinical guideline decision engine
//!
//! Loads guideline documents, walks legacy decision trees to a single
//! recommended action for a set of patient inputs, and explains paths
//! reported for graph/rules guidelines.

pub mod config;
pub mod engine;
pub mod error;
pub mod guideline;
pub mod server;

pub use engine::{evaluate, summarize_inputs, DecisionEngine, DecisionResult, PatientInputs};
pub use error::{ConditionError, DocumentError, EngineError, GuidelineError};
pub use guideline::{Guideline, GuidelineDocument, GuidelineFormat};
