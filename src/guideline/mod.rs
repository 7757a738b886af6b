// SPDX-License-Identifier: MIT

//! Guideline document model
//!
//! Two shapes coexist: the legacy linked-node tree evaluated by the
//! engine, and the graph/rules (NICE) format that is only displayed and
//! explained.

pub mod document;
pub mod loader;
pub mod nice;
pub mod types;
pub mod validate;

pub use document::{detect_format, GuidelineDocument, GuidelineFormat};
pub use loader::GuidelineLoader;
pub use nice::{ExplanationStep, NiceGraphEdge, NiceGraphNode, NiceGuideline, NiceNodeType};
pub use types::{
    ActionLevel, ActionOutput, ConditionalNote, DecisionNode, Guideline, GuidelineInput,
    InputType, ROOT_NODE_ID,
};
pub use validate::{validate, Issue, Severity, ValidationReport};
