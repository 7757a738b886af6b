// SPDX-License-Identifier: MIT

//! Typed error handling for guideline-rs
//!
//! Condition failures are recoverable and never leave the engine: the
//! decision walk treats them as `false`. Everything else aborts the
//! evaluation and reaches the caller.

use thiserror::Error;

/// Top-level error type for guideline-rs
#[derive(Debug, Error)]
pub enum GuidelineError {
    /// Guideline document could not be recognised or is incomplete
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Decision walk failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// No document in the guidelines directory carries this id
    #[error("Guideline '{id}' not found")]
    NotFound { id: String },

    /// Configuration errors (invalid env vars)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl GuidelineError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// A single condition or note expression could not be evaluated
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConditionError {
    /// Tokenizer or parser rejected the text
    #[error("Syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Expression stopped before it was complete
    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    /// Identifier with no supplied input value
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// Operator applied to operands of the wrong type
    #[error("Cannot apply '{operator}' to {left} and {right}")]
    TypeMismatch {
        operator: String,
        left: &'static str,
        right: &'static str,
    },

    /// Whole condition did not produce a boolean
    #[error("Condition evaluated to {0}, expected boolean")]
    NotBoolean(&'static str),

    /// Parentheses or unary operators nested past the ceiling
    #[error("Expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    /// More tokens than a condition may hold
    #[error("Expression longer than {limit} tokens")]
    TooLong { limit: usize },
}

impl ConditionError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Fatal errors raised while walking a legacy decision tree
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// `root` or a `then`/`else` target does not exist
    #[error("Node '{id}' not found in guideline")]
    NodeNotFound { id: String },

    /// Node breaks the branch/action completeness rule
    #[error("Node '{id}' is malformed: {reason}")]
    MalformedNode { id: String, reason: String },

    /// Traversal came back to a node already on the path
    #[error("Cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// Hop ceiling reached before a terminal action
    #[error("Traversal exceeded {limit} steps")]
    TraversalLimit { limit: usize },
}

impl EngineError {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub(crate) fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedNode {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors recognising a guideline document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Neither the graph/rules shape nor the legacy shape
    #[error("Unknown guideline format: expected `rules` and `edges`, or `inputs` and `nodes`")]
    UnknownFormat,

    /// Required top-level field missing
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Shape recognised but contents do not deserialize
    #[error("Invalid guideline structure: {0}")]
    InvalidStructure(String),
}
