// SPDX-License-Identifier: MIT

//! Decision engine for legacy guidelines
//!
//! - `condition` - sandboxed expression parsing and evaluation
//! - `inputs` - typed patient input values
//! - `decision` - the root-to-action tree walk
//! - `summary` - display rendering of supplied inputs

pub mod condition;
pub mod decision;
pub mod inputs;
pub mod summary;

pub use decision::{evaluate, DecisionEngine, DecisionResult, EngineOptions, DEFAULT_MAX_STEPS};
pub use inputs::{InputValue, PatientInputs};
pub use summary::summarize_inputs;
