// SPDX-License-Identifier: MIT

//! Condition evaluation for decision nodes and notes
//!
//! Conditions are small expressions over patient inputs, like:
//! - `bp >= 180`
//! - `ethnicity === 'black african' && age < 55`
//! - `!(papilloedema || retinal_haemorrhage)`
//!
//! They are tokenized and parsed into an AST, never executed as code.

mod ast;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{ArithmeticOp, CompareOp, Expression, Literal};
pub use evaluator::{condition_holds, evaluate, evaluate_condition};
pub use parser::{parse, MAX_DEPTH, MAX_TOKENS};
