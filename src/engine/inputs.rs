// SPDX-License-Identifier: MIT

//! Patient input values supplied for one evaluation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single typed value, also the result type of expression evaluation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl InputValue {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            InputValue::Boolean(_) => "boolean",
            InputValue::Number(_) => "number",
            InputValue::Text(_) => "text",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InputValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InputValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, InputValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Boolean(b) => write!(f, "{}", b),
            InputValue::Number(n) => write!(f, "{}", n),
            InputValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for InputValue {
    fn from(n: f64) -> Self {
        InputValue::Number(n)
    }
}

impl From<i64> for InputValue {
    fn from(n: i64) -> Self {
        InputValue::Number(n as f64)
    }
}

impl From<i32> for InputValue {
    fn from(n: i32) -> Self {
        InputValue::Number(f64::from(n))
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        InputValue::Boolean(b)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Text(s)
    }
}

/// Input id to value mapping for one patient
///
/// Values that are `null` or empty text count as not yet supplied and are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(
    from = "HashMap<String, Option<InputValue>>",
    into = "HashMap<String, InputValue>"
)]
pub struct PatientInputs {
    values: HashMap<String, InputValue>,
}

impl PatientInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; empty text removes the entry instead
    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<InputValue>) {
        let id = id.into();
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&id);
        } else {
            self.values.insert(id, value);
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, id: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(id, value);
        self
    }

    pub fn get(&self, id: &str) -> Option<&InputValue> {
        self.values.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<InputValue> {
        self.values.remove(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<HashMap<String, Option<InputValue>>> for PatientInputs {
    fn from(raw: HashMap<String, Option<InputValue>>) -> Self {
        let mut inputs = PatientInputs::new();
        for (id, value) in raw {
            if let Some(value) = value {
                inputs.insert(id, value);
            }
        }
        inputs
    }
}

impl From<PatientInputs> for HashMap<String, InputValue> {
    fn from(inputs: PatientInputs) -> Self {
        inputs.values
    }
}
