//! Human-readable rendering of supplied patient inputs

use crate::engine::inputs::{InputValue, PatientInputs};
use crate::guideline::{Guideline, InputType};

/// Render supplied inputs in declared order, e.g.
/// `Blood Pressure: 150 mmHg, Diabetic: Yes`
///
/// Inputs without a value are left out.
pub fn summarize_inputs(guideline: &Guideline, inputs: &PatientInputs) -> String {
    guideline
        .inputs
        .iter()
        .filter_map(|input| {
            let value = inputs.get(&input.id)?;
            if input.input_type == InputType::Boolean {
                return Some(format!("{}: {}", input.label, yes_no(value)));
            }
            Some(match &input.unit {
                Some(unit) if !unit.is_empty() => format!("{}: {} {}", input.label, value, unit),
                _ => format!("{}: {}", input.label, value),
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truthiness of a value shown as Yes/No
fn yes_no(value: &InputValue) -> &'static str {
    let truthy = match value {
        InputValue::Boolean(b) => *b,
        InputValue::Number(n) => *n != 0.0 && !n.is_nan(),
        InputValue::Text(s) => !s.is_empty(),
    };
    if truthy {
        "Yes"
    } else {
        "No"
    }
}
