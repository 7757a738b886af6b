//! Condition expression evaluator
//!
//! Variables resolve only against the supplied patient inputs. Equality is
//! strict: values of different types are never equal.

use super::ast::{ArithmeticOp, CompareOp, Expression, Literal};
use super::parser::parse;
use crate::engine::inputs::{InputValue, PatientInputs};
use crate::error::ConditionError;

/// Evaluate an expression to a value
pub fn evaluate(expr: &Expression, inputs: &PatientInputs) -> Result<InputValue, ConditionError> {
    match expr {
        Expression::Literal(lit) => Ok(literal_value(lit)),
        Expression::Variable(name) => inputs
            .get(name)
            .cloned()
            .ok_or_else(|| ConditionError::UnknownIdentifier(name.clone())),
        Expression::Compare { left, op, right } => {
            let l = evaluate(left, inputs)?;
            let r = evaluate(right, inputs)?;
            evaluate_compare(&l, *op, &r).map(InputValue::Boolean)
        }
        Expression::Arithmetic { left, op, right } => {
            let l = evaluate(left, inputs)?;
            let r = evaluate(right, inputs)?;
            evaluate_arithmetic(&l, *op, &r)
        }
        Expression::And(left, right) => {
            if !evaluate_bool(left, inputs, "&&")? {
                return Ok(InputValue::Boolean(false));
            }
            evaluate_bool(right, inputs, "&&").map(InputValue::Boolean)
        }
        Expression::Or(left, right) => {
            if evaluate_bool(left, inputs, "||")? {
                return Ok(InputValue::Boolean(true));
            }
            evaluate_bool(right, inputs, "||").map(InputValue::Boolean)
        }
        Expression::Not(inner) => {
            evaluate_bool(inner, inputs, "!").map(|b| InputValue::Boolean(!b))
        }
        Expression::Negate(inner) => match evaluate(inner, inputs)? {
            InputValue::Number(n) => Ok(InputValue::Number(-n)),
            other => Err(mismatch("-", &other, &other)),
        },
    }
}

/// Parse and evaluate a condition, requiring a boolean result
pub fn evaluate_condition(condition: &str, inputs: &PatientInputs) -> Result<bool, ConditionError> {
    let expr = parse(condition)?;
    match evaluate(&expr, inputs)? {
        InputValue::Boolean(b) => Ok(b),
        other => Err(ConditionError::NotBoolean(other.type_name())),
    }
}

/// Evaluate a condition, treating any failure as `false`
///
/// An unevaluable condition must never authorize an action, so errors are
/// logged and collapse to `false`.
pub fn condition_holds(condition: &str, inputs: &PatientInputs) -> bool {
    match evaluate_condition(condition, inputs) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("Failed to evaluate condition '{}': {}", condition, e);
            false
        }
    }
}

fn literal_value(lit: &Literal) -> InputValue {
    match lit {
        Literal::String(s) => InputValue::Text(s.clone()),
        Literal::Number(n) => InputValue::Number(*n),
        Literal::Boolean(b) => InputValue::Boolean(*b),
    }
}

fn evaluate_bool(
    expr: &Expression,
    inputs: &PatientInputs,
    operator: &str,
) -> Result<bool, ConditionError> {
    match evaluate(expr, inputs)? {
        InputValue::Boolean(b) => Ok(b),
        other => Err(ConditionError::TypeMismatch {
            operator: operator.to_string(),
            left: other.type_name(),
            right: "boolean",
        }),
    }
}

fn evaluate_compare(
    left: &InputValue,
    op: CompareOp,
    right: &InputValue,
) -> Result<bool, ConditionError> {
    match op {
        CompareOp::Eq => Ok(values_equal(left, right)),
        CompareOp::NotEq => Ok(!values_equal(left, right)),
        CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
            let ordering = match (left, right) {
                (InputValue::Number(a), InputValue::Number(b)) => a.partial_cmp(b),
                (InputValue::Text(a), InputValue::Text(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(&op.to_string(), left, right)),
            };
            // NaN compares false either way
            Ok(ordering.is_some_and(|o| match op {
                CompareOp::Gt => o.is_gt(),
                CompareOp::Gte => o.is_ge(),
                CompareOp::Lt => o.is_lt(),
                _ => o.is_le(),
            }))
        }
    }
}

fn values_equal(left: &InputValue, right: &InputValue) -> bool {
    match (left, right) {
        (InputValue::Number(a), InputValue::Number(b)) => a == b,
        (InputValue::Text(a), InputValue::Text(b)) => a == b,
        (InputValue::Boolean(a), InputValue::Boolean(b)) => a == b,
        _ => false,
    }
}

fn evaluate_arithmetic(
    left: &InputValue,
    op: ArithmeticOp,
    right: &InputValue,
) -> Result<InputValue, ConditionError> {
    match (left, right) {
        (InputValue::Number(a), InputValue::Number(b)) => Ok(InputValue::Number(match op {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Sub => a - b,
            ArithmeticOp::Mul => a * b,
            ArithmeticOp::Div => a / b,
        })),
        (InputValue::Text(a), InputValue::Text(b)) if op == ArithmeticOp::Add => {
            Ok(InputValue::Text(format!("{}{}", a, b)))
        }
        _ => Err(mismatch(&op.to_string(), left, right)),
    }
}

fn mismatch(operator: &str, left: &InputValue, right: &InputValue) -> ConditionError {
    ConditionError::TypeMismatch {
        operator: operator.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    }
}
