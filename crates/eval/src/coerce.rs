//! Declared-type coercion for clause values.
//!
//! Output entries are coerced after a rule matches; input expression values
//! are coerced before the unary tests run.

use rust_decimal::Decimal;

use crate::error::EvalError;
use crate::types::{DeclaredType, Value};

/// Coerce an output entry's value to its clause's declared type.
pub fn coerce_output(
    clause: &str,
    declared: DeclaredType,
    value: Value,
) -> Result<Value, EvalError> {
    match (declared, value) {
        (DeclaredType::Any, value) | (_, value @ Value::Null) => Ok(value),

        (DeclaredType::Date, value @ Value::Temporal(_)) => Ok(value),
        (DeclaredType::Date, Value::TemporalLiteral(lit)) => Ok(Value::Temporal(lit.resolve()?)),

        (DeclaredType::String, value @ Value::Text(_)) => Ok(value),
        (DeclaredType::String, Value::Number(n)) => Ok(Value::Text(n.normalize().to_string())),
        (DeclaredType::String, Value::Bool(b)) => Ok(Value::Text(b.to_string())),

        (DeclaredType::Boolean, value @ Value::Bool(_)) => Ok(value),
        (DeclaredType::Boolean, Value::Text(text)) => match text.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch(clause, declared, "string")),
        },

        (DeclaredType::Number, value @ Value::Number(_)) => Ok(value),
        (DeclaredType::Number, Value::Text(text)) => match text.trim().parse::<Decimal>() {
            Ok(n) => Ok(Value::Number(n)),
            Err(_) => Err(mismatch(clause, declared, "string")),
        },

        (declared, value) => Err(mismatch(clause, declared, value.type_name())),
    }
}

/// Coerce an input expression's value. Date inputs are never promoted from
/// text: anything that is not already temporal passes through unchanged and
/// simply fails to match date tests.
pub fn coerce_input(
    clause: &str,
    declared: DeclaredType,
    value: Value,
) -> Result<Value, EvalError> {
    match (declared, value) {
        (DeclaredType::Date, Value::TemporalLiteral(lit)) => Ok(Value::Temporal(lit.resolve()?)),
        (DeclaredType::Date, value) => Ok(value),
        (declared, value) => coerce_output(clause, declared, value),
    }
}

fn mismatch(clause: &str, declared: DeclaredType, actual_kind: &str) -> EvalError {
    EvalError::TypeCoercion {
        clause: clause.to_string(),
        declared_type: declared,
        actual_kind: actual_kind.to_string(),
    }
}
