//! Comparison of runtime values.
//!
//! Temporal operands are delegated to the backend's normalizer. A temporal
//! compared with anything that is not temporal is simply `false`: plain text
//! is never promoted to a date.

use std::cmp::Ordering;

use tabula_feel::CompareOp;

use crate::error::{EvalError, EvaluationErrorKind};
use crate::temporal::{TemporalNormalizer, TemporalValue};
use crate::types::Value;

/// Compare two values using the given operator.
///
/// - temporal vs temporal: normalizer ordering; incomparable pairs are `false`
/// - temporal vs anything else: `false`
/// - numbers and strings: all operators
/// - booleans, contexts, lists: `=` and `!=` only
/// - null: equal only to null, never ordered
/// - other kind mismatches: `=` is false, `!=` is true, ordering is an error
pub fn compare_values(
    left: &Value,
    right: &Value,
    op: CompareOp,
    normalizer: &TemporalNormalizer,
) -> Result<bool, EvalError> {
    if let (Some(l), Some(r)) = (as_temporal(left)?, as_temporal(right)?) {
        return Ok(normalizer
            .compare(&l, &r)
            .is_some_and(|ordering| apply(op, ordering)));
    }

    match (left, right) {
        (Value::Temporal(_) | Value::TemporalLiteral(_), _)
        | (_, Value::Temporal(_) | Value::TemporalLiteral(_)) => Ok(false),
        (Value::Number(l), Value::Number(r)) => Ok(apply(op, l.cmp(r))),
        (Value::Text(l), Value::Text(r)) => Ok(apply(op, l.cmp(r))),
        (Value::Null, Value::Null) => Ok(op == CompareOp::Eq),
        (Value::Null, _) | (_, Value::Null) => Ok(op == CompareOp::Neq),
        (Value::Bool(l), Value::Bool(r)) => equality_only(op, l == r),
        (Value::Context(l), Value::Context(r)) => equality_only(op, l == r),
        (Value::List(l), Value::List(r)) => equality_only(op, l == r),
        _ => equality_only(op, false),
    }
}

fn as_temporal(value: &Value) -> Result<Option<TemporalValue>, EvalError> {
    match value {
        Value::Temporal(t) => Ok(Some(*t)),
        Value::TemporalLiteral(lit) => lit.resolve().map(Some),
        _ => Ok(None),
    }
}

fn equality_only(op: CompareOp, equal: bool) -> Result<bool, EvalError> {
    match op {
        CompareOp::Eq => Ok(equal),
        CompareOp::Neq => Ok(!equal),
        _ => Err(EvalError::evaluation(
            EvaluationErrorKind::TypeMismatch,
            op.symbol(),
        )),
    }
}

fn apply(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Neq => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
    }
}
