//! Structured input conversion.
//!
//! Turns loosely-typed [`InputValue`] trees into immutable [`Context`]s:
//! fields become entries, nested objects convert recursively and arrays
//! become lists. Temporal leaves go through the backend's normalizer, so a
//! date buried in an object is treated exactly like a top-level one.

use crate::error::{EvalError, EvaluationErrorKind};
use crate::temporal::TemporalNormalizer;
use crate::types::{Context, InputValue, Value, VariableContext};

#[derive(Debug, Clone, Copy)]
pub struct ContextConverter<'a> {
    normalizer: &'a TemporalNormalizer,
}

impl<'a> ContextConverter<'a> {
    pub fn new(normalizer: &'a TemporalNormalizer) -> Self {
        ContextConverter { normalizer }
    }

    pub fn to_value(&self, input: &InputValue) -> Result<Value, EvalError> {
        Ok(match input {
            InputValue::Null => Value::Null,
            InputValue::Bool(b) => Value::Bool(*b),
            InputValue::Number(d) => Value::Number(*d),
            InputValue::Text(s) => Value::Text(s.clone()),
            InputValue::Temporal(t) => Value::Temporal(self.normalizer.normalize(t)?),
            InputValue::Object(_) => Value::Context(self.to_context(input)?),
            InputValue::Array(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.to_value(item))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Convert an object. Anything else is not a context.
    pub fn to_context(&self, input: &InputValue) -> Result<Context, EvalError> {
        match input {
            InputValue::Object(fields) => fields
                .iter()
                .map(|(name, value)| Ok((name.clone(), self.to_value(value)?)))
                .collect(),
            _ => Err(EvalError::evaluation(
                EvaluationErrorKind::NotAContext,
                "<root>",
            )),
        }
    }

    /// The evaluation scope for a set of variables.
    pub fn convert_variables(&self, variables: &VariableContext) -> Result<Context, EvalError> {
        variables
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.to_value(value)?)))
            .collect()
    }
}
