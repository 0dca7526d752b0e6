//! The strict backend.
//!
//! Keeps zone offsets on instants. A naive value and a zoned value are never
//! equal and never ordered, and a bare date builtin used as a unary test
//! does not match: only `? = date and time(...)` compares.

use time::UtcOffset;

use super::interpret::{self, Dialect};
use super::ExpressionEvaluator;
use crate::error::EvalError;
use crate::temporal::TemporalNormalizer;
use crate::types::{Context, Value};

const DIALECT: Dialect = Dialect {
    name: "strict",
    single_quoted_strings: false,
    defer_temporal_literals: false,
    bare_temporal_call_matches: false,
};

#[derive(Debug, Clone)]
pub struct StrictEvaluator {
    normalizer: TemporalNormalizer,
}

impl StrictEvaluator {
    /// `zone` is attached to epoch-millisecond inputs, which carry none.
    pub fn new(zone: UtcOffset) -> Self {
        StrictEvaluator {
            normalizer: TemporalNormalizer::strict(zone),
        }
    }

    pub fn normalizer(&self) -> &TemporalNormalizer {
        &self.normalizer
    }
}

impl Default for StrictEvaluator {
    fn default() -> Self {
        StrictEvaluator::new(UtcOffset::UTC)
    }
}

impl ExpressionEvaluator for StrictEvaluator {
    fn evaluate_expression(&self, text: &str, context: &Context) -> Result<Value, EvalError> {
        interpret::evaluate_expression(&DIALECT, &self.normalizer, text, context)
    }

    fn evaluate_unary_test(
        &self,
        text: &str,
        input_name: &str,
        context: &Context,
    ) -> Result<bool, EvalError> {
        interpret::evaluate_unary_test(&DIALECT, &self.normalizer, text, input_name, context)
    }
}
