//! The legacy backend.
//!
//! Projects zoned instants into the platform zone and drops the zone, so
//! every date-time it sees is naive. Accepts single-quoted strings and
//! hands date builtins back as [`TemporalLiteral`](crate::types::TemporalLiteral)s.

use time::UtcOffset;

use super::interpret::{self, Dialect};
use super::ExpressionEvaluator;
use crate::error::EvalError;
use crate::temporal::TemporalNormalizer;
use crate::types::{Context, Value};

const DIALECT: Dialect = Dialect {
    name: "legacy",
    single_quoted_strings: true,
    defer_temporal_literals: true,
    bare_temporal_call_matches: true,
};

#[derive(Debug, Clone)]
pub struct LegacyEvaluator {
    normalizer: TemporalNormalizer,
}

impl LegacyEvaluator {
    /// `zone` is the platform zone instants are projected into.
    pub fn new(zone: UtcOffset) -> Self {
        LegacyEvaluator {
            normalizer: TemporalNormalizer::legacy(zone),
        }
    }

    pub fn normalizer(&self) -> &TemporalNormalizer {
        &self.normalizer
    }
}

impl Default for LegacyEvaluator {
    fn default() -> Self {
        LegacyEvaluator::new(UtcOffset::UTC)
    }
}

impl ExpressionEvaluator for LegacyEvaluator {
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
