//! Expression evaluator backends.
//!
//! Two backends implement [`ExpressionEvaluator`]: [`LegacyEvaluator`] and
//! [`StrictEvaluator`]. They share one grammar and one interpreter and
//! differ in quoting rules, temporal policy and how bare date builtins
//! behave as unary tests. Both are stateless after construction and can be
//! shared across threads.

mod interpret;
mod legacy;
mod strict;

pub use legacy::LegacyEvaluator;
pub use strict::StrictEvaluator;

use crate::error::EvalError;
use crate::types::{Context, Value};

/// The capability a decision table needs from an expression language.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate `text` as an expression against `context`.
    fn evaluate_expression(&self, text: &str, context: &Context) -> Result<Value, EvalError>;

    /// Evaluate `text` as unary tests against the value bound to
    /// `input_name` in `context`.
    fn evaluate_unary_test(
        &self,
        text: &str,
        input_name: &str,
        context: &Context,
    ) -> Result<bool, EvalError>;
}
