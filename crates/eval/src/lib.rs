//! tabula-eval: decision table evaluation over FEEL expressions.
//!
//! Tables come in as JSON descriptors, variables as a [`VariableContext`].
//! Each clause picks one of two expression backends, [`LegacyEvaluator`] or
//! [`StrictEvaluator`], which share a grammar but deliberately differ in how
//! they treat zoned date-times, quoting and bare date builtins. Temporal
//! inputs of any external shape are unified by a [`TemporalNormalizer`]
//! before any comparison sees them.

pub mod backend;
pub mod coerce;
pub mod compare;
pub mod config;
pub mod context;
pub mod error;
pub mod table;
pub mod temporal;
pub mod types;

pub use backend::{ExpressionEvaluator, LegacyEvaluator, StrictEvaluator};
pub use config::EngineConfig;
pub use context::ContextConverter;
pub use error::{EvalError, EvaluationErrorKind};
pub use table::{DecisionResult, DecisionTableEvaluator, OutputRow};
pub use temporal::{ExternalTemporal, TemporalNormalizer, TemporalPolicy, TemporalValue};
pub use types::{Context, DecisionTable, DeclaredType, HitPolicy, InputValue, Value, VariableContext};

/// Evaluate a JSON table descriptor against JSON variables with the default
/// engine configuration.
///
/// JSON has no temporal type, so date-time strings in `variables` stay text;
/// callers with temporal inputs build a [`VariableContext`] directly.
pub fn evaluate(
    table: &serde_json::Value,
    variables: &serde_json::Value,
) -> Result<DecisionResult, EvalError> {
    let table = DecisionTable::from_json(table)?;
    let variables = VariableContext::from_json(variables)?;
    DecisionTableEvaluator::default().evaluate(&table, &variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluate_simple_table() {
        let table = json!({
            "id": "discount",
            "inputs": [
                { "name": "customer", "type": "string" },
                { "name": "orderSize", "type": "number" }
            ],
            "outputs": [{ "name": "discount", "type": "number" }],
            "rules": [
                { "inputs": ["\"Business\"", "< 10"], "outputs": ["0.10"] },
                { "inputs": ["\"Business\"", ">= 10"], "outputs": ["0.15"] },
                { "inputs": ["\"Private\"", "-"], "outputs": ["0.05"] }
            ]
        });
        let result = evaluate(&table, &json!({ "customer": "Business", "orderSize": 12 })).unwrap();
        assert_eq!(result.to_json(), json!([{ "discount": "0.15" }]));

        let result = evaluate(&table, &json!({ "customer": "Private", "orderSize": 1 })).unwrap();
        assert_eq!(result.to_json(), json!([{ "discount": "0.05" }]));
    }

    #[test]
    fn evaluate_invalid_table() {
        let err = evaluate(&json!({ "id": "t" }), &json!({})).unwrap_err();
        assert!(matches!(err, EvalError::InvalidTable { .. }));
    }

    #[test]
    fn evaluate_rejects_non_object_variables() {
        let table = json!({
            "id": "t",
            "outputs": [{ "name": "y" }],
            "rules": [{ "inputs": [], "outputs": ["1"] }]
        });
        let err = evaluate(&table, &json!([1])).unwrap_err();
        assert_eq!(err.evaluation_kind(), Some(EvaluationErrorKind::NotAContext));
    }

    #[test]
    fn evaluate_table_without_inputs() {
        let table = json!({
            "id": "constant",
            "outputs": [{ "name": "y", "type": "string" }],
            "rules": [{ "outputs": ["42"] }]
        });
        let result = evaluate(&table, &json!({})).unwrap();
        assert_eq!(result.single_entry(), Some(&Value::from("42")));
    }
}
