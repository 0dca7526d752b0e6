//! Decision table evaluation.
//!
//! Rules are evaluated top to bottom. Input values are resolved once per
//! evaluation, then every rule's input entries are tested against them; a
//! rule matches when all of its entries match, empty entries and `-`
//! matching anything. Output entries of matching rules are evaluated and
//! coerced to their clause types. Errors are never treated as a non-match:
//! the first one aborts the whole evaluation.

use std::borrow::Cow;

use time::UtcOffset;

use crate::backend::{ExpressionEvaluator, LegacyEvaluator, StrictEvaluator};
use crate::coerce::{coerce_input, coerce_output};
use crate::config::EngineConfig;
use crate::context::ContextConverter;
use crate::error::EvalError;
use crate::temporal::TemporalNormalizer;
use crate::types::{
    Context, DecisionTable, DeclaredType, ExpressionLanguage, HitPolicy, InputClause, Rule, Value,
    VariableContext,
};

// ──────────────────────────────────────────────
// Results
// ──────────────────────────────────────────────

/// The coerced outputs of one matching rule, in output clause order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub rule_index: usize,
    pub rule_id: Option<String>,
    pub entries: Vec<(String, Value)>,
}

impl OutputRow {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// The value of a single-output row.
    pub fn single_entry(&self) -> Option<&Value> {
        match self.entries.as_slice() {
            [(_, value)] => Some(value),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for (name, value) in &self.entries {
            obj.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(obj)
    }
}

/// All rows produced by one table evaluation, in rule order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionResult {
    pub rows: Vec<OutputRow>,
}

impl DecisionResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn first_result(&self) -> Option<&OutputRow> {
        self.rows.first()
    }

    /// The only row, if exactly one rule matched.
    pub fn single_result(&self) -> Option<&OutputRow> {
        match self.rows.as_slice() {
            [row] => Some(row),
            _ => None,
        }
    }

    /// The only value of the only row.
    pub fn single_entry(&self) -> Option<&Value> {
        self.single_result().and_then(OutputRow::single_entry)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.rows.iter().map(OutputRow::to_json).collect())
    }
}

// ──────────────────────────────────────────────
// Evaluator
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Legacy,
    Strict,
}

/// Variables converted once per backend.
struct Scopes {
    legacy: Context,
    strict: Context,
}

impl Scopes {
    fn get(&self, backend: Backend) -> &Context {
        match backend {
            Backend::Legacy => &self.legacy,
            Backend::Strict => &self.strict,
        }
    }
}

/// A resolved input column: the scope its unary tests run in and the name
/// the input value is bound to there.
struct ResolvedInput<'s> {
    backend: Backend,
    scope: Cow<'s, Context>,
    name: String,
}

/// Evaluates decision tables. Holds no per-evaluation state, so one instance
/// can serve any number of concurrent evaluations.
#[derive(Debug, Clone)]
pub struct DecisionTableEvaluator {
    config: EngineConfig,
    legacy: LegacyEvaluator,
    strict: StrictEvaluator,
}

impl Default for DecisionTableEvaluator {
    fn default() -> Self {
        DecisionTableEvaluator::with_zone(EngineConfig::default(), UtcOffset::UTC)
    }
}

impl DecisionTableEvaluator {
    pub fn new(config: EngineConfig) -> Result<Self, EvalError> {
        config.validate()?;
        let zone = config.zone()?;
        Ok(DecisionTableEvaluator::with_zone(config, zone))
    }

    fn with_zone(config: EngineConfig, zone: UtcOffset) -> Self {
        DecisionTableEvaluator {
            config,
            legacy: LegacyEvaluator::new(zone),
            strict: StrictEvaluator::new(zone),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate `table` against `variables`.
    pub fn evaluate(
        &self,
        table: &DecisionTable,
        variables: &VariableContext,
    ) -> Result<DecisionResult, EvalError> {
        table.validate()?;
        tracing::debug!(
            table = %table.id,
            hit_policy = %table.hit_policy,
            rules = table.rules.len(),
            "evaluating decision table"
        );

        let input_backends = table
            .inputs
            .iter()
            .map(|clause| self.backend(clause.language.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let output_backends = table
            .outputs
            .iter()
            .map(|clause| self.backend(clause.language.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let used = |backend| input_backends.contains(&backend) || output_backends.contains(&backend);
        let scopes = Scopes {
            legacy: self.scope(Backend::Legacy, used(Backend::Legacy), variables)?,
            strict: self.scope(Backend::Strict, used(Backend::Strict), variables)?,
        };

        let inputs = table
            .inputs
            .iter()
            .zip(&input_backends)
            .map(|(clause, backend)| self.resolve_input(clause, *backend, scopes.get(*backend)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = DecisionResult::default();
        for (index, rule) in table.rules.iter().enumerate() {
            if !self.rule_matches(rule, &inputs)? {
                continue;
            }
            tracing::debug!(table = %table.id, rule = index, "rule matched");

            if table.hit_policy == HitPolicy::Unique {
                if let Some(previous) = result.first_result() {
                    return Err(EvalError::HitPolicyViolation {
                        table: table.id.clone(),
                        policy: table.hit_policy,
                        rules: vec![previous.rule_index, index],
                    });
                }
            }

            result
                .rows
                .push(self.output_row(table, index, rule, &output_backends, &scopes)?);

            if table.hit_policy == HitPolicy::First {
                break;
            }
        }

        tracing::debug!(table = %table.id, matched = result.len(), "decision table evaluated");
        Ok(result)
    }

    fn backend(&self, language: Option<&ExpressionLanguage>) -> Result<Backend, EvalError> {
        match language.unwrap_or(&self.config.default_language) {
            ExpressionLanguage::Legacy => Ok(Backend::Legacy),
            ExpressionLanguage::Strict => Ok(Backend::Strict),
            ExpressionLanguage::Other(tag) => Err(EvalError::UnsupportedFeature {
                feature: format!("expression language '{}'", tag),
            }),
        }
    }

    fn evaluator(&self, backend: Backend) -> &dyn ExpressionEvaluator {
        match backend {
            Backend::Legacy => &self.legacy,
            Backend::Strict => &self.strict,
        }
    }

    fn normalizer(&self, backend: Backend) -> &TemporalNormalizer {
        match backend {
            Backend::Legacy => self.legacy.normalizer(),
            Backend::Strict => self.strict.normalizer(),
        }
    }

    fn scope(
        &self,
        backend: Backend,
        used: bool,
        variables: &VariableContext,
    ) -> Result<Context, EvalError> {
        if !used {
            return Ok(Context::new());
        }
        ContextConverter::new(self.normalizer(backend)).convert_variables(variables)
    }

    fn resolve_input<'s>(
        &self,
        clause: &InputClause,
        backend: Backend,
        scope: &'s Context,
    ) -> Result<ResolvedInput<'s>, EvalError> {
        if let Some(expression) = clause.input_expression.as_deref() {
            let name = self.config.input_variable.clone();
            if expression.trim().is_empty() {
                // Nothing is bound, so any non-trivial entry fails to resolve
                // the input variable.
                return Ok(ResolvedInput {
                    backend,
                    scope: Cow::Borrowed(scope),
                    name,
                });
            }
            let value = self.evaluator(backend).evaluate_expression(expression, scope)?;
            let value = coerce_input(&clause.name, clause.declared_type, value)?;
            return Ok(ResolvedInput {
                backend,
                scope: Cow::Owned(scope.clone().with(name.clone(), value)),
                name,
            });
        }

        let scope = match scope.get_entry(&clause.name) {
            Some(value) if clause.declared_type != DeclaredType::Any => {
                let value = coerce_input(&clause.name, clause.declared_type, value.clone())?;
                Cow::Owned(scope.clone().with(clause.name.clone(), value))
            }
            _ => Cow::Borrowed(scope),
        };
        Ok(ResolvedInput {
            backend,
            scope,
            name: clause.name.clone(),
        })
    }

    fn rule_matches(&self, rule: &Rule, inputs: &[ResolvedInput<'_>]) -> Result<bool, EvalError> {
        for (entry, input) in rule.inputs.iter().zip(inputs) {
            let entry = entry.trim();
            if entry.is_empty() || entry == "-" {
                continue;
            }
            let matched = self.evaluator(input.backend).evaluate_unary_test(
                entry,
                &input.name,
                &input.scope,
            )?;
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn output_row(
        &self,
        table: &DecisionTable,
        index: usize,
        rule: &Rule,
        backends: &[Backend],
        scopes: &Scopes,
    ) -> Result<OutputRow, EvalError> {
        let mut entries = Vec::with_capacity(table.outputs.len());
        for ((clause, text), backend) in table.outputs.iter().zip(&rule.outputs).zip(backends) {
            let value = if text.trim().is_empty() {
                Value::Null
            } else {
                self.evaluator(*backend)
                    .evaluate_expression(text, scopes.get(*backend))?
            };
            let value = coerce_output(&clause.name, clause.declared_type, value)?;
            entries.push((clause.name.clone(), value));
        }
        Ok(OutputRow {
            rule_index: index,
            rule_id: rule.id.clone(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(v: serde_json::Value) -> DecisionTable {
        DecisionTable::from_json(&v).unwrap()
    }

    fn season_table(policy: &str) -> DecisionTable {
        table(json!({
            "id": "season",
            "hit_policy": policy,
            "inputs": [{ "name": "month", "type": "number" }],
            "outputs": [{ "name": "season", "type": "string" }],
            "rules": [
                { "inputs": ["[3..5]"], "outputs": ["\"spring\""] },
                { "inputs": ["[6..8]"], "outputs": ["\"summer\""] },
                { "inputs": ["<= 8"], "outputs": ["\"not autumn\""] },
                { "inputs": ["-"], "outputs": ["\"any\""] }
            ]
        }))
    }

    #[test]
    fn first_stops_at_the_first_match() {
        let vars = VariableContext::new().put_value("month", 7);
        let result = DecisionTableEvaluator::default()
            .evaluate(&season_table("FIRST"), &vars)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.single_entry(), Some(&Value::from("summer")));
        assert_eq!(result.rows[0].rule_index, 1);
    }

    #[test]
    fn collect_returns_every_match_in_order() {
        let vars = VariableContext::new().put_value("month", 7);
        let result = DecisionTableEvaluator::default()
            .evaluate(&season_table("COLLECT"), &vars)
            .unwrap();
        let indexes: Vec<_> = result.rows.iter().map(|r| r.rule_index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
        assert_eq!(
            result.to_json(),
            json!([
                { "season": "summer" },
                { "season": "not autumn" },
                { "season": "any" }
            ])
        );
    }

    #[test]
    fn unique_rejects_a_second_match() {
        let vars = VariableContext::new().put_value("month", 7);
        let err = DecisionTableEvaluator::default()
            .evaluate(&season_table("UNIQUE"), &vars)
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::HitPolicyViolation {
                table: "season".to_string(),
                policy: HitPolicy::Unique,
                rules: vec![1, 2],
            }
        );
    }

    #[test]
    fn no_match_is_an_empty_result() {
        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "x" }],
            "outputs": [{ "name": "y" }],
            "rules": [{ "inputs": ["> 10"], "outputs": ["1"] }]
        }));
        let vars = VariableContext::new().put_value("x", 1);
        let result = DecisionTableEvaluator::default().evaluate(&t, &vars).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.single_entry(), None);
    }

    #[test]
    fn errors_abort_instead_of_skipping_the_row() {
        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "x" }],
            "outputs": [{ "name": "y" }],
            "rules": [
                { "inputs": ["> missing"], "outputs": ["1"] },
                { "inputs": ["-"], "outputs": ["2"] }
            ]
        }));
        let vars = VariableContext::new().put_value("x", 1);
        let err = DecisionTableEvaluator::default().evaluate(&t, &vars).unwrap_err();
        assert_eq!(err, EvalError::unresolved("missing"));
    }

    #[test]
    fn empty_entries_match_and_empty_outputs_are_null() {
        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "x" }],
            "outputs": [{ "name": "y" }, { "name": "z", "type": "number" }],
            "rules": [{ "inputs": [""], "outputs": ["\"hit\"", ""] }]
        }));
        let result = DecisionTableEvaluator::default()
            .evaluate(&t, &VariableContext::new())
            .unwrap();
        let row = result.single_result().unwrap();
        assert_eq!(row.get("y"), Some(&Value::from("hit")));
        assert_eq!(row.get("z"), Some(&Value::Null));
        assert_eq!(row.single_entry(), None);
    }

    #[test]
    fn unknown_languages_are_unsupported() {
        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "x", "language": "javascript" }],
            "outputs": [{ "name": "y" }],
            "rules": [{ "inputs": ["-"], "outputs": ["1"] }]
        }));
        let err = DecisionTableEvaluator::default()
            .evaluate(&t, &VariableContext::new())
            .unwrap_err();
        assert!(matches!(err, EvalError::UnsupportedFeature { .. }));
    }

    #[test]
    fn input_expressions_bind_the_input_variable() {
        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "score", "input_expression": "applicant.score" }],
            "outputs": [{ "name": "ok", "type": "boolean" }],
            "rules": [
                { "inputs": ["? >= 600"], "outputs": ["true"] },
                { "inputs": ["< 600"], "outputs": ["\"false\""] }
            ]
        }));
        let evaluator = DecisionTableEvaluator::default();

        let vars = VariableContext::new().put_value(
            "applicant",
            crate::types::InputValue::object().field("score", 650),
        );
        let result = evaluator.evaluate(&t, &vars).unwrap();
        assert_eq!(result.single_entry(), Some(&Value::Bool(true)));

        let vars = VariableContext::new().put_value(
            "applicant",
            crate::types::InputValue::object().field("score", 500),
        );
        let result = evaluator.evaluate(&t, &vars).unwrap();
        assert_eq!(result.single_entry(), Some(&Value::Bool(false)));
    }

    #[test]
    fn blank_input_expression_binds_nothing() {
        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "x", "input_expression": "  " }],
            "outputs": [{ "name": "y" }],
            "rules": [
                { "inputs": ["10"], "outputs": ["\"ten\""] },
                { "inputs": ["-"], "outputs": ["\"any\""] }
            ]
        }));
        let vars = VariableContext::new().put_value("x", 10);
        let evaluator = DecisionTableEvaluator::default();

        let err = evaluator.evaluate(&t, &vars).unwrap_err();
        assert_eq!(err, EvalError::unresolved("cellInput"));

        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "x", "input_expression": "" }],
            "outputs": [{ "name": "y" }],
            "rules": [{ "inputs": ["-"], "outputs": ["\"any\""] }]
        }));
        let result = evaluator.evaluate(&t, &vars).unwrap();
        assert_eq!(result.single_entry(), Some(&Value::from("any")));
    }

    #[test]
    fn typed_inputs_are_coerced_before_testing() {
        let t = table(json!({
            "id": "t",
            "inputs": [{ "name": "amount", "type": "number" }],
            "outputs": [{ "name": "big" }],
            "rules": [{ "inputs": ["> 100"], "outputs": ["true"] }]
        }));
        let vars = VariableContext::new().put_value("amount", "250");
        let result = DecisionTableEvaluator::default().evaluate(&t, &vars).unwrap();
        assert_eq!(result.single_entry(), Some(&Value::Bool(true)));
    }
}
