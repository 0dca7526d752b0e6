//! Runtime values and contexts.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{EvalError, EvaluationErrorKind};
use crate::temporal::{parse_date_literal, parse_literal, TemporalValue};

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A value produced or consumed by expression evaluation.
/// All numbers use `rust_decimal::Decimal` -- never `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    Temporal(TemporalValue),
    /// A date builtin call that has been validated but not converted yet.
    TemporalLiteral(TemporalLiteral),
    Context(Context),
    List(Vec<Value>),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Temporal(_) | Value::TemporalLiteral(_) => "date",
            Value::Context(_) => "context",
            Value::List(_) => "list",
        }
    }

    /// Extracts a boolean or returns a type error naming `operator`.
    pub fn as_bool(&self, operator: &str) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(EvalError::evaluation(
                EvaluationErrorKind::TypeMismatch,
                operator,
            )),
        }
    }

    /// Render as JSON. Numbers become strings to keep their exact
    /// representation, temporals become ISO-8601 text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(d) => serde_json::Value::String(d.to_string()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Temporal(t) => serde_json::Value::String(t.to_string()),
            Value::TemporalLiteral(lit) => serde_json::Value::String(lit.text.clone()),
            Value::Context(ctx) => ctx.to_json(),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(d)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<TemporalValue> for Value {
    fn from(t: TemporalValue) -> Self {
        Value::Temporal(t)
    }
}

impl From<Context> for Value {
    fn from(c: Context) -> Self {
        Value::Context(c)
    }
}

// ──────────────────────────────────────────────
// Temporal literals
// ──────────────────────────────────────────────

/// The structured result of a `date(...)` or `date and time(...)` call as
/// returned by the legacy backend: the builtin name plus its argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalLiteral {
    pub function: String,
    pub text: String,
}

impl TemporalLiteral {
    /// Convert to a temporal value the way the builtin would.
    pub fn resolve(&self) -> Result<TemporalValue, EvalError> {
        if self.function == tabula_feel::DATE {
            parse_date_literal(&self.text)
        } else {
            parse_literal(&self.text)
        }
    }
}

// ──────────────────────────────────────────────
// Contexts
// ──────────────────────────────────────────────

/// An immutable map of named values addressable by property path. Also the
/// variable scope expressions are evaluated in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insertion; replaces an existing entry of the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn get_entry(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Resolve a property path. Every segment but the last must name a
    /// nested context.
    pub fn get(&self, path: &[&str]) -> Result<&Value, EvalError> {
        let (first, rest) = path.split_first().ok_or_else(|| {
            EvalError::evaluation(EvaluationErrorKind::MissingProperty, "")
        })?;
        let mut current = self.entries.get(*first).ok_or_else(|| {
            EvalError::evaluation(EvaluationErrorKind::MissingProperty, *first)
        })?;
        for segment in rest {
            current = match current {
                Value::Context(ctx) => ctx.entries.get(*segment).ok_or_else(|| {
                    EvalError::evaluation(EvaluationErrorKind::MissingProperty, *segment)
                })?,
                _ => {
                    return Err(EvalError::evaluation(
                        EvaluationErrorKind::NotAContext,
                        *segment,
                    ))
                }
            };
        }
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Context {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Context {
        Context::new().with("name", "Ada").with(
            "address",
            Context::new().with("city", "London").with("zip", 12345),
        )
    }

    #[test]
    fn nested_paths_resolve() {
        let ctx = person();
        assert_eq!(
            ctx.get(&["address", "city"]).unwrap(),
            &Value::Text("London".to_string())
        );
    }

    #[test]
    fn missing_field_names_the_segment() {
        let err = person().get(&["address", "street"]).unwrap_err();
        assert_eq!(
            err,
            EvalError::evaluation(EvaluationErrorKind::MissingProperty, "street")
        );
    }

    #[test]
    fn path_through_a_scalar_is_rejected() {
        let err = person().get(&["name", "first"]).unwrap_err();
        assert_eq!(err.evaluation_kind(), Some(EvaluationErrorKind::NotAContext));
    }

    #[test]
    fn with_replaces_entries() {
        let ctx = Context::new().with("a", 1).with("a", 2);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get_entry("a"), Some(&Value::from(2)));
    }

    #[test]
    fn json_rendering_keeps_decimals_exact() {
        let ctx = Context::new().with("amount", Decimal::new(1337, 2));
        assert_eq!(ctx.to_json(), serde_json::json!({ "amount": "13.37" }));
    }

    #[test]
    fn temporal_literals_resolve_by_function() {
        let day = TemporalLiteral {
            function: "date".to_string(),
            text: "2019-01-01".to_string(),
        };
        assert!(!day.resolve().unwrap().has_time_component());

        let wrong = TemporalLiteral {
            function: "date".to_string(),
            text: "2019-01-01T00:00:00".to_string(),
        };
        assert!(matches!(wrong.resolve(), Err(EvalError::TemporalParse { .. })));
    }
}
