//! Loosely-typed caller inputs.
//!
//! Callers hand variables in as [`InputValue`]s. Temporal inputs keep their
//! external representation until a backend's normalizer converts them, so
//! the same variables can be evaluated under either policy.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::error::{EvalError, EvaluationErrorKind};
use crate::temporal::ExternalTemporal;

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    Temporal(ExternalTemporal),
    /// Named fields, converted to a context
    Object(BTreeMap<String, InputValue>),
    Array(Vec<InputValue>),
}

impl InputValue {
    /// Convert a JSON tree. JSON has no temporal type, so strings stay text.
    pub fn from_json(v: &serde_json::Value) -> Result<InputValue, EvalError> {
        Ok(match v {
            serde_json::Value::Null => InputValue::Null,
            serde_json::Value::Bool(b) => InputValue::Bool(*b),
            serde_json::Value::Number(n) => InputValue::Number(parse_json_number(n)?),
            serde_json::Value::String(s) => InputValue::Text(s.clone()),
            serde_json::Value::Array(items) => InputValue::Array(
                items
                    .iter()
                    .map(InputValue::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(fields) => InputValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), InputValue::from_json(v)?)))
                    .collect::<Result<_, EvalError>>()?,
            ),
        })
    }

    /// Start an empty object; fill it with [`InputValue::field`].
    pub fn object() -> InputValue {
        InputValue::Object(BTreeMap::new())
    }

    /// Builder-style field insertion. Has no effect on non-object values.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> InputValue {
        if let InputValue::Object(fields) = &mut self {
            fields.insert(name.into(), value.into());
        }
        self
    }
}

fn parse_json_number(n: &serde_json::Number) -> Result<Decimal, EvalError> {
    if let Some(i) = n.as_i64() {
        return Ok(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Decimal::from(u));
    }
    let text = n.to_string();
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| EvalError::evaluation(EvaluationErrorKind::InvalidArgument, text))
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        InputValue::Bool(b)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Text(s)
    }
}

impl From<Decimal> for InputValue {
    fn from(d: Decimal) -> Self {
        InputValue::Number(d)
    }
}

impl From<i64> for InputValue {
    fn from(i: i64) -> Self {
        InputValue::Number(Decimal::from(i))
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        InputValue::Number(Decimal::from(i))
    }
}

impl From<ExternalTemporal> for InputValue {
    fn from(t: ExternalTemporal) -> Self {
        InputValue::Temporal(t)
    }
}

impl From<Date> for InputValue {
    fn from(d: Date) -> Self {
        InputValue::Temporal(ExternalTemporal::LocalDate(d))
    }
}

impl From<PrimitiveDateTime> for InputValue {
    fn from(dt: PrimitiveDateTime) -> Self {
        InputValue::Temporal(ExternalTemporal::Local(dt))
    }
}

impl From<OffsetDateTime> for InputValue {
    fn from(dt: OffsetDateTime) -> Self {
        InputValue::Temporal(ExternalTemporal::Zoned(dt))
    }
}

// ──────────────────────────────────────────────
// Variable context
// ──────────────────────────────────────────────

/// Variables for one decision invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableContext {
    vars: BTreeMap<String, InputValue>,
}

impl VariableContext {
    pub fn new() -> Self {
        VariableContext {
            vars: BTreeMap::new(),
        }
    }

    /// Builder-style insertion.
    pub fn put_value(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<InputValue>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.vars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.vars.iter()
    }

    /// Build from a JSON object mapping variable names to values.
    pub fn from_json(v: &serde_json::Value) -> Result<VariableContext, EvalError> {
        let obj = v.as_object().ok_or_else(|| {
            EvalError::evaluation(EvaluationErrorKind::NotAContext, "variables")
        })?;
        let mut vars = VariableContext::new();
        for (name, value) in obj {
            vars.insert(name.clone(), InputValue::from_json(value)?);
        }
        Ok(vars)
    }
}
