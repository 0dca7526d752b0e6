//! Decision table descriptor.
//!
//! The descriptor is produced by an external model loader; here it is
//! deserialized from JSON and checked for structural consistency.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

// ──────────────────────────────────────────────
// Clause attributes
// ──────────────────────────────────────────────

/// The type a clause's values are coerced to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    #[default]
    Any,
    String,
    Boolean,
    #[serde(alias = "integer", alias = "long", alias = "double")]
    Number,
    Date,
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclaredType::Any => "any",
            DeclaredType::String => "string",
            DeclaredType::Boolean => "boolean",
            DeclaredType::Number => "number",
            DeclaredType::Date => "date",
        };
        f.write_str(name)
    }
}

/// Which expression evaluator backend a clause is evaluated with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpressionLanguage {
    Legacy,
    Strict,
    /// Any other tag; rejected at evaluation time.
    Other(String),
}

impl From<String> for ExpressionLanguage {
    fn from(tag: String) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "legacy" => ExpressionLanguage::Legacy,
            "strict" => ExpressionLanguage::Strict,
            _ => ExpressionLanguage::Other(tag),
        }
    }
}

impl From<ExpressionLanguage> for String {
    fn from(lang: ExpressionLanguage) -> Self {
        lang.to_string()
    }
}

impl fmt::Display for ExpressionLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionLanguage::Legacy => f.write_str("legacy"),
            ExpressionLanguage::Strict => f.write_str("strict"),
            ExpressionLanguage::Other(tag) => f.write_str(tag),
        }
    }
}

/// How many matching rules a table may produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HitPolicy {
    /// The first matching rule in table order wins.
    #[default]
    First,
    /// At most one rule may match.
    Unique,
    /// Every matching rule contributes, in table order.
    Collect,
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HitPolicy::First => "FIRST",
            HitPolicy::Unique => "UNIQUE",
            HitPolicy::Collect => "COLLECT",
        };
        f.write_str(name)
    }
}

// ──────────────────────────────────────────────
// Clauses, rules, table
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputClause {
    pub name: String,
    #[serde(rename = "type", default)]
    pub declared_type: DeclaredType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<ExpressionLanguage>,
    /// Expression computing the input value; without one the input value is
    /// the variable named after the clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputClause {
    pub name: String,
    #[serde(rename = "type", default)]
    pub declared_type: DeclaredType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<ExpressionLanguage>,
}

/// One row: input entries aligned with the input clauses, output entries
/// aligned with the output clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTable {
    pub id: String,
    #[serde(default)]
    pub hit_policy: HitPolicy,
    #[serde(default)]
    pub inputs: Vec<InputClause>,
    pub outputs: Vec<OutputClause>,
    pub rules: Vec<Rule>,
}

impl DecisionTable {
    /// Deserialize and validate a table descriptor.
    pub fn from_json(v: &serde_json::Value) -> Result<DecisionTable, EvalError> {
        let table: DecisionTable =
            serde_json::from_value(v.clone()).map_err(|e| EvalError::InvalidTable {
                message: e.to_string(),
            })?;
        table.validate()?;
        Ok(table)
    }

    /// Check that the table has rules and outputs, and that every rule's
    /// entries line up with the clauses.
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.rules.is_empty() {
            return Err(self.invalid("table has no rules"));
        }
        if self.outputs.is_empty() {
            return Err(self.invalid("table has no output clauses"));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.inputs.len() != self.inputs.len() {
                return Err(self.invalid(format!(
                    "rule {} has {} input entries, table has {} input clauses",
                    index,
                    rule.inputs.len(),
                    self.inputs.len()
                )));
            }
            if rule.outputs.len() != self.outputs.len() {
                return Err(self.invalid(format!(
                    "rule {} has {} output entries, table has {} output clauses",
                    index,
                    rule.outputs.len(),
                    self.outputs.len()
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> EvalError {
        EvalError::InvalidTable {
            message: format!("'{}': {}", self.id, message.into()),
        }
    }
}
