use std::fmt;

use tabula_feel::ParseError;

use crate::types::{DeclaredType, HitPolicy};

/// What went wrong while evaluating a well-formed expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationErrorKind {
    /// A variable (or `?`) is not bound in the evaluation context.
    UnresolvedVariable,
    /// A property path named a field the context does not have.
    MissingProperty,
    /// A property path was applied to something that is not a context.
    NotAContext,
    /// An operator received operands it is not defined for.
    TypeMismatch,
    UnknownFunction,
    InvalidArgument,
}

impl fmt::Display for EvaluationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EvaluationErrorKind::UnresolvedVariable => "no variable found for name",
            EvaluationErrorKind::MissingProperty => "no property found for name",
            EvaluationErrorKind::NotAContext => "not a context, cannot access property",
            EvaluationErrorKind::TypeMismatch => "operands not comparable with operator",
            EvaluationErrorKind::UnknownFunction => "no function found with name",
            EvaluationErrorKind::InvalidArgument => "invalid argument for",
        };
        f.write_str(text)
    }
}

/// All errors surfaced by expression evaluation and table evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The expression text does not parse.
    #[error("failed to parse expression '{expression}': {message}")]
    ExpressionSyntax { expression: String, message: String },

    /// The expression parsed but could not be evaluated.
    #[error("failed to evaluate: {kind} '{subject}'")]
    Evaluation {
        kind: EvaluationErrorKind,
        subject: String,
    },

    /// A matched rule produced a value that does not fit its clause type.
    #[error("cannot coerce {actual_kind} to {declared_type} for clause '{clause}'")]
    TypeCoercion {
        clause: String,
        declared_type: DeclaredType,
        actual_kind: String,
    },

    /// A date or date-time literal is malformed.
    #[error("invalid date/time literal '{literal}'")]
    TemporalParse { literal: String },

    /// Syntax the grammar accepts but the selected backend does not implement.
    #[error("unsupported feature: {feature}")]
    UnsupportedFeature { feature: String },

    /// More rules matched than the hit policy allows.
    #[error("hit policy {policy} violated in table '{table}': rules {rules:?} matched")]
    HitPolicyViolation {
        table: String,
        policy: HitPolicy,
        rules: Vec<usize>,
    },

    /// The table descriptor is structurally invalid.
    #[error("invalid decision table: {message}")]
    InvalidTable { message: String },

    /// Engine configuration could not be loaded or is inconsistent.
    #[error("invalid engine configuration: {message}")]
    InvalidConfig { message: String },
}

impl EvalError {
    pub fn syntax(expression: &str, err: ParseError) -> Self {
        EvalError::ExpressionSyntax {
            expression: expression.to_string(),
            message: err.to_string(),
        }
    }

    pub fn evaluation(kind: EvaluationErrorKind, subject: impl Into<String>) -> Self {
        EvalError::Evaluation {
            kind,
            subject: subject.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        EvalError::evaluation(EvaluationErrorKind::UnresolvedVariable, name)
    }

    pub fn temporal_parse(literal: impl Into<String>) -> Self {
        EvalError::TemporalParse {
            literal: literal.into(),
        }
    }

    /// The evaluation error kind, if this is an `Evaluation` error.
    pub fn evaluation_kind(&self) -> Option<EvaluationErrorKind> {
        match self {
            EvalError::Evaluation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
