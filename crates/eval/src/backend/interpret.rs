//! Tree-walking evaluation shared by both backends.
//!
//! The backends differ only in a handful of switches, collected in
//! [`Dialect`]. Everything else (name lookup, property paths, builtins,
//! comparisons, unary test forms) is evaluated here.

use rust_decimal::Decimal;
use tabula_feel::{
    parse_expression, parse_unary_tests, CompareOp, Expr, Literal, Quote, UnaryTest, UnaryTests,
    DATE, DATE_AND_TIME,
};

use crate::compare::compare_values;
use crate::error::{EvalError, EvaluationErrorKind};
use crate::temporal::{TemporalNormalizer, TemporalValue};
use crate::types::{Context, TemporalLiteral, Value};

/// Backend-specific behavior switches.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dialect {
    pub name: &'static str,
    /// Accept `'text'` string literals.
    pub single_quoted_strings: bool,
    /// Return date builtin calls as unresolved [`TemporalLiteral`]s.
    pub defer_temporal_literals: bool,
    /// Treat a bare `date(...)` / `date and time(...)` unary test as an
    /// implicit equality. When false such a test never matches.
    pub bare_temporal_call_matches: bool,
}

pub(crate) fn evaluate_expression(
    dialect: &Dialect,
    normalizer: &TemporalNormalizer,
    text: &str,
    context: &Context,
) -> Result<Value, EvalError> {
    let expr = parse_expression(text).map_err(|e| EvalError::syntax(text, e))?;
    Interpreter::new(dialect, normalizer, context).eval(&expr)
}

pub(crate) fn evaluate_unary_test(
    dialect: &Dialect,
    normalizer: &TemporalNormalizer,
    text: &str,
    input_name: &str,
    context: &Context,
) -> Result<bool, EvalError> {
    let tests = parse_unary_tests(text).map_err(|e| EvalError::syntax(text, e))?;
    let (tests, negated) = match &tests {
        UnaryTests::Any => return Ok(true),
        UnaryTests::Positive(tests) => (tests, false),
        UnaryTests::Negated(tests) => (tests, true),
    };

    let input = context
        .get_entry(input_name)
        .ok_or_else(|| EvalError::unresolved(input_name))?;
    let interpreter = Interpreter {
        input: Some(input),
        ..Interpreter::new(dialect, normalizer, context)
    };

    let mut matched = false;
    for test in tests {
        if interpreter.test(test, input)? {
            matched = true;
            break;
        }
    }
    let result = matched != negated;
    tracing::trace!(
        backend = dialect.name,
        test = text,
        input = input_name,
        result,
        "evaluated unary test"
    );
    Ok(result)
}

struct Interpreter<'a> {
    dialect: &'a Dialect,
    normalizer: &'a TemporalNormalizer,
    context: &'a Context,
    /// The value `?` refers to; only set inside unary tests.
    input: Option<&'a Value>,
}

impl<'a> Interpreter<'a> {
    fn new(dialect: &'a Dialect, normalizer: &'a TemporalNormalizer, context: &'a Context) -> Self {
        Interpreter {
            dialect,
            normalizer,
            context,
            input: None,
        }
    }

    // ── Unary tests ──────────────────────────────

    fn test(&self, test: &UnaryTest, input: &Value) -> Result<bool, EvalError> {
        match test {
            UnaryTest::Compare { op, operand } => {
                let endpoint = self.eval(operand)?;
                self.compare(input, &endpoint, *op)
            }
            UnaryTest::Interval {
                low,
                high,
                low_closed,
                high_closed,
            } => {
                let low = self.eval(low)?;
                let high = self.eval(high)?;
                let low_op = if *low_closed { CompareOp::Gte } else { CompareOp::Gt };
                let high_op = if *high_closed { CompareOp::Lte } else { CompareOp::Lt };
                Ok(self.compare(input, &low, low_op)? && self.compare(input, &high, high_op)?)
            }
            UnaryTest::Expr(expr) if expr.references_input() => self.eval(expr)?.as_bool("?"),
            UnaryTest::Expr(expr) => {
                let value = self.eval(expr)?;
                if !self.dialect.bare_temporal_call_matches && is_temporal_call(expr) {
                    tracing::trace!(
                        backend = self.dialect.name,
                        "bare temporal call in unary test does not match"
                    );
                    return Ok(false);
                }
                self.compare(input, &value, CompareOp::Eq)
            }
        }
    }

    fn compare(&self, left: &Value, right: &Value, op: CompareOp) -> Result<bool, EvalError> {
        compare_values(left, right, op, self.normalizer)
    }

    // ── Expressions ──────────────────────────────

    fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(lit) => self.literal(lit),

            Expr::Name(name) => self
                .context
                .get_entry(name)
                .cloned()
                .ok_or_else(|| EvalError::unresolved(name.as_str())),

            Expr::Input => self
                .input
                .cloned()
                .ok_or_else(|| EvalError::unresolved("?")),

            Expr::Path { base, property } => match self.eval(base)? {
                Value::Context(ctx) => ctx.get_entry(property).cloned().ok_or_else(|| {
                    EvalError::evaluation(EvaluationErrorKind::MissingProperty, property.as_str())
                }),
                _ => Err(EvalError::evaluation(
                    EvaluationErrorKind::NotAContext,
                    property.as_str(),
                )),
            },

            Expr::Call { function, args } => self.call(function, args),

            Expr::Compare { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(Value::Bool(self.compare(&left, &right, *op)?))
            }

            Expr::And(left, right) => {
                if !self.eval(left)?.as_bool("and")? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(right)?.as_bool("and")?))
            }

            Expr::Or(left, right) => {
                if self.eval(left)?.as_bool("or")? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(right)?.as_bool("or")?))
            }

            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner)?.as_bool("not")?)),
        }
    }

    fn literal(&self, lit: &Literal) -> Result<Value, EvalError> {
        Ok(match lit {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Number(Decimal::from(*i)),
            Literal::Float(text) => Value::Number(
                text.parse::<Decimal>()
                    .or_else(|_| Decimal::from_scientific(text))
                    .map_err(|_| {
                        EvalError::evaluation(EvaluationErrorKind::InvalidArgument, text.as_str())
                    })?,
            ),
            Literal::Str {
                quote: Quote::Single,
                ..
            } if !self.dialect.single_quoted_strings => {
                return Err(EvalError::UnsupportedFeature {
                    feature: "single-quoted string literal".to_string(),
                })
            }
            Literal::Str { value, .. } => Value::Text(value.clone()),
        })
    }

    fn call(&self, function: &str, args: &[Expr]) -> Result<Value, EvalError> {
        if function != DATE && function != DATE_AND_TIME {
            return Err(EvalError::evaluation(
                EvaluationErrorKind::UnknownFunction,
                function,
            ));
        }
        let [arg] = args else {
            return Err(EvalError::evaluation(
                EvaluationErrorKind::InvalidArgument,
                function,
            ));
        };

        match self.eval(arg)? {
            Value::Text(text) => {
                let literal = TemporalLiteral {
                    function: function.to_string(),
                    text,
                };
                let value = literal.resolve()?;
                if self.dialect.defer_temporal_literals {
                    Ok(Value::TemporalLiteral(literal))
                } else {
                    Ok(Value::Temporal(value))
                }
            }
            Value::Temporal(t) => Ok(Value::Temporal(convert(function, t)?)),
            Value::TemporalLiteral(lit) => Ok(Value::Temporal(convert(function, lit.resolve()?)?)),
            _ => Err(EvalError::evaluation(
                EvaluationErrorKind::InvalidArgument,
                function,
            )),
        }
    }
}

/// `date(x)` on a temporal drops the time of day; `date and time(x)` is the
/// identity.
fn convert(function: &str, value: TemporalValue) -> Result<TemporalValue, EvalError> {
    if function == DATE && value.has_time_component() {
        let date = value
            .date_part()
            .ok_or_else(|| EvalError::evaluation(EvaluationErrorKind::InvalidArgument, function))?;
        return Ok(TemporalValue::from_date(date));
    }
    Ok(value)
}

fn is_temporal_call(expr: &Expr) -> bool {
    matches!(expr.as_call(), Some(f) if f == DATE || f == DATE_AND_TIME)
}
