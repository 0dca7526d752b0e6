//! AST for the FEEL subset.
//!
//! The parser produces these types and the evaluator backends consume
//! them. Nothing here is resolved: names are unchecked and function calls
//! carry their name as written.

use std::fmt;

// ──────────────────────────────────────────────
// Literals
// ──────────────────────────────────────────────

/// How a string literal was quoted in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(String),
    Str { value: String, quote: Quote },
}

// ──────────────────────────────────────────────
// Operators
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// A variable reference
    Name(String),
    /// `?`, the value under test inside a unary test
    Input,
    /// `base.property`
    Path {
        base: Box<Expr>,
        property: String,
    },
    /// `name(args...)`; `date and time` is folded into a single name
    Call {
        function: String,
        args: Vec<Expr>,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// True when `?` appears anywhere in the expression.
    pub fn references_input(&self) -> bool {
        match self {
            Expr::Input => true,
            Expr::Literal(_) | Expr::Name(_) => false,
            Expr::Path { base, .. } => base.references_input(),
            Expr::Call { args, .. } => args.iter().any(Expr::references_input),
            Expr::Compare { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
                left.references_input() || right.references_input()
            }
            Expr::Not(inner) => inner.references_input(),
        }
    }

    /// The function name when the expression is a plain call.
    pub fn as_call(&self) -> Option<&str> {
        match self {
            Expr::Call { function, .. } => Some(function),
            _ => None,
        }
    }
}

// ──────────────────────────────────────────────
// Unary tests
// ──────────────────────────────────────────────

/// A single positive unary test.
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryTest {
    /// `< x`, `<= x`, `= x`, ...
    Compare { op: CompareOp, operand: Expr },
    /// `[low..high]`, `(low..high)`, `]low..high[` and mixes thereof
    Interval {
        low: Expr,
        high: Expr,
        low_closed: bool,
        high_closed: bool,
    },
    /// A bare expression: implicit equality, or a boolean when it uses `?`
    Expr(Expr),
}

/// The full content of an input entry.
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryTests {
    /// `-`
    Any,
    /// `a, b, c`: matches when any test matches
    Positive(Vec<UnaryTest>),
    /// `not(a, b, c)`: matches when no test matches
    Negated(Vec<UnaryTest>),
}
