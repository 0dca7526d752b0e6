//! Runtime value types, caller inputs and the table descriptor.

pub mod input;
pub mod table;
pub mod values;

pub use input::{InputValue, VariableContext};
pub use table::{
    DecisionTable, DeclaredType, ExpressionLanguage, HitPolicy, InputClause, OutputClause, Rule,
};
pub use values::{Context, TemporalLiteral, Value};
