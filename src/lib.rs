//! # Sprig
//!
//! An embeddable expression language. Expressions are compiled once into a
//! tree of evaluation stages and then evaluated any number of times against
//! caller-supplied variable bindings.
//!
//! ```
//! use std::collections::HashMap;
//! use sprig_lang::{Expression, Value};
//!
//! let expr = Expression::new("(requests - errors) / requests >= 0.99").unwrap();
//!
//! let mut bindings = HashMap::new();
//! bindings.insert("requests".to_string(), 1000);
//! bindings.insert("errors".to_string(), 3);
//! assert_eq!(expr.evaluate(&bindings).unwrap(), Value::Boolean(true));
//! ```
pub mod ast;
pub mod evaluator;
pub mod expression;
pub mod lexer;
pub mod operations;
pub mod optimizer;
pub mod params;
pub mod planner;
pub mod sql;
pub mod validator;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{EvaluationStage, OperatorSymbol, Token, TokenKind};
pub use evaluator::{ArithmeticError, EvalError, Evaluator};
pub use expression::{CompileError, Compiler, Expression, Observer, compile, compile_from_tokens};
pub use lexer::{LexError, Lexer};
pub use optimizer::OptimizeError;
pub use params::{EmptyParameters, MapParameters, Parameters};
pub use planner::{ExpressionFunction, FunctionTable, PlanError};
pub use sql::SqlError;
pub use validator::SyntaxError;
pub use value::Value;
