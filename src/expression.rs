//! Compiled expressions and the compiler that builds them.
//!
//! Compilation runs tokenize, balance check, syntax check, optimize and plan,
//! in that order. Any failure aborts compilation; there is no partial
//! result. The resulting [`Expression`] is immutable and can be evaluated
//! concurrently from many threads, each call bringing its own bindings.

use std::{collections::HashMap, fmt, sync::Arc};

use thiserror::Error;

use crate::{
    ast::{EvaluationStage, Token, TokenKind},
    evaluator::{EvalError, Evaluator},
    lexer::{LexError, tokenize},
    optimizer::{OptimizeError, optimize},
    params::{MapParameters, Parameters},
    planner::{FunctionTable, PlanError, plan},
    sql::{SqlError, render_sql},
    validator::{SyntaxError, check_balance, check_syntax},
    value::Value,
};

/// ISO-8601 with nanoseconds and a numeric offset, in chrono syntax.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";

/// Any failure while compiling an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("optimize error: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
}

/// Hook invoked around compile and evaluate calls.
///
/// Both methods default to doing nothing. An observer sees results; it
/// cannot change them.
pub trait Observer: Send + Sync {
    fn on_compile(&self, _source: &str, _result: Result<&Expression, &CompileError>) {}

    fn on_evaluate(&self, _source: &str, _result: Result<&Value, &EvalError>) {}
}

/// Builds [`Expression`]s with a set of functions and an optional observer.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use sprig_lang::{Compiler, Value};
///
/// let compiler = Compiler::new().function("strlen", |args: &[Value]| match args {
///     [Value::String(s)] => Ok(Value::from(s.chars().count())),
///     _ => Err("strlen expects one string".to_string()),
/// });
///
/// let expr = compiler.compile("strlen(name) > 3").unwrap();
///
/// let mut bindings = HashMap::new();
/// bindings.insert("name".to_string(), "alice");
/// assert_eq!(expr.evaluate(&bindings).unwrap(), Value::Boolean(true));
/// ```
#[derive(Clone, Default)]
pub struct Compiler {
    functions: FunctionTable,
    observer: Option<Arc<dyn Observer>>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callable under `name`.
    pub fn function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Registers every callable of `table`.
    pub fn functions(mut self, table: &FunctionTable) -> Self {
        self.functions
            .extend(table.iter().map(|(name, f)| (name.clone(), f.clone())));
        self
    }

    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Compiles expression text.
    pub fn compile(&self, text: &str) -> Result<Expression, CompileError> {
        let result = tokenize(text)
            .map_err(CompileError::from)
            .and_then(|tokens| self.build(text.to_string(), tokens));
        self.notify(text, &result);
        result
    }

    /// Compiles an already-tokenized expression, skipping the lexer.
    ///
    /// The source text reported by [`Expression::source`] is the tokens
    /// rendered back to text.
    pub fn compile_tokens(&self, tokens: Vec<Token>) -> Result<Expression, CompileError> {
        let source = tokens
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let result = self.build(source.clone(), tokens);
        self.notify(&source, &result);
        result
    }

    fn build(&self, source: String, tokens: Vec<Token>) -> Result<Expression, CompileError> {
        check_balance(&tokens)?;
        check_syntax(&tokens)?;
        let tokens = optimize(tokens)?;
        let root = plan(&tokens, &self.functions)?;

        Ok(Expression {
            source,
            tokens,
            root,
            checks_types: true,
            date_query_format: ISO_DATE_FORMAT.to_string(),
            observer: self.observer.clone(),
        })
    }

    fn notify(&self, source: &str, result: &Result<Expression, CompileError>) {
        #[cfg(feature = "tracing")]
        match result {
            Ok(expr) => tracing::debug!("compiled '{}' into {} tokens", source, expr.tokens.len()),
            Err(e) => tracing::debug!("failed to compile '{}': {}", source, e),
        }

        if let Some(observer) = &self.observer {
            observer.on_compile(source, result.as_ref());
        }
    }
}

/// An expression compiled into a stage tree, ready to be evaluated any
/// number of times.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use sprig_lang::{Expression, Value};
///
/// let expr = Expression::new("foo + 1").unwrap();
///
/// let mut bindings = HashMap::new();
/// bindings.insert("foo".to_string(), 2);
/// assert_eq!(expr.evaluate(&bindings).unwrap(), Value::Number(3.0));
/// ```
pub struct Expression {
    source: String,
    tokens: Vec<Token>,
    root: Option<EvaluationStage>,
    checks_types: bool,
    date_query_format: String,
    observer: Option<Arc<dyn Observer>>,
}

impl Expression {
    /// Compiles `text` with no functions available.
    pub fn new(text: &str) -> Result<Self, CompileError> {
        Compiler::new().compile(text)
    }

    /// Compiles `text` with the given functions available.
    pub fn with_functions(text: &str, functions: &FunctionTable) -> Result<Self, CompileError> {
        Compiler::new().functions(functions).compile(text)
    }

    /// Compiles a pre-tokenized expression with no functions available.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, CompileError> {
        Compiler::new().compile_tokens(tokens)
    }

    /// Enables or disables runtime type checks (enabled by default).
    ///
    /// With checks disabled, operators receive operands unvalidated. A
    /// mistyped operand then fails with [`EvalError::Operation`] rather than a
    /// type error; which operand combinations fail, and how, is unspecified.
    pub fn with_checks_types(mut self, checks_types: bool) -> Self {
        self.checks_types = checks_types;
        self
    }

    pub fn checks_types(&self) -> bool {
        self.checks_types
    }

    /// Sets the chrono format used for date-times by
    /// [`Expression::to_sql_query`]. Has no effect on evaluation.
    pub fn with_date_query_format(mut self, format: impl Into<String>) -> Self {
        self.date_query_format = format.into();
        self
    }

    pub fn date_query_format(&self) -> &str {
        &self.date_query_format
    }

    /// Evaluates against a plain map of bindings.
    pub fn evaluate<V>(&self, bindings: &HashMap<String, V>) -> Result<Value, EvalError>
    where
        V: Clone + Into<Value>,
    {
        self.evaluate_with(&MapParameters::new(bindings))
    }

    /// Evaluates against any binding provider.
    pub fn evaluate_with(&self, params: &dyn Parameters) -> Result<Value, EvalError> {
        let result = match &self.root {
            Some(root) => Evaluator::new(self.checks_types).evaluate(root, params),
            None => Ok(Value::Null),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("evaluated '{}': {:?}", self.source, result);

        if let Some(observer) = &self.observer {
            observer.on_evaluate(&self.source, result.as_ref());
        }
        result
    }

    /// Tokens after optimization.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Distinct variable names, in order of first appearance.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for token in &self.tokens {
            if token.kind == TokenKind::Variable && !names.iter().any(|n| n == token.text()) {
                names.push(token.text().to_string());
            }
        }
        names
    }

    /// The text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the expression as an SQL `WHERE` fragment.
    pub fn to_sql_query(&self) -> Result<String, SqlError> {
        render_sql(&self.tokens, &self.date_query_format)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("tokens", &self.tokens)
            .field("root", &self.root)
            .field("checks_types", &self.checks_types)
            .field("date_query_format", &self.date_query_format)
            .finish_non_exhaustive()
    }
}

/// Compiles `text` with `functions` available.
pub fn compile(text: &str, functions: &FunctionTable) -> Result<Expression, CompileError> {
    Expression::with_functions(text, functions)
}

/// Compiles a pre-tokenized expression.
pub fn compile_from_tokens(tokens: Vec<Token>) -> Result<Expression, CompileError> {
    Expression::from_tokens(tokens)
}
