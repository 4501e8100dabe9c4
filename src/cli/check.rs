//! Compile and evaluate expressions for the `sprig` subcommands

use std::collections::HashMap;

use super::{CliError, bindings_from_json, value_to_json};
use crate::{Expression, Value};

/// Options for the eval and check commands
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// The expression to compile
    pub expression: String,
    /// JSON object of variable bindings
    pub bindings: Option<String>,
    /// Run operator type checks during evaluation
    pub checks_types: bool,
    /// Only compile, don't evaluate
    pub syntax_only: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            expression: String::new(),
            bindings: None,
            checks_types: true,
            syntax_only: false,
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The expression compiled; lists the variables it references
    SyntaxValid { variables: Vec<String> },
    /// Expression evaluated successfully with JSON output
    Success(serde_json::Value),
}

/// Compile the expression and, unless `syntax_only` is set, evaluate it
/// against the bindings. Missing bindings mean no variables are bound.
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let expr = Expression::new(&options.expression)?.with_checks_types(options.checks_types);

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid {
            variables: expr.variable_names(),
        });
    }

    let bindings: HashMap<String, Value> = match options.bindings.as_deref() {
        Some(json) if !json.trim().is_empty() => bindings_from_json(serde_json::from_str(json)?)?,
        _ => HashMap::new(),
    };

    let result = expr.evaluate(&bindings)?;
    Ok(CheckResult::Success(value_to_json(result)))
}

/// One line per optimized token: its kind, then its source form.
pub fn list_tokens(expression: &str) -> Result<Vec<String>, CliError> {
    let expr = Expression::new(expression)?;
    Ok(expr
        .tokens()
        .iter()
        .map(|token| format!("{:?}\t{}", token.kind, token))
        .collect())
}

/// Render the expression as an SQL `WHERE` fragment.
pub fn translate_sql(expression: &str, date_format: Option<&str>) -> Result<String, CliError> {
    let mut expr = Expression::new(expression)?;
    if let Some(format) = date_format {
        expr = expr.with_date_query_format(format);
    }
    Ok(expr.to_sql_query()?)
}
