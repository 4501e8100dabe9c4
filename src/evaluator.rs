use thiserror::Error;

use crate::{
    ast::{EvaluationStage, OperatorSymbol},
    params::Parameters,
    value::Value,
};

/// Runtime arithmetic failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    /// Right operand of `=~`/`!~` is not a valid regular expression
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors that abort a single evaluation.
///
/// None of these affect the compiled expression; it can be evaluated again
/// with different bindings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// An operand failed the operator's single-value type check
    #[error("value '{value}' cannot be used with the {} '{symbol}', {expectation}", .symbol.role())]
    Type {
        symbol: OperatorSymbol,
        value: Value,
        expectation: &'static str,
    },

    /// The operand pair failed the operator's combined type check
    #[error("values '{left}' and '{right}' cannot be used with the {} '{symbol}', {expectation}", .symbol.role())]
    TypeMismatch {
        symbol: OperatorSymbol,
        left: Value,
        right: Value,
        expectation: &'static str,
    },

    /// Variable absent from the bindings
    #[error("no parameter '{name}' found")]
    Lookup { name: String },

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    /// A user function returned an error
    #[error("function '{name}' failed: {message}")]
    Function { name: String, message: String },

    /// An operator could not handle its operands. Only reachable with type
    /// checking disabled.
    #[error("cannot apply '{symbol}': {message}")]
    Operation {
        symbol: OperatorSymbol,
        message: String,
    },
}

impl EvalError {
    /// Whether this error came from a stage's type check.
    pub fn is_type_error(&self) -> bool {
        matches!(self, EvalError::Type { .. } | EvalError::TypeMismatch { .. })
    }
}

/// Walks a stage tree against a set of bindings.
///
/// The evaluator holds no state besides its configuration; evaluation never
/// mutates the tree.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    checks_types: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator { checks_types: true }
    }
}

impl Evaluator {
    pub fn new(checks_types: bool) -> Self {
        Evaluator { checks_types }
    }

    /// Evaluates `stage` and its children.
    ///
    /// The left child is evaluated first. For short-circuiting symbols the
    /// left value may settle the result, in which case the right child is
    /// never evaluated. With type checking enabled, the stage's predicates
    /// run before its operator.
    pub fn evaluate(
        &self,
        stage: &EvaluationStage,
        params: &dyn Parameters,
    ) -> Result<Value, EvalError> {
        let left = match &stage.left {
            Some(left) => self.evaluate(left, params)?,
            None => Value::Null,
        };

        let mut skip_right = false;
        if stage.is_short_circuitable() {
            match stage.symbol {
                OperatorSymbol::And if left == Value::Boolean(false) => {
                    return Ok(Value::Boolean(false));
                }
                OperatorSymbol::Or if left == Value::Boolean(true) => {
                    return Ok(Value::Boolean(true));
                }
                OperatorSymbol::Coalesce if !left.is_null() => return Ok(left),
                OperatorSymbol::TernaryTrue if left == Value::Boolean(false) => skip_right = true,
                OperatorSymbol::TernaryFalse if !left.is_null() => skip_right = true,
                _ => {}
            }
        }

        let right = match &stage.right {
            Some(right) if !skip_right => self.evaluate(right, params)?,
            _ => Value::Null,
        };

        if self.checks_types {
            type_check(stage, &left, &right)?;
        }

        (stage.operator)(&left, &right, params)
    }
}

fn type_check(stage: &EvaluationStage, left: &Value, right: &Value) -> Result<(), EvalError> {
    if let Some(check) = stage.type_check {
        if check(left, right) {
            return Ok(());
        }
        return Err(EvalError::TypeMismatch {
            symbol: stage.symbol,
            left: left.clone(),
            right: right.clone(),
            expectation: stage.type_error_format,
        });
    }

    for (check, value) in [(stage.left_type_check, left), (stage.right_type_check, right)] {
        if let Some(check) = check
            && !check(value)
        {
            return Err(EvalError::Type {
                symbol: stage.symbol,
                value: value.clone(),
                expectation: stage.type_error_format,
            });
        }
    }
    Ok(())
}

/// Evaluates a stage tree; see [`Evaluator::evaluate`].
pub fn evaluate(
    stage: &EvaluationStage,
    params: &dyn Parameters,
    checks_types: bool,
) -> Result<Value, EvalError> {
    Evaluator::new(checks_types).evaluate(stage, params)
}
