use std::fmt;

use crate::{ast::OperatorSymbol, evaluator::EvalError, params::Parameters, value::Value};

/// Runtime behaviour of a stage: combines the evaluated left and right
/// operands (`Value::Null` for an absent child).
pub type StageOperator =
    Box<dyn Fn(&Value, &Value, &dyn Parameters) -> Result<Value, EvalError> + Send + Sync>;

/// Predicate over a single operand.
pub type TypeCheck = fn(&Value) -> bool;

/// Predicate over both operands, for operators whose legality depends on
/// the pair (e.g. `+` wants two numbers or two strings).
pub type CombinedTypeCheck = fn(&Value, &Value) -> bool;

/// A node of the compiled evaluation tree.
///
/// Each stage exclusively owns its children. Once planned, the tree is never
/// mutated, so one tree can be evaluated from many threads at once.
pub struct EvaluationStage {
    pub symbol: OperatorSymbol,
    pub left: Option<Box<EvaluationStage>>,
    pub right: Option<Box<EvaluationStage>>,
    pub operator: StageOperator,
    pub left_type_check: Option<TypeCheck>,
    pub right_type_check: Option<TypeCheck>,
    /// When present, replaces both single-operand checks.
    pub type_check: Option<CombinedTypeCheck>,
    /// Completes "value ... cannot be used with ...", e.g. "it is not a number".
    pub type_error_format: &'static str,
    depth: usize,
}

impl EvaluationStage {
    /// A stage with no children and no type constraints.
    pub fn leaf(symbol: OperatorSymbol, operator: StageOperator) -> Self {
        EvaluationStage {
            symbol,
            left: None,
            right: None,
            operator,
            left_type_check: None,
            right_type_check: None,
            type_check: None,
            type_error_format: "",
            depth: 1,
        }
    }

    pub fn with_left(mut self, left: EvaluationStage) -> Self {
        self.depth = self.depth.max(left.depth + 1);
        self.left = Some(Box::new(left));
        self
    }

    pub fn with_right(mut self, right: EvaluationStage) -> Self {
        self.depth = self.depth.max(right.depth + 1);
        self.right = Some(Box::new(right));
        self
    }

    /// Number of stages on the longest path from this stage to a leaf.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_short_circuitable(&self) -> bool {
        self.symbol.is_short_circuitable()
    }
}

impl fmt::Debug for EvaluationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationStage")
            .field("symbol", &self.symbol)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish_non_exhaustive()
    }
}
