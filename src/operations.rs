//! Operator behaviours and the type predicates guarding them.
//!
//! The planner builds every stage through the constructors here, so each
//! symbol always pairs with the same behaviour and checks.
//!
//! Behaviours never panic on operands of the wrong type. With type checking
//! disabled they report [`EvalError::Operation`] instead of a type error.

use std::cmp::Ordering;

use crate::{
    ast::{EvaluationStage, OperatorSymbol, StageOperator},
    evaluator::{ArithmeticError, EvalError},
    planner::ExpressionFunction,
    value::Value,
};

const NOT_A_NUMBER: &str = "it is not a number";
const NOT_A_BOOLEAN: &str = "it is not a boolean";
const NOT_A_STRING: &str = "it is not a string";
const NOT_AN_ARRAY: &str = "it is not an array";
const NOT_ADDABLE: &str = "operands must both be numbers or both be strings";
const NOT_COMPARABLE: &str = "operands must both be numbers, strings or date-times";

// Type predicates

fn is_number(v: &Value) -> bool {
    matches!(v, Value::Number(_))
}

fn is_bool(v: &Value) -> bool {
    matches!(v, Value::Boolean(_))
}

fn is_string(v: &Value) -> bool {
    matches!(v, Value::String(_))
}

fn is_array(v: &Value) -> bool {
    matches!(v, Value::Array(_))
}

fn is_addable(l: &Value, r: &Value) -> bool {
    matches!(
        (l, r),
        (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_))
    )
}

fn is_comparable(l: &Value, r: &Value) -> bool {
    matches!(
        (l, r),
        (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::DateTime(_), Value::DateTime(_))
    )
}

// Operand extraction for the unchecked path

fn unsupported(symbol: OperatorSymbol, l: &Value, r: &Value) -> EvalError {
    EvalError::Operation {
        symbol,
        message: format!(
            "unsupported operand types {} and {}",
            l.type_name(),
            r.type_name()
        ),
    }
}

fn number(symbol: OperatorSymbol, v: &Value) -> Result<f64, EvalError> {
    v.as_number().ok_or_else(|| EvalError::Operation {
        symbol,
        message: format!("expected a number, got {}", v.type_name()),
    })
}

fn numbers(symbol: OperatorSymbol, l: &Value, r: &Value) -> Result<(f64, f64), EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(unsupported(symbol, l, r)),
    }
}

fn integers(symbol: OperatorSymbol, l: &Value, r: &Value) -> Result<(i64, i64), EvalError> {
    let (a, b) = numbers(symbol, l, r)?;
    Ok((a as i64, b as i64))
}

fn booleans(symbol: OperatorSymbol, l: &Value, r: &Value) -> Result<(bool, bool), EvalError> {
    match (l, r) {
        (Value::Boolean(a), Value::Boolean(b)) => Ok((*a, *b)),
        _ => Err(unsupported(symbol, l, r)),
    }
}

fn order(symbol: OperatorSymbol, l: &Value, r: &Value) -> Result<Option<Ordering>, EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::DateTime(a), Value::DateTime(b)) => Ok(Some(a.cmp(b))),
        _ => Err(unsupported(symbol, l, r)),
    }
}

fn shift(symbol: OperatorSymbol, l: &Value, r: &Value) -> Result<Value, EvalError> {
    let (a, b) = integers(symbol, l, r)?;
    let shifted = match u32::try_from(b) {
        Ok(b) if b < 64 && symbol == OperatorSymbol::ShiftLeft => a << b,
        Ok(b) if b < 64 => a >> b,
        _ if symbol == OperatorSymbol::ShiftRight && a < 0 => -1,
        _ => 0,
    };
    Ok(Value::Number(shifted as f64))
}

fn matches_pattern(symbol: OperatorSymbol, l: &Value, r: &Value) -> Result<bool, EvalError> {
    match (l, r) {
        (Value::String(s), Value::String(pattern)) => {
            let re = regex::Regex::new(pattern).map_err(|e| ArithmeticError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            Ok(re.is_match(s))
        }
        _ => Err(unsupported(symbol, l, r)),
    }
}

fn binary_behaviour(symbol: OperatorSymbol) -> StageOperator {
    use OperatorSymbol::*;
    match symbol {
        Plus => Box::new(|l, r, _| match (l, r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => Err(unsupported(Plus, l, r)),
        }),
        Minus => Box::new(|l, r, _| numbers(Minus, l, r).map(|(a, b)| Value::Number(a - b))),
        Multiply => Box::new(|l, r, _| numbers(Multiply, l, r).map(|(a, b)| Value::Number(a * b))),
        Divide => Box::new(|l, r, _| {
            let (a, b) = numbers(Divide, l, r)?;
            if b == 0.0 {
                return Err(ArithmeticError::DivisionByZero.into());
            }
            Ok(Value::Number(a / b))
        }),
        Modulus => Box::new(|l, r, _| {
            let (a, b) = numbers(Modulus, l, r)?;
            if b == 0.0 {
                return Err(ArithmeticError::ModuloByZero.into());
            }
            Ok(Value::Number(a % b))
        }),
        Exponent => {
            Box::new(|l, r, _| numbers(Exponent, l, r).map(|(a, b)| Value::Number(a.powf(b))))
        }
        BitwiseAnd => {
            Box::new(|l, r, _| integers(BitwiseAnd, l, r).map(|(a, b)| Value::Number((a & b) as f64)))
        }
        BitwiseOr => {
            Box::new(|l, r, _| integers(BitwiseOr, l, r).map(|(a, b)| Value::Number((a | b) as f64)))
        }
        BitwiseXor => {
            Box::new(|l, r, _| integers(BitwiseXor, l, r).map(|(a, b)| Value::Number((a ^ b) as f64)))
        }
        ShiftLeft => Box::new(|l, r, _| shift(ShiftLeft, l, r)),
        ShiftRight => Box::new(|l, r, _| shift(ShiftRight, l, r)),

        Eq => Box::new(|l, r, _| Ok(Value::Boolean(l == r))),
        NotEq => Box::new(|l, r, _| Ok(Value::Boolean(l != r))),
        Gt => Box::new(|l, r, _| Ok(Value::Boolean(order(Gt, l, r)? == Some(Ordering::Greater)))),
        GtEq => Box::new(|l, r, _| {
            let ord = order(GtEq, l, r)?;
            Ok(Value::Boolean(matches!(ord, Some(Ordering::Greater | Ordering::Equal))))
        }),
        Lt => Box::new(|l, r, _| Ok(Value::Boolean(order(Lt, l, r)? == Some(Ordering::Less)))),
        LtEq => Box::new(|l, r, _| {
            let ord = order(LtEq, l, r)?;
            Ok(Value::Boolean(matches!(ord, Some(Ordering::Less | Ordering::Equal))))
        }),
        Regex => Box::new(|l, r, _| matches_pattern(Regex, l, r).map(Value::Boolean)),
        NotRegex => Box::new(|l, r, _| matches_pattern(NotRegex, l, r).map(|m| Value::Boolean(!m))),
        In => Box::new(|l, r, _| match r {
            Value::Array(items) => Ok(Value::Boolean(items.contains(l))),
            _ => Err(unsupported(In, l, r)),
        }),

        And => Box::new(|l, r, _| booleans(And, l, r).map(|(a, b)| Value::Boolean(a && b))),
        Or => Box::new(|l, r, _| booleans(Or, l, r).map(|(a, b)| Value::Boolean(a || b))),

        TernaryTrue => Box::new(|l, r, _| match l {
            Value::Boolean(true) => Ok(r.clone()),
            Value::Boolean(false) => Ok(Value::Null),
            _ => Err(unsupported(TernaryTrue, l, r)),
        }),
        TernaryFalse | Coalesce => Box::new(|l, r, _| {
            if l.is_null() {
                Ok(r.clone())
            } else {
                Ok(l.clone())
            }
        }),

        // Not binary; the planner never asks for these.
        Literal | Variable | Accessor | Function | Separator | Negate | Invert | BitwiseNot => {
            Box::new(move |l, r, _| Err(unsupported(symbol, l, r)))
        }
    }
}

/// Builds the stage for a binary operator.
pub fn binary(
    symbol: OperatorSymbol,
    left: EvaluationStage,
    right: EvaluationStage,
) -> EvaluationStage {
    use OperatorSymbol::*;
    let mut stage = EvaluationStage::leaf(symbol, binary_behaviour(symbol))
        .with_left(left)
        .with_right(right);

    match symbol {
        Plus => {
            stage.type_check = Some(is_addable);
            stage.type_error_format = NOT_ADDABLE;
        }
        Minus | Multiply | Divide | Modulus | Exponent | BitwiseAnd | BitwiseOr | BitwiseXor
        | ShiftLeft | ShiftRight => {
            stage.left_type_check = Some(is_number);
            stage.right_type_check = Some(is_number);
            stage.type_error_format = NOT_A_NUMBER;
        }
        Gt | GtEq | Lt | LtEq => {
            stage.type_check = Some(is_comparable);
            stage.type_error_format = NOT_COMPARABLE;
        }
        Regex | NotRegex => {
            stage.left_type_check = Some(is_string);
            stage.right_type_check = Some(is_string);
            stage.type_error_format = NOT_A_STRING;
        }
        In => {
            stage.right_type_check = Some(is_array);
            stage.type_error_format = NOT_AN_ARRAY;
        }
        And | Or => {
            stage.left_type_check = Some(is_bool);
            stage.right_type_check = Some(is_bool);
            stage.type_error_format = NOT_A_BOOLEAN;
        }
        TernaryTrue => {
            stage.left_type_check = Some(is_bool);
            stage.type_error_format = NOT_A_BOOLEAN;
        }
        _ => {}
    }
    stage
}

/// Builds the stage for a prefix operator. The operand is the right child.
pub fn prefix(symbol: OperatorSymbol, operand: EvaluationStage) -> EvaluationStage {
    use OperatorSymbol::*;
    let (behaviour, check, format): (StageOperator, fn(&Value) -> bool, &'static str) = match symbol {
        Invert => (
            Box::new(|_, r, _| match r {
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                _ => Err(unsupported(Invert, &Value::Null, r)),
            }),
            is_bool,
            NOT_A_BOOLEAN,
        ),
        BitwiseNot => (
            Box::new(|_, r, _| Ok(Value::Number(!(number(BitwiseNot, r)? as i64) as f64))),
            is_number,
            NOT_A_NUMBER,
        ),
        _ => (
            Box::new(|_, r, _| Ok(Value::Number(-number(Negate, r)?))),
            is_number,
            NOT_A_NUMBER,
        ),
    };

    let mut stage = EvaluationStage::leaf(symbol, behaviour).with_right(operand);
    stage.right_type_check = Some(check);
    stage.type_error_format = format;
    stage
}

pub fn literal(value: Value) -> EvaluationStage {
    EvaluationStage::leaf(
        OperatorSymbol::Literal,
        Box::new(move |_, _, _| Ok(value.clone())),
    )
}

fn lookup(symbol: OperatorSymbol, name: String) -> EvaluationStage {
    EvaluationStage::leaf(
        symbol,
        Box::new(move |_, _, params| {
            params
                .get(&name)
                .ok_or_else(|| EvalError::Lookup { name: name.clone() })
        }),
    )
}

pub fn variable(name: String) -> EvaluationStage {
    lookup(OperatorSymbol::Variable, name)
}

/// A dotted path is resolved as one name, e.g. `user.name`.
pub fn accessor(path: String) -> EvaluationStage {
    lookup(OperatorSymbol::Accessor, path)
}

/// A one-element list holding `item`.
pub fn separator(item: EvaluationStage) -> EvaluationStage {
    EvaluationStage::leaf(
        OperatorSymbol::Separator,
        Box::new(|l, _, _| Ok(Value::Array(vec![l.clone()]))),
    )
    .with_left(item)
}

/// Joins two list stages: the elements of `left` followed by those of
/// `right`.
pub fn join(left: EvaluationStage, right: EvaluationStage) -> EvaluationStage {
    EvaluationStage::leaf(
        OperatorSymbol::Separator,
        Box::new(|l, r, _| {
            let mut items = l.as_array().map(<[Value]>::to_vec).unwrap_or_default();
            items.extend(r.as_array().unwrap_or(&[]).iter().cloned());
            Ok(Value::Array(items))
        }),
    )
    .with_left(left)
    .with_right(right)
}

/// Calls `callable` with the elements of the argument list, or with no
/// arguments when `arguments` is absent.
pub fn function(
    name: String,
    callable: ExpressionFunction,
    arguments: Option<EvaluationStage>,
) -> EvaluationStage {
    let stage = EvaluationStage::leaf(
        OperatorSymbol::Function,
        Box::new(move |_, r, _| {
            let args = r.as_array().unwrap_or(&[]);
            callable(args).map_err(|message| EvalError::Function {
                name: name.clone(),
                message,
            })
        }),
    );

    match arguments {
        Some(arguments) => stage.with_right(arguments),
        None => stage,
    }
}
