//! Constant folding on the token stream.
//!
//! A prefix operator directly applied to a literal is replaced by a single
//! literal token: `-` on a number, `!` on a boolean and `~` on an integral
//! number. Everything else passes through untouched; binary operations
//! between literals are not folded.

use thiserror::Error;

use crate::{
    ast::{Token, TokenKind},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    #[error("cannot apply '~' to non-integral literal {value} at token {index}")]
    NonIntegralBitwiseNot { index: usize, value: f64 },
}

fn fold(prefix: &Token, operand: &Token, index: usize) -> Result<Option<Token>, OptimizeError> {
    let folded = match (prefix.text(), operand.kind, &operand.value) {
        ("-", TokenKind::Numeric, Value::Number(n)) => Token::numeric(-n),
        ("!", TokenKind::Boolean, Value::Boolean(b)) => Token::boolean(!b),
        ("~", TokenKind::Numeric, Value::Number(n)) => {
            if n.fract() != 0.0 || !n.is_finite() {
                return Err(OptimizeError::NonIntegralBitwiseNot { index, value: *n });
            }
            Token::numeric(!(*n as i64) as f64)
        }
        _ => return Ok(None),
    };
    Ok(Some(folded))
}

/// Folds prefix operators applied to literals.
///
/// The literal must be the whole operand: `-2 ** 2` folds to `(-2) ** 2`
/// because prefix operators bind tighter than `**`.
pub fn optimize(tokens: Vec<Token>) -> Result<Vec<Token>, OptimizeError> {
    let mut optimized: Vec<Token> = Vec::with_capacity(tokens.len());

    for (index, token) in tokens.into_iter().enumerate() {
        push_folding(&mut optimized, token, index)?;
    }

    Ok(optimized)
}

/// Pushes `token`, first folding it into any prefix operators before it.
/// A chain like `- - 1` folds from the inside out.
fn push_folding(
    optimized: &mut Vec<Token>,
    mut token: Token,
    index: usize,
) -> Result<(), OptimizeError> {
    while let Some(prefix) = optimized.last()
        && prefix.kind == TokenKind::PrefixOp
        && let Some(folded) = fold(prefix, &token, index)?
    {
        optimized.pop();
        token = folded;
    }
    optimized.push(token);
    Ok(())
}
