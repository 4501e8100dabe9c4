//! Structural checks run on a token stream before planning.
//!
//! Two independent passes: [`check_balance`] matches every closing
//! parenthesis/bracket against the most recent opener, and [`check_syntax`]
//! walks the stream through a table of legal token-kind transitions.

use thiserror::Error;

use crate::ast::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    /// A closer without a matching opener, a closer of the wrong kind, or
    /// an opener left open at the end of input.
    #[error("unbalanced parentheses at token {index}")]
    Unbalanced { index: usize },

    /// `current` may not follow `previous` (or start/end the expression
    /// when `previous`/`current` is absent).
    #[error("invalid token transition at token {index}: {} cannot {}", describe(.current), transition(.previous))]
    InvalidTransition {
        index: usize,
        previous: Option<TokenKind>,
        current: Option<TokenKind>,
    },

    /// A `,` outside any parentheses or brackets.
    #[error("separator outside of a clause or array at token {index}")]
    StraySeparator { index: usize },
}

fn describe(kind: &Option<TokenKind>) -> String {
    match kind {
        Some(kind) => format!("{:?}", kind),
        None => "end of expression".to_string(),
    }
}

fn transition(previous: &Option<TokenKind>) -> String {
    match previous {
        Some(kind) => format!("follow {:?}", kind),
        None => "start an expression".to_string(),
    }
}

/// Verifies that parentheses and brackets nest properly.
pub fn check_balance(tokens: &[Token]) -> Result<(), SyntaxError> {
    let mut openers = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::ClauseOpen | TokenKind::ArrayOpen => openers.push((token.kind, index)),
            TokenKind::ClauseClose | TokenKind::ArrayClose => {
                let expected = if token.kind == TokenKind::ClauseClose {
                    TokenKind::ClauseOpen
                } else {
                    TokenKind::ArrayOpen
                };
                match openers.pop() {
                    Some((kind, _)) if kind == expected => {}
                    _ => return Err(SyntaxError::Unbalanced { index }),
                }
            }
            _ => {}
        }
    }

    match openers.pop() {
        Some((_, index)) => Err(SyntaxError::Unbalanced { index }),
        None => Ok(()),
    }
}

/// Kinds that may begin an operand: literals, references, calls, groups and
/// prefix operators.
fn starts_operand(kind: TokenKind) -> bool {
    kind.is_operand()
        || matches!(
            kind,
            TokenKind::PrefixOp | TokenKind::Function | TokenKind::ClauseOpen | TokenKind::ArrayOpen
        )
}

/// Kinds that complete an operand.
fn ends_operand(kind: TokenKind) -> bool {
    kind.is_operand() || matches!(kind, TokenKind::ClauseClose | TokenKind::ArrayClose)
}

/// The transition table: may `next` directly follow `kind`?
fn can_follow(kind: TokenKind, next: TokenKind) -> bool {
    use TokenKind::*;
    match kind {
        _ if ends_operand(kind) => {
            next.is_binary_operator() || matches!(next, ClauseClose | ArrayClose | Separator)
        }
        Function => next == ClauseOpen,
        ClauseOpen => starts_operand(next) || next == ClauseClose,
        ArrayOpen => starts_operand(next) || next == ArrayClose,
        Separator | PrefixOp | LogicalOp | ComparatorOp | ModifierOp | TernaryOp => {
            starts_operand(next)
        }
        _ => false,
    }
}

/// Walks the token stream through the transition table.
///
/// The first token must be able to start an operand and the last must
/// complete one; `,` is legal only inside parentheses or brackets.
pub fn check_syntax(tokens: &[Token]) -> Result<(), SyntaxError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Ok(());
    };

    if !starts_operand(first.kind) {
        return Err(SyntaxError::InvalidTransition {
            index: 0,
            previous: None,
            current: Some(first.kind),
        });
    }

    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::ClauseOpen | TokenKind::ArrayOpen => depth += 1,
            TokenKind::ClauseClose | TokenKind::ArrayClose => depth = depth.saturating_sub(1),
            TokenKind::Separator if depth == 0 => {
                return Err(SyntaxError::StraySeparator { index });
            }
            _ => {}
        }

        if let Some(next) = tokens.get(index + 1)
            && !can_follow(token.kind, next.kind)
        {
            return Err(SyntaxError::InvalidTransition {
                index: index + 1,
                previous: Some(token.kind),
                current: Some(next.kind),
            });
        }
    }

    if !ends_operand(last.kind) {
        return Err(SyntaxError::InvalidTransition {
            index: tokens.len(),
            previous: Some(last.kind),
            current: None,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn syntax(text: &str) -> Result<(), SyntaxError> {
        let tokens = tokenize(text).unwrap();
        check_balance(&tokens)?;
        check_syntax(&tokens)
    }

    #[test]
    fn test_well_formed() {
        assert!(syntax("(1 + 2) * -foo").is_ok());
        assert!(syntax("f(1, [2, 3])").is_ok());
        assert!(syntax("").is_ok());
    }

    #[test]
    fn test_binary_operator_cannot_start() {
        assert!(matches!(
            syntax("* 2"),
            Err(SyntaxError::InvalidTransition { index: 0, .. })
        ));
    }

    #[test]
    fn test_operator_cannot_end() {
        assert!(matches!(
            syntax("1 +"),
            Err(SyntaxError::InvalidTransition { current: None, .. })
        ));
    }

    #[test]
    fn test_mismatched_closer() {
        assert_eq!(syntax("(1]"), Err(SyntaxError::Unbalanced { index: 2 }));
    }
}
