//! Turns a validated, optimized token stream into a tree of evaluation
//! stages.
//!
//! Binary operators are parsed by precedence climbing over the levels of
//! [`Precedence`]. `**`, `?:` and `??` associate to the right, everything
//! else to the left. Parenthesised groups, array literals and function
//! arguments recurse and become a single operand.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;

use crate::{
    ast::{EvaluationStage, OperatorSymbol, Precedence, Token, TokenKind},
    operations,
    value::Value,
};

/// A user-supplied callable, invoked with the evaluated arguments.
pub type ExpressionFunction = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Callables available to an expression, by name.
pub type FunctionTable = HashMap<String, ExpressionFunction>;

/// Deepest allowed planner recursion. Each operand expression and each
/// prefix operator counts one level, so every level of `(1 + (...))` costs
/// two: one for the group and one for the right operand holding it.
pub const MAX_NESTING: usize = 256;

/// Deepest allowed stage tree.
pub const MAX_STAGE_DEPTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("unknown operator '{glyph}' at token {index}")]
    UnknownOperator { index: usize, glyph: String },

    #[error("unexpected token '{token}' at token {index}")]
    UnexpectedToken { index: usize, token: Token },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expected {expected} at token {index}")]
    Expected { index: usize, expected: &'static str },

    #[error("empty parentheses at token {index}")]
    EmptyClause { index: usize },

    #[error("expression nested too deeply (limit {limit})")]
    TooDeep { limit: usize },
}

struct Planner<'a> {
    tokens: &'a [Token],
    position: usize,
    functions: &'a FunctionTable,
    nesting: usize,
}

impl<'a> Planner<'a> {
    fn new(tokens: &'a [Token], functions: &'a FunctionTable) -> Self {
        Planner {
            tokens,
            position: 0,
            functions,
            nesting: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn enter(&mut self) -> Result<(), PlanError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(PlanError::TooDeep { limit: MAX_NESTING });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn checked(&self, stage: EvaluationStage) -> Result<EvaluationStage, PlanError> {
        if stage.depth() > MAX_STAGE_DEPTH {
            return Err(PlanError::TooDeep {
                limit: MAX_STAGE_DEPTH,
            });
        }
        Ok(stage)
    }

    fn operator_symbol(&self, token: &Token) -> Result<OperatorSymbol, PlanError> {
        OperatorSymbol::from_token(token.kind, token.text()).ok_or_else(|| {
            PlanError::UnknownOperator {
                index: self.position,
                glyph: token.text().to_string(),
            }
        })
    }

    /// The symbol of the next token if it is a binary operator.
    fn peek_binary(&self) -> Result<Option<OperatorSymbol>, PlanError> {
        match self.peek() {
            Some(token) if token.kind.is_binary_operator() => self.operator_symbol(token).map(Some),
            _ => Ok(None),
        }
    }

    /// Parses operators binding at least as tightly as `min`.
    fn parse_expression(&mut self, min: Precedence) -> Result<EvaluationStage, PlanError> {
        self.enter()?;
        let mut left = self.parse_unary()?;

        while let Some(symbol) = self.peek_binary()? {
            // `:` only ever closes a ternary opened by `?`
            if symbol == OperatorSymbol::TernaryFalse {
                break;
            }
            let Some(precedence) = symbol.precedence() else {
                break;
            };
            if precedence < min {
                break;
            }
            self.advance();

            if symbol == OperatorSymbol::TernaryTrue {
                left = self.parse_ternary(left)?;
                continue;
            }

            let right_min = if symbol.is_right_associative() {
                precedence
            } else {
                precedence.tighter().unwrap_or(precedence)
            };
            let right = self.parse_expression(right_min)?;
            left = self.checked(operations::binary(symbol, left, right))?;
        }

        self.leave();
        Ok(left)
    }

    /// Parses the branches after `?`. A missing `:` branch leaves a bare
    /// true-branch stage, which yields null when the condition is false.
    fn parse_ternary(&mut self, condition: EvaluationStage) -> Result<EvaluationStage, PlanError> {
        let then_branch = self.parse_expression(Precedence::Coalesce)?;
        let stage = self.checked(operations::binary(
            OperatorSymbol::TernaryTrue,
            condition,
            then_branch,
        ))?;

        if self.peek_binary()? == Some(OperatorSymbol::TernaryFalse) {
            self.advance();
            let else_branch = self.parse_expression(Precedence::Ternary)?;
            return self.checked(operations::binary(
                OperatorSymbol::TernaryFalse,
                stage,
                else_branch,
            ));
        }
        Ok(stage)
    }

    fn parse_unary(&mut self) -> Result<EvaluationStage, PlanError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::PrefixOp => {
                let symbol = self.operator_symbol(token)?;
                self.advance();
                self.enter()?;
                let operand = self.parse_unary()?;
                self.leave();
                self.checked(operations::prefix(symbol, operand))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<EvaluationStage, PlanError> {
        let index = self.position;
        let token = self.next().ok_or(PlanError::UnexpectedEnd)?;

        match token.kind {
            TokenKind::Numeric
            | TokenKind::String
            | TokenKind::Boolean
            | TokenKind::DateTime
            | TokenKind::Null => Ok(operations::literal(token.value.clone())),
            TokenKind::Variable => Ok(operations::variable(token.text().to_string())),
            TokenKind::Accessor => Ok(operations::accessor(token.text().to_string())),
            TokenKind::ClauseOpen => {
                let mut items = self.parse_list(TokenKind::ClauseClose)?;
                match items.len() {
                    0 => Err(PlanError::EmptyClause { index }),
                    1 => Ok(items.remove(0)),
                    _ => self.list(items),
                }
            }
            TokenKind::ArrayOpen => {
                let items = self.parse_list(TokenKind::ArrayClose)?;
                if items.is_empty() {
                    return Ok(operations::literal(Value::Array(Vec::new())));
                }
                self.list(items)
            }
            TokenKind::Function => {
                let name = token.text().to_string();
                let callable = self
                    .functions
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| PlanError::UnknownFunction { name: name.clone() })?;

                match self.next() {
                    Some(open) if open.kind == TokenKind::ClauseOpen => {}
                    _ => {
                        return Err(PlanError::Expected {
                            index: index + 1,
                            expected: "'(' after function name",
                        });
                    }
                }

                let items = self.parse_list(TokenKind::ClauseClose)?;
                let arguments = if items.is_empty() {
                    None
                } else {
                    Some(self.list(items)?)
                };
                self.checked(operations::function(name, callable, arguments))
            }
            _ => Err(PlanError::UnexpectedToken {
                index,
                token: token.clone(),
            }),
        }
    }

    /// Parses comma-separated expressions up to and including `close`.
    fn parse_list(&mut self, close: TokenKind) -> Result<Vec<EvaluationStage>, PlanError> {
        let mut items = Vec::new();
        if self.peek().is_some_and(|t| t.kind == close) {
            self.advance();
            return Ok(items);
        }

        loop {
            items.push(self.parse_expression(Precedence::Coalesce)?);

            let index = self.position;
            match self.next() {
                Some(token) if token.kind == TokenKind::Separator => {}
                Some(token) if token.kind == close => return Ok(items),
                Some(token) => {
                    return Err(PlanError::UnexpectedToken {
                        index,
                        token: token.clone(),
                    });
                }
                None => return Err(PlanError::UnexpectedEnd),
            }
        }
    }

    /// Combines non-empty `items` into a balanced tree of separator stages
    /// yielding an array, so a flat list of n items is O(log n) deep.
    fn list(&self, items: Vec<EvaluationStage>) -> Result<EvaluationStage, PlanError> {
        let mut level: Vec<EvaluationStage> = items.into_iter().map(operations::separator).collect();

        while level.len() > 1 {
            let mut joined = Vec::with_capacity(level.len().div_ceil(2));
            let mut stages = level.into_iter();
            while let Some(left) = stages.next() {
                match stages.next() {
                    Some(right) => joined.push(self.checked(operations::join(left, right))?),
                    None => joined.push(left),
                }
            }
            level = joined;
        }

        level.pop().ok_or(PlanError::UnexpectedEnd)
    }
}

/// Builds the stage tree for `tokens`, resolving function names against
/// `functions`.
///
/// An empty token stream has no tree and yields `Ok(None)`.
pub fn plan(
    tokens: &[Token],
    functions: &FunctionTable,
) -> Result<Option<EvaluationStage>, PlanError> {
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut planner = Planner::new(tokens, functions);
    let stage = planner.parse_expression(Precedence::Coalesce)?;

    if let Some(token) = planner.peek() {
        return Err(PlanError::UnexpectedToken {
            index: planner.position,
            token: token.clone(),
        });
    }
    Ok(Some(stage))
}
