// tests/validator_tests.rs

use sprig_lang::lexer::tokenize;
use sprig_lang::validator::{check_balance, check_syntax};
use sprig_lang::{CompileError, Expression, SyntaxError, TokenKind};

fn validate(text: &str) -> Result<(), SyntaxError> {
    let tokens = tokenize(text).unwrap();
    check_balance(&tokens)?;
    check_syntax(&tokens)
}

// ============================================================================
// Balance
// ============================================================================

#[test]
fn test_unclosed_paren() {
    assert_eq!(validate("(1 + 2"), Err(SyntaxError::Unbalanced { index: 0 }));
}

#[test]
fn test_unopened_paren() {
    assert_eq!(validate("1 + 2)"), Err(SyntaxError::Unbalanced { index: 3 }));
}

#[test]
fn test_unclosed_array() {
    assert!(matches!(validate("[1, 2"), Err(SyntaxError::Unbalanced { .. })));
}

#[test]
fn test_crossed_brackets() {
    assert!(matches!(validate("([1, 2)]"), Err(SyntaxError::Unbalanced { .. })));
}

#[test]
fn test_nested_groups_balance() {
    assert!(validate("((1 + (2)) * [3, (4)])").is_ok());
}

// ============================================================================
// Adjacency
// ============================================================================

#[test]
fn test_valid_expressions() {
    let inputs = vec![
        "1 + 2",
        "-1",
        "!!flag",
        "1 + -2",
        "-(a)",
        "f()",
        "f(1, [2, 3], (4))",
        "a ? b : c",
        "a ?? b",
        "x in (1, 2, 3)",
        "[]",
        "()",
    ];

    for input in inputs {
        assert!(validate(input).is_ok(), "input {}", input);
    }
}

#[test]
fn test_adjacent_operands() {
    assert_eq!(
        validate("1 2"),
        Err(SyntaxError::InvalidTransition {
            index: 1,
            previous: Some(TokenKind::Numeric),
            current: Some(TokenKind::Numeric),
        })
    );
}

#[test]
fn test_adjacent_binary_operators() {
    assert_eq!(
        validate("1 + * 2"),
        Err(SyntaxError::InvalidTransition {
            index: 2,
            previous: Some(TokenKind::ModifierOp),
            current: Some(TokenKind::ModifierOp),
        })
    );
}

#[test]
fn test_prefix_after_operand() {
    assert!(matches!(
        validate("a ! b"),
        Err(SyntaxError::InvalidTransition { index: 1, .. })
    ));
}

#[test]
fn test_cannot_start_with_binary_operator() {
    assert_eq!(
        validate("&& a"),
        Err(SyntaxError::InvalidTransition {
            index: 0,
            previous: None,
            current: Some(TokenKind::LogicalOp),
        })
    );
}

#[test]
fn test_cannot_end_with_operator() {
    assert_eq!(
        validate("a ?"),
        Err(SyntaxError::InvalidTransition {
            index: 2,
            previous: Some(TokenKind::TernaryOp),
            current: None,
        })
    );
    assert!(validate("-").is_err());
}

#[test]
fn test_operator_before_closer() {
    assert!(matches!(
        validate("(1 +)"),
        Err(SyntaxError::InvalidTransition { index: 3, .. })
    ));
}

#[test]
fn test_separator_outside_clause() {
    assert_eq!(validate("1, 2"), Err(SyntaxError::StraySeparator { index: 1 }));
}

#[test]
fn test_dangling_separator() {
    assert!(validate("f(1,)").is_err());
    assert!(validate("[,1]").is_err());
}

#[test]
fn test_empty_input_is_valid() {
    assert!(validate("").is_ok());
}

// ============================================================================
// Through the compiler
// ============================================================================

#[test]
fn test_compile_reports_syntax_errors() {
    assert!(matches!(
        Expression::new("(1 + 2"),
        Err(CompileError::Syntax(SyntaxError::Unbalanced { .. }))
    ));
    assert!(matches!(
        Expression::new("1 + 2)"),
        Err(CompileError::Syntax(SyntaxError::Unbalanced { .. }))
    ));
    assert!(matches!(
        Expression::new("1 +"),
        Err(CompileError::Syntax(SyntaxError::InvalidTransition { .. }))
    ));
}

#[test]
fn test_error_message() {
    let err = validate("1 2").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid token transition at token 1: Numeric cannot follow Numeric"
    );
}
