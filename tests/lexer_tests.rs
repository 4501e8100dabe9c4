// tests/lexer_tests.rs

use chrono::{TimeZone, Utc};
use sprig_lang::lexer::{Lexer, tokenize};
use sprig_lang::{Token, TokenKind, Value};

fn kinds(text: &str) -> Vec<TokenKind> {
    tokenize(text).unwrap().into_iter().map(|t| t.kind).collect()
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_binary_operator_tokens() {
    let test_cases = vec![
        ("+", TokenKind::ModifierOp),
        ("-", TokenKind::ModifierOp),
        ("*", TokenKind::ModifierOp),
        ("/", TokenKind::ModifierOp),
        ("%", TokenKind::ModifierOp),
        ("**", TokenKind::ModifierOp),
        ("&", TokenKind::ModifierOp),
        ("|", TokenKind::ModifierOp),
        ("^", TokenKind::ModifierOp),
        ("<<", TokenKind::ModifierOp),
        (">>", TokenKind::ModifierOp),
        ("==", TokenKind::ComparatorOp),
        ("!=", TokenKind::ComparatorOp),
        (">", TokenKind::ComparatorOp),
        (">=", TokenKind::ComparatorOp),
        ("<", TokenKind::ComparatorOp),
        ("<=", TokenKind::ComparatorOp),
        ("=~", TokenKind::ComparatorOp),
        ("!~", TokenKind::ComparatorOp),
        ("&&", TokenKind::LogicalOp),
        ("||", TokenKind::LogicalOp),
        ("?", TokenKind::TernaryOp),
        (":", TokenKind::TernaryOp),
        ("??", TokenKind::TernaryOp),
    ];

    for (glyph, kind) in test_cases {
        let tokens = tokenize(&format!("a {} b", glyph)).unwrap();
        assert_eq!(tokens.len(), 3, "glyph {}", glyph);
        assert_eq!(tokens[1], Token::symbol(kind, glyph), "glyph {}", glyph);
    }
}

#[test]
fn test_operators_without_whitespace() {
    assert_eq!(
        kinds("a<=b**2"),
        vec![
            TokenKind::Variable,
            TokenKind::ComparatorOp,
            TokenKind::Variable,
            TokenKind::ModifierOp,
            TokenKind::Numeric,
        ]
    );
}

#[test]
fn test_prefix_operators() {
    assert_eq!(kinds("-x"), vec![TokenKind::PrefixOp, TokenKind::Variable]);
    assert_eq!(kinds("!x"), vec![TokenKind::PrefixOp, TokenKind::Variable]);
    assert_eq!(kinds("~x"), vec![TokenKind::PrefixOp, TokenKind::Variable]);
    assert_eq!(
        kinds("(-1)"),
        vec![
            TokenKind::ClauseOpen,
            TokenKind::PrefixOp,
            TokenKind::Numeric,
            TokenKind::ClauseClose,
        ]
    );
    assert_eq!(
        kinds("f(1, -2)")[4],
        TokenKind::PrefixOp,
    );
}

#[test]
fn test_minus_after_operand_is_binary() {
    assert_eq!(
        kinds("a-1"),
        vec![TokenKind::Variable, TokenKind::ModifierOp, TokenKind::Numeric]
    );
    assert_eq!(
        kinds("(a) - 1")[3],
        TokenKind::ModifierOp
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    let test_cases = vec![
        ("42", 42.0),
        ("3.14", 3.14),
        ("1e-3", 0.001),
        ("1.5e2", 150.0),
        ("0xFF", 255.0),
        ("0x1f", 31.0),
        (".5", 0.5),
    ];

    for (input, expected) in test_cases {
        assert_eq!(tokenize(input).unwrap(), vec![Token::numeric(expected)], "input {}", input);
    }
}

#[test]
fn test_strings() {
    assert_eq!(tokenize("'hello'").unwrap(), vec![Token::string("hello")]);
    assert_eq!(tokenize("\"it's\"").unwrap(), vec![Token::string("it's")]);
    assert_eq!(tokenize(r"'a\nb'").unwrap(), vec![Token::string("a\nb")]);
    assert_eq!(tokenize(r"'O\'Brien'").unwrap(), vec![Token::string("O'Brien")]);
    assert_eq!(tokenize("''").unwrap(), vec![Token::string("")]);
}

#[test]
fn test_quoted_dates_become_datetime_tokens() {
    let day = Utc.with_ymd_and_hms(2014, 1, 2, 0, 0, 0).unwrap();
    assert_eq!(
        tokenize("'2014-01-02'").unwrap(),
        vec![Token::new(TokenKind::DateTime, day)]
    );

    let instant = Utc.with_ymd_and_hms(2014, 1, 2, 15, 4, 5).unwrap();
    assert_eq!(
        tokenize("\"2014-01-02T15:04:05Z\"").unwrap(),
        vec![Token::new(TokenKind::DateTime, instant)]
    );

    let offset = Utc.with_ymd_and_hms(2014, 1, 2, 13, 4, 5).unwrap();
    assert_eq!(
        tokenize("'2014-01-02T15:04:05+02:00'").unwrap(),
        vec![Token::new(TokenKind::DateTime, offset)]
    );
}

#[test]
fn test_non_date_strings_stay_strings() {
    assert_eq!(tokenize("'2014'").unwrap(), vec![Token::string("2014")]);
    assert_eq!(tokenize("'monday'").unwrap(), vec![Token::string("monday")]);
}

#[test]
fn test_keywords() {
    assert_eq!(
        tokenize("true false null").unwrap(),
        vec![
            Token::boolean(true),
            Token::boolean(false),
            Token::new(TokenKind::Null, Value::Null),
        ]
    );
    assert_eq!(
        tokenize("a IN b").unwrap()[1],
        Token::symbol(TokenKind::ComparatorOp, "in")
    );
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_variables() {
    assert_eq!(tokenize("foo_bar2").unwrap(), vec![Token::variable("foo_bar2")]);
    assert_eq!(
        tokenize("[response time]").unwrap(),
        vec![Token::variable("response time")]
    );
    assert_eq!(tokenize("[a-b]").unwrap(), vec![Token::variable("a-b")]);
}

#[test]
fn test_accessor() {
    assert_eq!(
        tokenize("user.name").unwrap(),
        vec![Token::symbol(TokenKind::Accessor, "user.name")]
    );
}

#[test]
fn test_function_names() {
    assert_eq!(
        tokenize("max(1)").unwrap()[0],
        Token::symbol(TokenKind::Function, "max")
    );
    assert_eq!(
        tokenize("max (1)").unwrap()[0],
        Token::symbol(TokenKind::Function, "max")
    );
}

#[test]
fn test_array_brackets() {
    assert_eq!(
        kinds("[1, 2]"),
        vec![
            TokenKind::ArrayOpen,
            TokenKind::Numeric,
            TokenKind::Separator,
            TokenKind::Numeric,
            TokenKind::ArrayClose,
        ]
    );
    assert_eq!(kinds("[]"), vec![TokenKind::ArrayOpen, TokenKind::ArrayClose]);
    assert_eq!(
        kinds("['a']"),
        vec![TokenKind::ArrayOpen, TokenKind::String, TokenKind::ArrayClose]
    );
    assert_eq!(
        kinds("[1]"),
        vec![TokenKind::ArrayOpen, TokenKind::Numeric, TokenKind::ArrayClose]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_string() {
    let err = tokenize("a == 'abc").unwrap_err();
    assert_eq!(err.position, 5);
}

#[test]
fn test_invalid_escape() {
    assert!(tokenize(r"'\q'").is_err());
}

#[test]
fn test_unrecognised_character() {
    let err = tokenize("a + $").unwrap_err();
    assert_eq!(err.position, 4);
}

#[test]
fn test_single_equals_is_rejected() {
    assert!(tokenize("a = 1").is_err());
}

#[test]
fn test_malformed_numbers() {
    assert!(tokenize("12abc").is_err());
    assert!(tokenize("1.2.3").is_err());
    assert!(tokenize("0xZZ").is_err());
}

#[test]
fn test_out_of_range_numbers() {
    let err = tokenize("1e400 > x").unwrap_err();
    assert_eq!(err.position, 0);
    assert!(err.reason.contains("invalid numeric literal"));
    assert!(tokenize("x < 1e308").is_ok());
}

// ============================================================================
// Streaming and round trip
// ============================================================================

#[test]
fn test_next_token_streams_until_end() {
    let mut lexer = Lexer::new("1 + 2");
    assert_eq!(lexer.next_token().unwrap(), Some(Token::numeric(1.0)));
    assert_eq!(
        lexer.next_token().unwrap(),
        Some(Token::symbol(TokenKind::ModifierOp, "+"))
    );
    assert_eq!(lexer.next_token().unwrap(), Some(Token::numeric(2.0)));
    assert_eq!(lexer.next_token().unwrap(), None);
}

#[test]
fn test_display_round_trips() {
    let inputs = vec![
        "[response time] > 3 && name == 'a\"b'",
        "-x ** 2 + 0.1",
        "'2014-01-02T15:04:05Z' > created",
        "max(a, 2) ?? null",
        "user.name =~ '^a' ? 1 : 0x10",
        "!flag || [x] in [1, 2]",
    ];

    for input in inputs {
        let tokens = tokenize(input).unwrap();
        let rendered = tokens
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(tokenize(&rendered).unwrap(), tokens, "input {}", input);
    }
}
