use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::{
    ast::{Token, TokenKind},
    value::Value,
};

/// A malformed literal or unrecognised character.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason} at position {position}")]
pub struct LexError {
    /// Character offset into the source text
    pub position: usize,
    pub reason: String,
}

/// Timestamp layouts a quoted string is tried against, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Operator and punctuation glyphs. Two-character glyphs come first so the
/// longest match wins.
const GLYPHS: &[&str] = &[
    "**", "==", "!=", ">=", "<=", "&&", "||", "<<", ">>", "=~", "!~", "??", "+", "-", "*", "/",
    "%", ">", "<", "!", "&", "|", "^", "~", "?", ":", ",", "(", ")",
];

/// Parses the fixed set of date/time literal layouts.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Kind of the previously produced token, used to tell prefix operators
    /// from binary ones.
    last_kind: Option<TokenKind>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            last_kind: None,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> LexError {
        LexError {
            position,
            reason: reason.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn next_non_whitespace(&self) -> Option<char> {
        self.input[self.position..]
            .iter()
            .copied()
            .find(|c| !c.is_whitespace())
    }

    /// A `-`, `!` or `~` here negates what follows rather than subtracting.
    fn in_prefix_position(&self) -> bool {
        match self.last_kind {
            None => true,
            Some(kind) => {
                kind.is_operator()
                    || matches!(
                        kind,
                        TokenKind::ClauseOpen | TokenKind::ArrayOpen | TokenKind::Separator
                    )
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else if ch == '.' && self.peek_char(1).is_some_and(|c| c.is_alphabetic() || c == '_')
            {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(self.error(
                                self.position,
                                format!("invalid escape sequence '\\{}'", ch),
                            ));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error(start, "unterminated string"))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;

        if self.current_char() == Some('0') && matches!(self.peek_char(1), Some('x' | 'X')) {
            self.advance();
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.current_char().filter(|c| c.is_ascii_alphanumeric()) {
                digits.push(ch);
                self.advance();
            }
            return u64::from_str_radix(&digits, 16)
                .map(|n| Token::numeric(n as f64))
                .map_err(|_| self.error(start, format!("invalid hexadecimal literal '0x{}'", digits)));
        }

        let mut number = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || ch == '.' {
                number.push(ch);
                self.advance();
            } else if matches!(ch, 'e' | 'E')
                && (self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
                    || (matches!(self.peek_char(1), Some('+' | '-'))
                        && self.peek_char(2).is_some_and(|c| c.is_ascii_digit())))
            {
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
                while let Some(digit) = self.current_char().filter(|c| c.is_ascii_digit()) {
                    number.push(digit);
                    self.advance();
                }
                break;
            } else {
                break;
            }
        }

        if self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            return Err(self.error(start, format!("invalid numeric literal '{}'", number)));
        }

        match number.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::numeric(n)),
            _ => Err(self.error(start, format!("invalid numeric literal '{}'", number))),
        }
    }

    /// Decides whether `[` starts a bracketed variable name, and if so
    /// returns the name and the offset of the closing `]`.
    fn bracketed_name(&self) -> Option<(String, usize)> {
        let close = self.input[self.position + 1..]
            .iter()
            .position(|&c| c == ']')?
            + self.position
            + 1;
        let name: String = self.input[self.position + 1..close].iter().collect();
        let trimmed = name.trim();
        let reserved = name.chars().any(|c| matches!(c, ',' | '\'' | '"' | '(' | ')' | '['));
        let literal = trimmed.parse::<f64>().is_ok()
            || trimmed.starts_with("0x")
            || matches!(trimmed, "true" | "false" | "null");
        (!trimmed.is_empty() && !reserved && !literal).then_some((name, close))
    }

    fn read_glyph(&mut self) -> Option<&'static str> {
        GLYPHS.iter().copied().find(|glyph| {
            glyph
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek_char(i) == Some(c))
        })
    }

    fn glyph_token(&self, glyph: &str) -> Token {
        let kind = match glyph {
            "," => TokenKind::Separator,
            "(" => TokenKind::ClauseOpen,
            ")" => TokenKind::ClauseClose,
            "-" if self.in_prefix_position() => TokenKind::PrefixOp,
            "!" | "~" => TokenKind::PrefixOp,
            "&&" | "||" => TokenKind::LogicalOp,
            "==" | "!=" | ">" | ">=" | "<" | "<=" | "=~" | "!~" => TokenKind::ComparatorOp,
            "?" | ":" | "??" => TokenKind::TernaryOp,
            _ => TokenKind::ModifierOp,
        };
        Token::symbol(kind, glyph)
    }

    fn scan_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => return Ok(None),
            Some(quote @ ('"' | '\'')) => {
                let s = self.read_string(quote)?;
                match parse_datetime(&s) {
                    Some(dt) => Token::new(TokenKind::DateTime, Value::DateTime(dt)),
                    None => Token::new(TokenKind::String, Value::String(s)),
                }
            }
            Some('[') => match self.bracketed_name() {
                Some((name, close)) => {
                    self.position = close + 1;
                    Token::variable(&name)
                }
                None => {
                    self.advance();
                    Token::symbol(TokenKind::ArrayOpen, "[")
                }
            },
            Some(']') => {
                self.advance();
                Token::symbol(TokenKind::ArrayClose, "]")
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "true" => Token::boolean(true),
                    "false" => Token::boolean(false),
                    "null" => Token::new(TokenKind::Null, Value::Null),
                    "in" | "IN" => Token::symbol(TokenKind::ComparatorOp, "in"),
                    _ if self.next_non_whitespace() == Some('(') && !ident.contains('.') => {
                        Token::symbol(TokenKind::Function, &ident)
                    }
                    _ if ident.contains('.') => Token::symbol(TokenKind::Accessor, &ident),
                    _ => Token::variable(&ident),
                }
            }
            Some(ch) => match self.read_glyph() {
                Some(glyph) => {
                    self.position += glyph.chars().count();
                    self.glyph_token(glyph)
                }
                None if ch == '=' => {
                    return Err(self.error(start, "unexpected '=' (did you mean '=='?)"));
                }
                None => {
                    return Err(self.error(start, format!("unexpected character '{}'", ch)));
                }
            },
        };

        self.last_kind = Some(token.kind);
        Ok(Some(token))
    }

    /// Produces the next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.scan_token()
    }
}

/// Scans the whole text into tokens.
///
/// # Examples
///
/// ```
/// use sprig_lang::{Token, TokenKind, lexer::tokenize};
///
/// let tokens = tokenize("foo >= 1.5e2").unwrap();
/// assert_eq!(tokens, vec![
///     Token::variable("foo"),
///     Token::symbol(TokenKind::ComparatorOp, ">="),
///     Token::numeric(150.0),
/// ]);
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[test]
fn test_keywords() {
    let tokens = tokenize("true false null in IN").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::boolean(true),
            Token::boolean(false),
            Token::new(TokenKind::Null, Value::Null),
            Token::symbol(TokenKind::ComparatorOp, "in"),
            Token::symbol(TokenKind::ComparatorOp, "in"),
        ]
    );
}

#[test]
fn test_prefix_minus_after_operator() {
    let tokens = tokenize("2 - -3").unwrap();
    assert_eq!(tokens[1].kind, TokenKind::ModifierOp);
    assert_eq!(tokens[2].kind, TokenKind::PrefixOp);
}
