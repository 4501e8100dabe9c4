use std::fmt;

use chrono::SecondsFormat;

use crate::value::Value;

/// Classification of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Number, including scientific and hexadecimal notation
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// 1e-3
    /// 0xFF
    /// ```
    Numeric,

    /// Quoted string (single or double quotes)
    String,

    /// `true` or `false`
    Boolean,

    /// Quoted string that parses as a date or timestamp
    ///
    /// # Examples
    /// ```text
    /// '2014-01-02'
    /// "2014-01-02T15:04:05Z"
    /// ```
    DateTime,

    /// `null`
    Null,

    // Names
    /// Variable reference, bare or bracketed
    ///
    /// # Examples
    /// ```text
    /// foo
    /// [response time]
    /// ```
    Variable,

    /// Name of a callable, recognised by a following `(`
    Function,

    /// Dotted path looked up as a single name (`user.name`)
    Accessor,

    // Structure
    /// `,`
    Separator,
    /// `(`
    ClauseOpen,
    /// `)`
    ClauseClose,
    /// `[`
    ArrayOpen,
    /// `]`
    ArrayClose,

    // Operators
    /// `&&` `||`
    LogicalOp,
    /// `==` `!=` `>` `>=` `<` `<=` `=~` `!~` `in`
    ComparatorOp,
    /// Unary `-` `!` `~`
    PrefixOp,
    /// `+` `-` `*` `/` `%` `**` `&` `|` `^` `<<` `>>`
    ModifierOp,
    /// `?` `:` `??`
    TernaryOp,
}

impl TokenKind {
    /// Literal and reference kinds: anything that yields a value on its own.
    pub fn is_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Numeric
                | TokenKind::String
                | TokenKind::Boolean
                | TokenKind::DateTime
                | TokenKind::Null
                | TokenKind::Variable
                | TokenKind::Accessor
        )
    }

    /// Operators that take a left and a right operand.
    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            TokenKind::LogicalOp
                | TokenKind::ComparatorOp
                | TokenKind::ModifierOp
                | TokenKind::TernaryOp
        )
    }

    pub fn is_operator(self) -> bool {
        self.is_binary_operator() || self == TokenKind::PrefixOp
    }
}

/// A single lexical unit.
///
/// The payload depends on the kind: literals carry their value, names carry a
/// [`Value::String`], and operators and punctuation carry their glyph as a
/// [`Value::String`].
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Value,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<Value>) -> Self {
        Token {
            kind,
            value: value.into(),
        }
    }

    /// Token whose payload is a glyph or a name.
    pub fn symbol(kind: TokenKind, text: &str) -> Self {
        Token::new(kind, Value::String(text.to_string()))
    }

    pub fn numeric(n: f64) -> Self {
        Token::new(TokenKind::Numeric, Value::Number(n))
    }

    pub fn string(s: &str) -> Self {
        Token::new(TokenKind::String, Value::String(s.to_string()))
    }

    pub fn boolean(b: bool) -> Self {
        Token::new(TokenKind::Boolean, Value::Boolean(b))
    }

    pub fn variable(name: &str) -> Self {
        Token::symbol(TokenKind::Variable, name)
    }

    /// Name or glyph payload, empty when the payload is not a string.
    pub fn text(&self) -> &str {
        self.value.as_str().unwrap_or("")
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !matches!(name, "true" | "false" | "null" | "in" | "IN")
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

/// Renders the token in source form, so that a token sequence joined with
/// spaces lexes back to an equivalent sequence.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (TokenKind::String, Value::String(s)) => write_quoted(f, s),
            (TokenKind::DateTime, Value::DateTime(dt)) => {
                write!(f, "\"{}\"", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            (TokenKind::Variable, Value::String(name)) if !is_plain_identifier(name) => {
                write!(f, "[{}]", name)
            }
            (_, value) => write!(f, "{}", value),
        }
    }
}
