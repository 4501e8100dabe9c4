//! Rendering of an expression's tokens as an SQL `WHERE` fragment.
//!
//! ```
//! use sprig_lang::Expression;
//!
//! let expr = Expression::new("age >= 18 && name != 'root'").unwrap();
//! assert_eq!(expr.to_sql_query().unwrap(), "[age] >= 18 AND [name] <> 'root'");
//! ```

use std::fmt::Write;

use thiserror::Error;

use crate::{
    ast::{Token, TokenKind},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// The token has no SQL equivalent
    #[error("'{glyph}' cannot be rendered as SQL")]
    Unsupported { glyph: String },

    /// The date query format is not a valid chrono format string
    #[error("invalid date format '{format}'")]
    InvalidDateFormat { format: String },
}

fn unsupported(token: &Token) -> SqlError {
    SqlError::Unsupported {
        glyph: token.to_string(),
    }
}

fn render_token(token: &Token, date_format: &str) -> Result<String, SqlError> {
    let rendered = match (token.kind, &token.value) {
        (TokenKind::String, Value::String(s)) => format!("'{}'", s.replace('\'', "''")),
        (TokenKind::DateTime, Value::DateTime(dt)) => {
            let mut quoted = String::from("'");
            write!(quoted, "{}", dt.format(date_format)).map_err(|_| {
                SqlError::InvalidDateFormat {
                    format: date_format.to_string(),
                }
            })?;
            quoted.push('\'');
            quoted
        }
        (TokenKind::Numeric, Value::Number(n)) => n.to_string(),
        (TokenKind::Boolean, Value::Boolean(b)) => (if *b { "1" } else { "0" }).to_string(),
        (TokenKind::Null, _) => "NULL".to_string(),
        (TokenKind::Variable, _) => format!("[{}]", token.text()),
        (TokenKind::ClauseOpen | TokenKind::ArrayOpen, _) => "(".to_string(),
        (TokenKind::ClauseClose | TokenKind::ArrayClose, _) => ")".to_string(),
        (TokenKind::Separator, _) => ",".to_string(),
        (TokenKind::LogicalOp, _) => match token.text() {
            "&&" => "AND".to_string(),
            "||" => "OR".to_string(),
            _ => return Err(unsupported(token)),
        },
        (TokenKind::PrefixOp, _) => match token.text() {
            "!" => "NOT".to_string(),
            glyph @ ("-" | "~") => glyph.to_string(),
            _ => return Err(unsupported(token)),
        },
        (TokenKind::ComparatorOp, _) => match token.text() {
            "==" => "=".to_string(),
            "!=" => "<>".to_string(),
            "=~" => "RLIKE".to_string(),
            "!~" => "NOT RLIKE".to_string(),
            "in" => "IN".to_string(),
            glyph => glyph.to_string(),
        },
        (TokenKind::ModifierOp, _) => match token.text() {
            "**" => return Err(unsupported(token)),
            glyph => glyph.to_string(),
        },
        _ => return Err(unsupported(token)),
    };
    Ok(rendered)
}

/// Renders `tokens` as SQL, formatting date-times with the chrono
/// `date_format`.
///
/// Ternaries, `??`, `**`, function calls and accessors have no SQL form and
/// fail with [`SqlError::Unsupported`].
pub fn render_sql(tokens: &[Token], date_format: &str) -> Result<String, SqlError> {
    let mut out = String::new();
    let mut glue = false;

    for token in tokens {
        let rendered = render_token(token, date_format)?;
        let tight_before = matches!(
            token.kind,
            TokenKind::ClauseClose | TokenKind::ArrayClose | TokenKind::Separator
        );
        if glue && !tight_before {
            out.push(' ');
        }
        out.push_str(&rendered);
        // prefix `-`/`~` and openers sit flush against what follows
        glue = !matches!(
            token.kind,
            TokenKind::ClauseOpen | TokenKind::ArrayOpen
        ) && !(token.kind == TokenKind::PrefixOp && token.text() != "!");
    }

    Ok(out)
}
