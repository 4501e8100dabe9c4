use std::fmt;

use crate::ast::TokenKind;

/// Every operation a stage can perform.
///
/// Operator tokens map onto exactly one symbol through
/// [`OperatorSymbol::from_token`]. The remaining symbols label leaf and
/// structural stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorSymbol {
    // Leaves and structure
    /// Literal value
    Literal,
    /// Variable lookup
    Variable,
    /// Dotted accessor lookup
    Accessor,
    /// Call of a user function
    Function,
    /// One link of an argument/element list
    Separator,

    // Prefix
    /// Unary minus (`-`)
    Negate,
    /// Logical not (`!`)
    Invert,
    /// Bitwise not (`~`)
    BitwiseNot,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Plus,
    /// Subtraction (`-`)
    Minus,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulus,
    /// Exponentiation (`**`)
    Exponent,

    // Bitwise
    /// Bitwise and (`&`)
    BitwiseAnd,
    /// Bitwise or (`|`)
    BitwiseOr,
    /// Bitwise xor (`^`)
    BitwiseXor,
    /// Left shift (`<<`)
    ShiftLeft,
    /// Right shift (`>>`)
    ShiftRight,

    // Comparison
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// Regex match (`=~`)
    Regex,
    /// Regex non-match (`!~`)
    NotRegex,
    /// Membership (`in`)
    In,

    // Logical
    /// `&&`
    And,
    /// `||`
    Or,

    // Ternary and null-coalescing
    /// `?` half of a ternary
    TernaryTrue,
    /// `:` half of a ternary
    TernaryFalse,
    /// `??`
    Coalesce,
}

/// Binding strength of binary operators, weakest first.
///
/// Prefix operators bind tighter than anything here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Coalesce,
    Ternary,
    Or,
    And,
    Bitwise,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Exponent,
}

impl Precedence {
    /// The next tighter level, used for the right operand of
    /// left-associative operators.
    pub fn tighter(self) -> Option<Precedence> {
        use Precedence::*;
        match self {
            Coalesce => Some(Ternary),
            Ternary => Some(Or),
            Or => Some(And),
            And => Some(Bitwise),
            Bitwise => Some(Equality),
            Equality => Some(Relational),
            Relational => Some(Shift),
            Shift => Some(Additive),
            Additive => Some(Multiplicative),
            Multiplicative => Some(Exponent),
            Exponent => None,
        }
    }
}

impl OperatorSymbol {
    /// Resolves an operator token to its symbol.
    ///
    /// Returns `None` when the kind is not an operator kind or the glyph is
    /// not one that kind admits.
    pub fn from_token(kind: TokenKind, glyph: &str) -> Option<OperatorSymbol> {
        use OperatorSymbol::*;
        let symbol = match (kind, glyph) {
            (TokenKind::PrefixOp, "-") => Negate,
            (TokenKind::PrefixOp, "!") => Invert,
            (TokenKind::PrefixOp, "~") => BitwiseNot,

            (TokenKind::ModifierOp, "+") => Plus,
            (TokenKind::ModifierOp, "-") => Minus,
            (TokenKind::ModifierOp, "*") => Multiply,
            (TokenKind::ModifierOp, "/") => Divide,
            (TokenKind::ModifierOp, "%") => Modulus,
            (TokenKind::ModifierOp, "**") => Exponent,
            (TokenKind::ModifierOp, "&") => BitwiseAnd,
            (TokenKind::ModifierOp, "|") => BitwiseOr,
            (TokenKind::ModifierOp, "^") => BitwiseXor,
            (TokenKind::ModifierOp, "<<") => ShiftLeft,
            (TokenKind::ModifierOp, ">>") => ShiftRight,

            (TokenKind::ComparatorOp, "==") => Eq,
            (TokenKind::ComparatorOp, "!=") => NotEq,
            (TokenKind::ComparatorOp, ">") => Gt,
            (TokenKind::ComparatorOp, ">=") => GtEq,
            (TokenKind::ComparatorOp, "<") => Lt,
            (TokenKind::ComparatorOp, "<=") => LtEq,
            (TokenKind::ComparatorOp, "=~") => Regex,
            (TokenKind::ComparatorOp, "!~") => NotRegex,
            (TokenKind::ComparatorOp, "in" | "IN") => In,

            (TokenKind::LogicalOp, "&&") => And,
            (TokenKind::LogicalOp, "||") => Or,

            (TokenKind::TernaryOp, "?") => TernaryTrue,
            (TokenKind::TernaryOp, ":") => TernaryFalse,
            (TokenKind::TernaryOp, "??") => Coalesce,

            _ => return None,
        };
        Some(symbol)
    }

    /// Binding strength of a binary operator; `None` for prefix, leaf and
    /// structural symbols.
    pub fn precedence(self) -> Option<Precedence> {
        use OperatorSymbol::*;
        let precedence = match self {
            Exponent => Precedence::Exponent,
            Multiply | Divide | Modulus => Precedence::Multiplicative,
            Plus | Minus => Precedence::Additive,
            ShiftLeft | ShiftRight => Precedence::Shift,
            Gt | GtEq | Lt | LtEq | In => Precedence::Relational,
            Eq | NotEq | Regex | NotRegex => Precedence::Equality,
            BitwiseAnd | BitwiseOr | BitwiseXor => Precedence::Bitwise,
            And => Precedence::And,
            Or => Precedence::Or,
            TernaryTrue | TernaryFalse => Precedence::Ternary,
            Coalesce => Precedence::Coalesce,
            _ => return None,
        };
        Some(precedence)
    }

    pub fn is_right_associative(self) -> bool {
        matches!(
            self,
            OperatorSymbol::Exponent
                | OperatorSymbol::TernaryTrue
                | OperatorSymbol::TernaryFalse
                | OperatorSymbol::Coalesce
        )
    }

    /// Whether the already-evaluated left operand can make evaluating the
    /// right operand unnecessary.
    pub fn is_short_circuitable(self) -> bool {
        matches!(
            self,
            OperatorSymbol::And
                | OperatorSymbol::Or
                | OperatorSymbol::Coalesce
                | OperatorSymbol::TernaryTrue
                | OperatorSymbol::TernaryFalse
        )
    }

    /// Word used for this operator's family in type error messages.
    pub fn role(self) -> &'static str {
        use OperatorSymbol::*;
        match self {
            Negate | Invert | BitwiseNot => "prefix",
            Plus | Minus | Multiply | Divide | Modulus | Exponent | BitwiseAnd | BitwiseOr
            | BitwiseXor | ShiftLeft | ShiftRight => "modifier",
            Eq | NotEq | Gt | GtEq | Lt | LtEq | Regex | NotRegex | In => "comparator",
            And | Or => "logical operator",
            TernaryTrue | TernaryFalse | Coalesce => "ternary operator",
            Literal | Variable | Accessor | Function | Separator => "stage",
        }
    }

    /// Display form used in error messages.
    pub fn glyph(self) -> &'static str {
        use OperatorSymbol::*;
        match self {
            Literal => "LITERAL",
            Variable => "VARIABLE",
            Accessor => "ACCESSOR",
            Function => "FUNCTION",
            Separator => ",",
            Negate => "-",
            Invert => "!",
            BitwiseNot => "~",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulus => "%",
            Exponent => "**",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            Eq => "==",
            NotEq => "!=",
            Gt => ">",
            GtEq => ">=",
            Lt => "<",
            LtEq => "<=",
            Regex => "=~",
            NotRegex => "!~",
            In => "in",
            And => "&&",
            Or => "||",
            TernaryTrue => "?",
            TernaryFalse => ":",
            Coalesce => "??",
        }
    }
}

impl fmt::Display for OperatorSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tokens_map_to_one_symbol() {
        assert_eq!(
            OperatorSymbol::from_token(TokenKind::PrefixOp, "-"),
            Some(OperatorSymbol::Negate)
        );
        assert_eq!(
            OperatorSymbol::from_token(TokenKind::ModifierOp, "-"),
            Some(OperatorSymbol::Minus)
        );
        assert_eq!(OperatorSymbol::from_token(TokenKind::ModifierOp, "=="), None);
    }

    #[test]
    fn test_precedence_order() {
        let mul = OperatorSymbol::Multiply.precedence().unwrap();
        let add = OperatorSymbol::Plus.precedence().unwrap();
        let coalesce = OperatorSymbol::Coalesce.precedence().unwrap();
        assert!(mul > add);
        assert!(add > coalesce);
        assert_eq!(Precedence::Exponent.tighter(), None);
    }
}
