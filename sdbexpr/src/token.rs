use std::fmt::Display;

use sdbspan::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Hex,
    Register,

    Plus,
    Minus,
    Star,
    Slash,

    EqEq,
    BangEq,
    AndAnd,

    /// Prefix `-`.
    Neg,
    /// Prefix `*`.
    Deref,

    LParen,
    RParen,
}

/// Binding strength of an operator, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    LogicalAnd,
    Equality,
    Additive,
    Multiplicative,
    Prefix,
}

impl TokenKind {
    /// `None` for anything that can never split an expression.
    #[must_use]
    pub const fn precedence(self) -> Option<Precedence> {
        match self {
            Self::AndAnd => Some(Precedence::LogicalAnd),
            Self::EqEq | Self::BangEq => Some(Precedence::Equality),
            Self::Plus | Self::Minus => Some(Precedence::Additive),
            Self::Star | Self::Slash => Some(Precedence::Multiplicative),
            Self::Neg | Self::Deref => Some(Precedence::Prefix),
            Self::Number | Self::Hex | Self::Register | Self::LParen | Self::RParen => None,
        }
    }

    #[must_use]
    pub const fn is_prefix(self) -> bool {
        matches!(self, Self::Neg | Self::Deref)
    }

    #[must_use]
    pub const fn is_operand(self) -> bool {
        matches!(self, Self::Number | Self::Hex | Self::Register)
    }

    /// Whether a `-` or `*` directly after this kind starts a prefix operator.
    #[must_use]
    pub const fn expects_operand(self) -> bool {
        !matches!(
            self,
            Self::Number | Self::Hex | Self::Register | Self::RParen
        )
    }

    /// Reading of a `-` or `*` in prefix position.
    #[must_use]
    pub const fn as_prefix(self) -> Self {
        match self {
            Self::Minus => Self::Neg,
            Self::Star => Self::Deref,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// The matched slice of the input.
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    #[must_use]
    pub const fn new(kind: TokenKind, text: &'a str, span: Span) -> Self {
        Self { kind, text, span }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Hex => write!(f, "hex number"),
            Self::Register => write!(f, "register"),

            Self::Plus => write!(f, "+"),
            Self::Minus | Self::Neg => write!(f, "-"),
            Self::Star | Self::Deref => write!(f, "*"),
            Self::Slash => write!(f, "/"),

            Self::EqEq => write!(f, "=="),
            Self::BangEq => write!(f, "!="),
            Self::AndAnd => write!(f, "&&"),

            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn precedence_order() {
        assert!(Precedence::LogicalAnd < Precedence::Equality);
        assert!(Precedence::Equality < Precedence::Additive);
        assert!(Precedence::Additive < Precedence::Multiplicative);
        assert!(Precedence::Multiplicative < Precedence::Prefix);
    }

    #[test]
    fn operands_have_no_precedence() {
        for kind in [
            TokenKind::Number,
            TokenKind::Hex,
            TokenKind::Register,
            TokenKind::LParen,
            TokenKind::RParen,
        ] {
            assert_eq!(kind.precedence(), None);
        }
        assert_eq!(TokenKind::Minus.precedence(), TokenKind::Plus.precedence());
        assert_eq!(TokenKind::Slash.precedence(), TokenKind::Star.precedence());
    }

    #[test]
    fn prefix_reading() {
        assert_eq!(TokenKind::Minus.as_prefix(), TokenKind::Neg);
        assert_eq!(TokenKind::Star.as_prefix(), TokenKind::Deref);
        assert_eq!(TokenKind::Plus.as_prefix(), TokenKind::Plus);
        assert!(TokenKind::LParen.expects_operand());
        assert!(TokenKind::Slash.expects_operand());
        assert!(!TokenKind::RParen.expects_operand());
        assert!(!TokenKind::Hex.expects_operand());
    }
}
