use sdbcpu::{Machine, Word};
use sdbspan::Spand;

use crate::arith;
use crate::eval::{EvalError, EvalResult};
use crate::token::{Precedence, TokenKind};

pub trait Operator: Copy {
    fn from_token(kind: TokenKind) -> Option<Self>;
    fn precedence(self) -> Precedence;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    And,
}

impl Operator for PrefixOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Neg => Some(Self::Neg),
            TokenKind::Deref => Some(Self::Deref),
            _ => None,
        }
    }

    fn precedence(self) -> Precedence {
        Precedence::Prefix
    }
}

impl Operator for InfixOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Sub),
            TokenKind::Star => Some(Self::Mul),
            TokenKind::Slash => Some(Self::Div),
            TokenKind::EqEq => Some(Self::Eq),
            TokenKind::BangEq => Some(Self::Ne),
            TokenKind::AndAnd => Some(Self::And),
            _ => None,
        }
    }

    fn precedence(self) -> Precedence {
        match self {
            Self::And => Precedence::LogicalAnd,
            Self::Eq | Self::Ne => Precedence::Equality,
            Self::Add | Self::Sub => Precedence::Additive,
            Self::Mul | Self::Div => Precedence::Multiplicative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind<'a> {
    Number(&'a str),
    Hex(&'a str),
    Register(&'a str),

    Prefix {
        op:   PrefixOp,
        expr: Box<Expr<'a>>,
    },

    Infix {
        op:  InfixOp,
        lhs: Box<Expr<'a>>,
        rhs: Box<Expr<'a>>,
    },
}

pub type Expr<'a> = Spand<ExprKind<'a>>;

/// Folds a parsed tree to a value. Operands are evaluated left to right and
/// the first error ends the walk.
pub fn eval<M: Machine + ?Sized>(expr: &Expr<'_>, machine: &M) -> EvalResult<Word> {
    let value = match &expr.kind {
        ExprKind::Number(text) => arith::decimal(text),
        ExprKind::Hex(text) => arith::hex(text),
        ExprKind::Register(name) => arith::register(name, machine),
        ExprKind::Prefix { op, expr: operand } => {
            let operand = eval(operand, machine)?;
            op.apply(operand, machine)
        }
        ExprKind::Infix { op, lhs, rhs } => {
            let lhs = eval(lhs, machine)?;
            let rhs = eval(rhs, machine)?;
            op.apply(lhs, rhs)
        }
    };
    value.map_err(|kind| EvalError::new(kind, expr.span))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn operators_agree_with_token_precedence() {
        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::AndAnd,
        ] {
            let op = InfixOp::from_token(kind).unwrap();
            assert_eq!(Some(op.precedence()), kind.precedence());
            assert_eq!(PrefixOp::from_token(kind), None);
        }
        for kind in [TokenKind::Neg, TokenKind::Deref] {
            let op = PrefixOp::from_token(kind).unwrap();
            assert_eq!(Some(op.precedence()), kind.precedence());
            assert_eq!(InfixOp::from_token(kind), None);
        }
    }
}
