//! Word arithmetic shared by both evaluation strategies. Everything wraps at
//! the machine word width, as the registers do.

use std::num::IntErrorKind;

use sdbcpu::{Machine, Word};

use crate::ast::{InfixOp, PrefixOp};
use crate::eval::EvalErrorKind;

fn literal(text: &str, radix: u32) -> Result<Word, EvalErrorKind> {
    Word::from_str_radix(text, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => EvalErrorKind::LiteralOverflow,
        _ => EvalErrorKind::NotANumber,
    })
}

pub fn decimal(text: &str) -> Result<Word, EvalErrorKind> {
    literal(text, 10)
}

/// `text` still carries its `0x` prefix.
pub fn hex(text: &str) -> Result<Word, EvalErrorKind> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or(EvalErrorKind::NotANumber)?;
    literal(digits, 16)
}

pub fn register<M: Machine + ?Sized>(name: &str, machine: &M) -> Result<Word, EvalErrorKind> {
    machine
        .register(name)
        .ok_or_else(|| EvalErrorKind::UnknownRegister(name.to_string()))
}

impl InfixOp {
    pub fn apply(self, lhs: Word, rhs: Word) -> Result<Word, EvalErrorKind> {
        match self {
            Self::Add => Ok(lhs.wrapping_add(rhs)),
            Self::Sub => Ok(lhs.wrapping_sub(rhs)),
            Self::Mul => Ok(lhs.wrapping_mul(rhs)),
            Self::Div => lhs.checked_div(rhs).ok_or(EvalErrorKind::DivisionByZero),
            Self::Eq => Ok(Word::from(lhs == rhs)),
            Self::Ne => Ok(Word::from(lhs != rhs)),
            Self::And => Ok(Word::from(lhs != 0 && rhs != 0)),
        }
    }
}

impl PrefixOp {
    pub fn apply<M: Machine + ?Sized>(self, operand: Word, machine: &M) -> Result<Word, EvalErrorKind> {
        match self {
            Self::Neg => Ok(operand.wrapping_neg()),
            Self::Deref => machine
                .read_word(operand)
                .ok_or(EvalErrorKind::BadAddress(operand)),
        }
    }
}
