use sdbcpu::{Machine, Word};
use sdbspan::{Span, Spand};
use thiserror::Error;

use crate::arith;
use crate::ast::{InfixOp, Operator, PrefixOp};
use crate::locate::{is_fully_parenthesized, locate_main_operator};
use crate::token::{Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalErrorKind {
    #[error("expected an expression")]
    EmptySpan,
    #[error("expected a number")]
    NotANumber,
    #[error("number does not fit in a machine word")]
    LiteralOverflow,
    #[error("no main operator found")]
    NoOperatorFound,
    #[error("division by zero")]
    DivisionByZero,
    #[error("'{0}' cannot split an expression here")]
    UnsupportedOperator(TokenKind),
    #[error("unknown register '{0}'")]
    UnknownRegister(String),
    #[error("cannot read memory at {0:#010x}")]
    BadAddress(Word),
}

pub type EvalError = Spand<EvalErrorKind>;
pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluates inclusive token spans of one tokenized expression.
pub struct Evaluator<'t, 'a, M: ?Sized> {
    tokens:  &'t [Token<'a>],
    machine: &'t M,
}

impl<'t, 'a, M: Machine + ?Sized> Evaluator<'t, 'a, M> {
    #[must_use]
    pub const fn new(tokens: &'t [Token<'a>], machine: &'t M) -> Self {
        Self { tokens, machine }
    }

    /// Byte span covered by tokens `[p, q]`; for an empty span, the point
    /// right after token `q`.
    fn span(&self, p: usize, q: usize) -> Span {
        match (self.tokens.get(p), self.tokens.get(q)) {
            (Some(lo), Some(hi)) if p <= q => lo.span.join(hi.span),
            (_, Some(before)) => Span::point(before.span.hi()),
            (Some(after), None) => Span::point(after.span.lo()),
            (None, None) => self
                .tokens
                .last()
                .map_or_else(Span::default, |tk| Span::point(tk.span.hi())),
        }
    }

    fn error(&self, kind: EvalErrorKind, p: usize, q: usize) -> EvalError {
        EvalError::new(kind, self.span(p, q))
    }

    /// Evaluates every token.
    pub fn eval_all(&self) -> EvalResult<Word> {
        self.tokens.len().checked_sub(1).map_or_else(
            || Err(EvalError::new(EvalErrorKind::EmptySpan, Span::default())),
            |q| self.eval(0, q),
        )
    }

    pub fn eval(&self, p: usize, q: usize) -> EvalResult<Word> {
        if p > q {
            return Err(self.error(EvalErrorKind::EmptySpan, p, q));
        }

        if p == q {
            return self.eval_atom(p);
        }

        if is_fully_parenthesized(self.tokens, p, q) {
            return self.eval(p + 1, q - 1);
        }

        let op = locate_main_operator(self.tokens, p, q)
            .ok_or_else(|| self.error(EvalErrorKind::NoOperatorFound, p, q))?;
        let kind = self.tokens[op].kind;

        if let Some(prefix) = PrefixOp::from_token(kind) {
            if op != p {
                return Err(self.error(EvalErrorKind::UnsupportedOperator(kind), op, op));
            }
            let operand = self.eval(p + 1, q)?;
            return prefix
                .apply(operand, self.machine)
                .map_err(|kind| self.error(kind, p, q));
        }

        let infix = InfixOp::from_token(kind)
            .ok_or_else(|| self.error(EvalErrorKind::UnsupportedOperator(kind), op, op))?;

        let lhs = match op.checked_sub(1) {
            Some(end) => self.eval(p, end)?,
            None => {
                let at = Span::point(self.tokens[op].span.lo());
                return Err(EvalError::new(EvalErrorKind::EmptySpan, at));
            }
        };
        let rhs = self.eval(op + 1, q)?;

        infix.apply(lhs, rhs).map_err(|kind| self.error(kind, p, q))
    }

    fn eval_atom(&self, p: usize) -> EvalResult<Word> {
        let Some(tk) = self.tokens.get(p) else {
            return Err(self.error(EvalErrorKind::EmptySpan, p, p));
        };
        let value = match tk.kind {
            TokenKind::Number => arith::decimal(tk.text),
            TokenKind::Hex => arith::hex(tk.text),
            TokenKind::Register => arith::register(tk.text, self.machine),
            _ => Err(EvalErrorKind::NotANumber),
        };
        value.map_err(|kind| EvalError::new(kind, tk.span))
    }
}

/// Evaluates the inclusive span `[p, q]` of `tokens`.
pub fn eval_span<M: Machine + ?Sized>(
    tokens: &[Token<'_>],
    p: usize,
    q: usize,
    machine: &M,
) -> EvalResult<Word> {
    Evaluator::new(tokens, machine).eval(p, q)
}

#[cfg(test)]
mod test {
    use sdbcpu::memory::PMEM_BASE;
    use sdbcpu::{NoMachine, Riscv32};

    use super::*;
    use crate::lexer::tokenize;

    fn eval_with<M: Machine>(input: &str, machine: &M) -> EvalResult<Word> {
        let tokens = tokenize(input).unwrap();
        Evaluator::new(&tokens, machine).eval_all()
    }

    fn eval(input: &str) -> EvalResult<Word> {
        eval_with(input, &NoMachine)
    }

    fn eval_err(input: &str) -> EvalErrorKind {
        eval(input).unwrap_err().kind
    }

    #[test]
    fn numbers() {
        assert_eq!(eval("42"), Ok(42));
        assert_eq!(eval("0x2a"), Ok(42));
        assert_eq!(eval("4294967295"), Ok(Word::MAX));
    }

    #[test]
    fn nested_parentheses_are_peeled() {
        assert_eq!(eval("(7)"), Ok(7));
        assert_eq!(eval("(((7)))"), Ok(7));
        assert_eq!(eval("((1+2))"), Ok(3));
        assert_eq!(eval("((1)+(2))"), Ok(3));
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("2+3*4"), Ok(14));
        assert_eq!(eval("(2+3)*4"), Ok(20));
        assert_eq!(eval("(1+2)*3-4"), Ok(5));
        assert_eq!(eval("10-6/2"), Ok(7));
    }

    #[test]
    fn left_associativity() {
        assert_eq!(eval("8-3-2"), Ok(3));
        assert_eq!(eval("8/4/2"), Ok(1));
        assert_eq!(eval("1-2-3"), Ok(1u32.wrapping_sub(2).wrapping_sub(3)));
        assert_eq!(eval("64/4/2"), Ok(8));
        assert_eq!(eval("2*3/4"), Ok(1));
        assert_eq!(eval("2/3*4"), Ok(0));
        assert_eq!(eval("10-2+3"), Ok(11));
    }

    #[test]
    fn wraps_at_word_width() {
        assert_eq!(eval("0-1"), Ok(0xffff_ffff));
        assert_eq!(eval("4294967295+2"), Ok(1));
        assert_eq!(eval("65536*65536"), Ok(0));
        assert_eq!(eval("-1"), Ok(0xffff_ffff));
        assert_eq!(eval("--5"), Ok(5));
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("1+1==2"), Ok(1));
        assert_eq!(eval("1+1!=2"), Ok(0));
        assert_eq!(eval("1==1&&2==2"), Ok(1));
        assert_eq!(eval("1==1&&2==3"), Ok(0));
        assert_eq!(eval("3&&0"), Ok(0));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(eval_err("5/0"), EvalErrorKind::DivisionByZero);
        assert_eq!(eval_err("5/(3-3)"), EvalErrorKind::DivisionByZero);
        assert_eq!(eval_err("1+5/0*3"), EvalErrorKind::DivisionByZero);
    }

    #[test]
    fn unbalanced_parentheses() {
        assert_eq!(eval_err("(1+2"), EvalErrorKind::NoOperatorFound);
        assert_eq!(eval_err("1+2)"), EvalErrorKind::NoOperatorFound);
        assert_eq!(eval_err("((1)"), EvalErrorKind::NoOperatorFound);
        assert_eq!(eval_err(")("), EvalErrorKind::NoOperatorFound);
    }

    #[test]
    fn malformed() {
        assert_eq!(eval_err("1 2"), EvalErrorKind::NoOperatorFound);
        assert_eq!(eval_err("1+"), EvalErrorKind::EmptySpan);
        assert_eq!(eval_err("+1"), EvalErrorKind::EmptySpan);
        assert_eq!(eval_err("1++2"), EvalErrorKind::EmptySpan);
        assert_eq!(eval_err("()"), EvalErrorKind::EmptySpan);
        assert_eq!(eval_err("("), EvalErrorKind::NotANumber);
        assert_eq!(eval_err("-"), EvalErrorKind::NotANumber);
        assert_eq!(eval_err("4294967296"), EvalErrorKind::LiteralOverflow);
    }

    #[test]
    fn empty_input() {
        let err = eval("").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::EmptySpan);
        assert_eq!(err.span, Span::default());
    }

    #[test]
    fn error_spans() {
        let err = eval("1 + 20/0").unwrap_err();
        assert_eq!(err.span, Span::new(4, 8));

        let err = eval("1+").unwrap_err();
        assert_eq!(err.span, Span::point(2));

        let err = eval("7 + 99999999999").unwrap_err();
        assert_eq!(err.span, Span::new(4, 15));

        let err = eval("  +1").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::EmptySpan);
        assert_eq!(err.span, Span::point(2));
    }

    #[test]
    fn prefix_operator_away_from_span_start() {
        let tokens = [
            Token::new(TokenKind::Number, "1", Span::new(0, 1)),
            Token::new(TokenKind::Neg, "-", Span::new(1, 2)),
            Token::new(TokenKind::Number, "2", Span::new(2, 3)),
        ];

        let err = eval_span(&tokens, 0, 2, &NoMachine).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::UnsupportedOperator(TokenKind::Neg));
        assert_eq!(err.span, Span::new(1, 2));
        assert_eq!(err.to_string(), "'-' cannot split an expression here");

        assert_eq!(eval_span(&tokens, 1, 2, &NoMachine), Ok(2u32.wrapping_neg()));
    }

    #[test]
    fn first_error_wins() {
        assert_eq!(eval_err("1/0 + $nope"), EvalErrorKind::DivisionByZero);
        assert_eq!(
            eval_err("$nope + 1/0"),
            EvalErrorKind::UnknownRegister("$nope".to_string())
        );
    }

    #[test]
    fn sub_spans() {
        let tokens = tokenize("(1+2)*(3+4)").unwrap();
        assert_eq!(eval_span(&tokens, 0, 4, &NoMachine), Ok(3));
        assert_eq!(eval_span(&tokens, 6, 10, &NoMachine), Ok(7));
        assert_eq!(eval_span(&tokens, 0, 10, &NoMachine), Ok(21));
        assert_eq!(
            eval_span(&tokens, 5, 4, &NoMachine).unwrap_err().kind,
            EvalErrorKind::EmptySpan
        );
    }

    #[test]
    fn registers_and_memory() {
        let mut machine = Riscv32::new(64).unwrap();
        machine.regs.set_gpr(2, PMEM_BASE + 16);
        machine.regs.set_gpr(10, 5);

        assert_eq!(eval_with("$pc", &machine), Ok(PMEM_BASE));
        assert_eq!(eval_with("$a0 * 2 + 1", &machine), Ok(11));
        assert_eq!(eval_with("*$pc", &machine), Ok(0x0000_0297));
        assert_eq!(eval_with("*$sp", &machine), Ok(0xdead_beef));
        assert_eq!(eval_with("*($pc + 4)", &machine), Ok(0x0002_8823));
        assert_eq!(eval_with("*0x80000000 == 0x297", &machine), Ok(1));
        assert_eq!(eval_with("$0", &machine), Ok(0));
        assert_eq!(eval_with("-$a0", &machine), Ok(5u32.wrapping_neg()));

        assert_eq!(
            eval_with("$nope", &machine).unwrap_err().kind,
            EvalErrorKind::UnknownRegister("$nope".to_string())
        );
        assert_eq!(
            eval_with("*0", &machine).unwrap_err().kind,
            EvalErrorKind::BadAddress(0)
        );
    }

    #[test]
    fn idempotent() {
        for input in ["(1+2)*3-4", "5/0", "(1+2", "$pc"] {
            assert_eq!(eval(input), eval(input));
        }
    }
}
