use sdbcpu::{Machine, Word};
use sdbspan::Span;
use thiserror::Error;

use crate::eval::{EvalError, Evaluator};
use crate::lexer::{LexError, Lexer, MAX_TOKENS};
use crate::parser::{ParseError, Parser};

pub mod arith;
pub mod ast;
pub mod eval;
pub mod lexer;
pub mod locate;
pub mod parser;
pub mod token;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ExprError {
    /// Bytes of the expression the error points at.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Lex(err) => err.span,
            Self::Parse(err) => err.span,
            Self::Eval(err) => err.span,
        }
    }
}

/// How a token vector is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Recursive splitting of token spans at their main operator.
    #[default]
    Span,
    /// Precedence climbing into an [`ast::Expr`], then a tree walk.
    Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    strategy: Strategy,
    limit:    usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strategy: Strategy::Span,
            limit:    MAX_TOKENS,
        }
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn evaluate<M: Machine + ?Sized>(&self, input: &str, machine: &M) -> Result<Word, ExprError> {
        let tokens = Lexer::new(input).with_limit(self.limit).lex_all()?;

        let value = match self.strategy {
            Strategy::Span => Evaluator::new(&tokens, machine).eval_all()?,
            Strategy::Tree => {
                let expr = Parser::new(&tokens).parse()?;
                ast::eval(&expr, machine)?
            }
        };

        Ok(value)
    }
}

/// Evaluates `input` with the span strategy and the default token capacity.
pub fn evaluate<M: Machine + ?Sized>(input: &str, machine: &M) -> Result<Word, ExprError> {
    Engine::new().evaluate(input, machine)
}
