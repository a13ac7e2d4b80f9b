use sdbspan::{Span, Spand};
use thiserror::Error;

use crate::ast::{Expr, ExprKind, InfixOp, Operator, PrefixOp};
use crate::token::{Precedence, Token, TokenKind};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("expected expression")]
    ExpectedExpr,
    #[error("expected '{0}'")]
    Expected(TokenKind),
    #[error("unexpected input after expression")]
    TrailingInput,
}

pub type ParseError = Spand<ParseErrorKind>;
pub type ParseResult<T> = Result<T, ParseError>;

/// Precedence climbing over a token slice; linear in the number of tokens.
pub struct Parser<'t, 'a> {
    tokens:  &'t [Token<'a>],
    current: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    #[must_use]
    pub const fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, current: 0 }
    }

    fn last_span(&self) -> Span {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .map(|tk| tk.span)
            .unwrap_or_default()
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.current).copied()
    }

    const fn eat(&mut self) {
        self.current += 1;
    }

    fn next(&mut self) -> ParseResult<Token<'a>> {
        let tk = self
            .peek()
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnexpectedEnd, self.last_span()))?;
        self.current += 1;
        Ok(tk)
    }

    fn expect(&mut self, expect: TokenKind) -> ParseResult<Span> {
        let Token { kind, span, .. } = self
            .next()
            .map_err(|err| ParseError::new(ParseErrorKind::Expected(expect), err.span))?;
        if kind == expect {
            Ok(span)
        } else {
            Err(ParseError::new(ParseErrorKind::Expected(expect), span))
        }
    }

    fn peek_infix(&self) -> Option<InfixOp> {
        self.peek().and_then(|tk| InfixOp::from_token(tk.kind))
    }

    /// Parses the whole slice as exactly one expression.
    pub fn parse(mut self) -> ParseResult<Expr<'a>> {
        let expr = self.parse_expr()?;
        self.peek().map_or(Ok(expr), |tk| {
            Err(ParseError::new(ParseErrorKind::TrailingInput, tk.span))
        })
    }

    pub fn parse_expr(&mut self) -> ParseResult<Expr<'a>> {
        let expr = self.parse_prefix()?;
        self.parse_infix(expr, Precedence::LogicalAnd)
    }

    fn parse_infix(&mut self, mut lhs: Expr<'a>, min: Precedence) -> ParseResult<Expr<'a>> {
        while let Some(op) = self.peek_infix().filter(|op| op.precedence() >= min) {
            self.eat();
            let mut rhs = self.parse_prefix()?;
            while let Some(new) = self
                .peek_infix()
                .filter(|new| new.precedence() > op.precedence())
            {
                rhs = self.parse_infix(rhs, new.precedence())?;
            }
            let span = lhs.span.join(rhs.span);
            let kind = ExprKind::Infix {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
            lhs = Expr::new(kind, span);
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr<'a>> {
        let Some((op, span)) = self
            .peek()
            .and_then(|tk| PrefixOp::from_token(tk.kind).map(|op| (op, tk.span)))
        else {
            return self.parse_primary();
        };

        self.eat();
        let expr = self.parse_prefix()?;
        let span = span.join(expr.span);
        let kind = ExprKind::Prefix {
            op,
            expr: Box::new(expr),
        };
        Ok(Expr::new(kind, span))
    }

    fn parse_primary(&mut self) -> ParseResult<Expr<'a>> {
        let Token { kind, text, span } = self.next()?;

        match kind {
            TokenKind::Number => Ok(Expr::new(ExprKind::Number(text), span)),
            TokenKind::Hex => Ok(Expr::new(ExprKind::Hex(text), span)),
            TokenKind::Register => Ok(Expr::new(ExprKind::Register(text), span)),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                let closing = self.expect(TokenKind::RParen)?;
                Ok(Expr::new(inner.kind, span.join(closing)))
            }
            _ => Err(ParseError::new(ParseErrorKind::ExpectedExpr, span)),
        }
    }
}

/// Parses a complete token vector into a tree.
pub fn parse<'a>(tokens: &[Token<'a>]) -> ParseResult<Expr<'a>> {
    Parser::new(tokens).parse()
}
