use std::sync::LazyLock;

use regex::Regex;
use sdbspan::{Span, Spand};
use thiserror::Error;

use crate::token::{Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("no match at position {position}: '{remainder}'")]
    NoMatch { position: u32, remainder: String },
    #[error("too many tokens, at most {limit} are allowed")]
    TooManyTokens { limit: usize },
}

pub type LexError = Spand<LexErrorKind>;
pub type LexResult<T> = Result<T, LexError>;

/// Default capacity of the token buffer.
pub const MAX_TOKENS: usize = 32;

/// Tried top to bottom at every position, first match wins, so a rule must
/// come before any rule that matches one of its prefixes.
const RULE_TABLE: [(&str, Option<TokenKind>); 13] = [
    (r"\s+", None),
    (r"==", Some(TokenKind::EqEq)),
    (r"!=", Some(TokenKind::BangEq)),
    (r"&&", Some(TokenKind::AndAnd)),
    (r"\+", Some(TokenKind::Plus)),
    (r"-", Some(TokenKind::Minus)),
    (r"\*", Some(TokenKind::Star)),
    (r"/", Some(TokenKind::Slash)),
    (r"\(", Some(TokenKind::LParen)),
    (r"\)", Some(TokenKind::RParen)),
    (r"0[xX][0-9a-fA-F]+", Some(TokenKind::Hex)),
    (r"[0-9]+", Some(TokenKind::Number)),
    (r"\$[0-9A-Za-z]+", Some(TokenKind::Register)),
];

struct Rule {
    pattern: Regex,
    /// `None` discards the match.
    kind:    Option<TokenKind>,
}

impl Rule {
    fn compile(pattern: &str, kind: Option<TokenKind>) -> Self {
        let pattern =
            Regex::new(&format!("^(?:{pattern})")).expect("token rules should be valid regexes");
        Self { pattern, kind }
    }

    /// Length of the match anchored at the start of `rest`.
    fn matches(&self, rest: &str) -> Option<usize> {
        self.pattern
            .find(rest)
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }
}

static RULES: LazyLock<Box<[Rule]>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(pattern, kind)| Rule::compile(pattern, kind))
        .collect()
});

pub struct Lexer<'a> {
    input: &'a str,

    /// byte position of cursor
    byte: u32,

    /// kind of the last emitted token
    prev: Option<TokenKind>,

    limit: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        assert!(u32::try_from(input.len()).is_ok());

        Self {
            input,
            byte: 0,
            prev: None,
            limit: MAX_TOKENS,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Tokenizes the whole input; the first error discards everything.
    pub fn lex_all(self) -> LexResult<Vec<Token<'a>>> {
        let limit = self.limit;
        let mut tokens = Vec::new();

        for item in self {
            let token = item?;
            if tokens.len() == limit {
                return Err(LexError::new(
                    LexErrorKind::TooManyTokens { limit },
                    token.span,
                ));
            }
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.byte as usize..]
    }

    fn is_eof(&self) -> bool {
        self.rest().is_empty()
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn advance(&mut self, len: usize) -> Span {
        let lo = self.byte;
        self.byte += len as u32;
        Span::new(lo, self.byte)
    }

    fn no_match(&mut self) -> LexError {
        let position = self.byte;
        let remainder = self.rest();
        let width = remainder.chars().next().map_or(0, char::len_utf8);
        let span = Span::new(position, position + u32::try_from(width).unwrap_or(0));
        let kind = LexErrorKind::NoMatch {
            position,
            remainder: remainder.to_string(),
        };
        // stop the iterator, the rest of the input is unusable
        self.byte = u32::try_from(self.input.len()).unwrap_or(u32::MAX);
        LexError::new(kind, span)
    }

    pub fn next_token(&mut self) -> Option<LexResult<Token<'a>>> {
        loop {
            if self.is_eof() {
                return None;
            }

            let rest = self.rest();
            let Some((len, kind)) = RULES
                .iter()
                .find_map(|rule| rule.matches(rest).map(|len| (len, rule.kind)))
            else {
                return Some(Err(self.no_match()));
            };

            let span = self.advance(len);
            let Some(mut kind) = kind else {
                continue;
            };

            if self.prev.is_none_or(TokenKind::expects_operand) {
                kind = kind.as_prefix();
            }
            self.prev = Some(kind);

            return Some(Ok(Token::new(kind, &rest[..len], span)));
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenizes `input` with the default capacity of [`MAX_TOKENS`].
pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    Lexer::new(input).lex_all()
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|tk| tk.kind)
            .collect()
    }

    #[test]
    fn arithmetic() {
        use TokenKind::{LParen, Minus, Number, Plus, RParen, Star};

        assert_eq!(
            kinds("(1+2)*3-4"),
            [LParen, Number, Plus, Number, RParen, Star, Number, Minus, Number]
        );
    }

    #[test]
    fn whitespace_is_dropped() {
        let tokens = tokenize("  12 \t+   345 ").unwrap();
        let texts: Vec<_> = tokens.iter().map(|tk| tk.text).collect();
        assert_eq!(texts, ["12", "+", "345"]);
        assert_eq!(tokens[2].span, Span::new(10, 13));
    }

    #[test]
    fn numbers_are_maximal_digit_runs() {
        let tokens = tokenize("007+1234567890123").unwrap();
        assert_eq!(tokens[0].text, "007");
        assert_eq!(tokens[2].text, "1234567890123");
    }

    #[test]
    fn multi_char_operators_win() {
        use TokenKind::{AndAnd, BangEq, EqEq, Number};

        assert_eq!(
            kinds("1==2!=3&&4"),
            [Number, EqEq, Number, BangEq, Number, AndAnd, Number]
        );
    }

    #[test]
    fn hex_before_decimal() {
        let tokens = tokenize("0x80000000 + 0XfF").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Hex);
        assert_eq!(tokens[0].text, "0x80000000");
        assert_eq!(tokens[2].kind, TokenKind::Hex);
    }

    #[test]
    fn registers() {
        let tokens = tokenize("$pc+$a0-$0").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Register);
        assert_eq!(tokens[0].text, "$pc");
        assert_eq!(tokens[4].text, "$0");
    }

    #[test]
    fn prefix_operators() {
        use TokenKind::{Deref, Hex, LParen, Minus, Neg, Number, RParen, Star};

        assert_eq!(kinds("-1"), [Neg, Number]);
        assert_eq!(kinds("*0x10"), [Deref, Hex]);
        assert_eq!(kinds("2*-3"), [Number, Star, Neg, Number]);
        assert_eq!(kinds("(-1)-1"), [LParen, Neg, Number, RParen, Minus, Number]);
        assert_eq!(kinds("**-1"), [Deref, Deref, Neg, Number]);
    }

    #[test]
    fn no_match_reports_position() {
        let err = tokenize("1+@2").unwrap_err();
        assert_eq!(
            err.kind,
            LexErrorKind::NoMatch {
                position:  2,
                remainder: "@2".to_string(),
            }
        );
        assert_eq!(err.span, Span::new(2, 3));
    }

    #[test]
    fn lone_operators_are_not_special() {
        assert!(tokenize("1 = 2").is_err());
        assert!(tokenize("1 & 2").is_err());
        assert!(tokenize("$").is_err());
    }

    #[test]
    fn capacity_is_enforced() {
        // 16 numbers and 15 pluses
        let ones = vec!["1"; 16].join("+");
        assert_eq!(tokenize(&ones).unwrap().len(), 31);

        let at_limit = format!("{ones}+");
        assert_eq!(tokenize(&at_limit).unwrap().len(), MAX_TOKENS);

        let over = format!("{ones}+1");
        let err = tokenize(&over).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::TooManyTokens { limit: MAX_TOKENS });
        assert_eq!(err.span.lo() as usize, over.len() - 1);
    }

    #[test]
    fn custom_limit() {
        let err = Lexer::new("1+2").with_limit(2).lex_all().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::TooManyTokens { limit: 2 });
        assert_eq!(err.span, Span::new(2, 3));
        assert_eq!(Lexer::new("1+2").with_limit(3).lex_all().unwrap().len(), 3);
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn stops_after_error() {
        let mut lexer = Lexer::new("1 # 2");
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }
}
