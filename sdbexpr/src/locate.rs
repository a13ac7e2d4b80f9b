//! Span analysis for the recursive evaluator: finding where an inclusive
//! token span `[p, q]` splits, without ever building a tree.

use crate::token::{Precedence, Token, TokenKind};

/// Whether one pair of parentheses wraps the whole span `[p, q]`.
///
/// `(1+2)+(3+4)` starts and ends with parentheses but is not fully
/// parenthesized: the depth returns to zero before `q`.
#[must_use]
pub fn is_fully_parenthesized(tokens: &[Token<'_>], p: usize, q: usize) -> bool {
    let Some(span) = tokens.get(p..=q) else {
        return false;
    };
    let (Some(first), Some(last)) = (span.first(), span.last()) else {
        return false;
    };
    if first.kind != TokenKind::LParen || last.kind != TokenKind::RParen {
        return false;
    }

    let mut depth = 0usize;
    for (i, tk) in span.iter().enumerate() {
        match tk.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                let Some(d) = depth.checked_sub(1) else {
                    return false;
                };
                depth = d;
                if depth == 0 && i != span.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0
}

/// Index of the operator `[p, q]` splits at, or `None` when the span has no
/// operator outside parentheses or its parentheses do not balance.
///
/// The scan runs from `q` down to `p` and only a strictly weaker operator
/// replaces the current choice, so among binary operators of the weakest
/// precedence the rightmost wins and `a-b-c` splits as `(a-b)-c`. Prefix
/// operators group the other way: on a tie the further-left one wins.
#[must_use]
pub fn locate_main_operator(tokens: &[Token<'_>], p: usize, q: usize) -> Option<usize> {
    let span = tokens.get(p..=q)?;

    let mut level = 0usize;
    let mut main: Option<(usize, Precedence)> = None;

    for (i, tk) in span.iter().enumerate().rev() {
        match tk.kind {
            TokenKind::RParen => level += 1,
            TokenKind::LParen => level = level.checked_sub(1)?,
            _ => {}
        }

        if level != 0 {
            continue;
        }

        let Some(prec) = tk.kind.precedence() else {
            continue;
        };

        let replace = main.is_none_or(|(_, min)| {
            prec < min || (prec == min && tk.kind.is_prefix())
        });
        if replace {
            main = Some((p + i, prec));
        }
    }

    if level != 0 {
        return None;
    }

    main.map(|(i, _)| i)
}
