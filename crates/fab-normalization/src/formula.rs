//! Chemical formula tokenizer.
//!
//! Grammar: a formula is one or more unit terms; a unit term is an element
//! symbol (one ASCII uppercase letter followed by any number of ASCII
//! lowercase letters) optionally followed by an unsigned decimal count. A
//! missing count means 1. Whitespace around the whole formula is ignored.
//!
//! The tokenizer does not combine repeated symbols; see
//! [`crate::composition`].

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{MalformedFormula, MalformedReason};

/// One `Symbol[count]` term, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaTerm {
    pub symbol: String,
    pub count: u32,
}

impl FormulaTerm {
    pub fn new(symbol: impl Into<String>, count: u32) -> Self {
        Self {
            symbol: symbol.into(),
            count,
        }
    }
}

/// Tokenize `formula` into `(symbol, count)` terms.
///
/// # Errors
///
/// Returns [`MalformedFormula`] when the text is blank or cannot be split
/// into unit terms.
pub fn parse_formula(formula: &str) -> Result<Vec<FormulaTerm>, MalformedFormula> {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Err(MalformedFormula::new(formula, 0, MalformedReason::Empty));
    }
    let offset = formula.len() - formula.trim_start().len();
    let fail = |position: usize, reason| MalformedFormula::new(formula, offset + position, reason);

    let mut chars = trimmed.char_indices().peekable();
    let mut terms = Vec::new();
    while let Some((position, ch)) = chars.next() {
        if ch.is_ascii_uppercase() {
            let mut symbol = String::from(ch);
            symbol.push_str(&take_while(&mut chars, |c| c.is_ascii_lowercase()));
            let digits = take_while(&mut chars, |c| c.is_ascii_digit());
            let count = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<u32>()
                    .map_err(|_| fail(position, MalformedReason::CountOverflow))?
            };
            terms.push(FormulaTerm { symbol, count });
        } else if ch.is_ascii_digit() {
            return Err(fail(position, MalformedReason::DigitWithoutSymbol));
        } else if ch.is_ascii_lowercase() {
            return Err(fail(position, MalformedReason::LowercaseWithoutSymbol));
        } else {
            return Err(fail(position, MalformedReason::UnexpectedCharacter(ch)));
        }
    }
    Ok(terms)
}

fn take_while(chars: &mut Peekable<CharIndices<'_>>, accept: impl Fn(char) -> bool) -> String {
    let mut taken = String::new();
    while let Some(&(_, next)) = chars.peek() {
        if !accept(next) {
            break;
        }
        taken.push(next);
        chars.next();
    }
    taken
}
