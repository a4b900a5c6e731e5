//! Error types for formula parsing.

use thiserror::Error;

/// Why a formula could not be decomposed into unit terms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("formula is empty")]
    Empty,

    #[error("count without a preceding element symbol")]
    DigitWithoutSymbol,

    #[error("lowercase letter without a preceding uppercase letter")]
    LowercaseWithoutSymbol,

    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),

    #[error("count does not fit in 32 bits")]
    CountOverflow,
}

/// A chemical formula that is not a sequence of `Symbol[count]` terms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed formula {formula:?} at offset {position}: {reason}")]
pub struct MalformedFormula {
    pub formula: String,
    /// Byte offset into `formula` where decomposition failed.
    pub position: usize,
    pub reason: MalformedReason,
}

impl MalformedFormula {
    pub(crate) fn new(formula: &str, position: usize, reason: MalformedReason) -> Self {
        Self {
            formula: formula.to_string(),
            position,
            reason,
        }
    }
}
