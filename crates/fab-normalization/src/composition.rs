//! Elemental fraction calculation.

use std::collections::HashMap;

use fab_model::ElementEntry;

use crate::error::MalformedFormula;
use crate::formula::{FormulaTerm, parse_formula};

/// Result of turning formula terms into atomic fractions.
#[derive(Debug, Clone, PartialEq)]
pub enum FractionOutcome {
    /// One entry per distinct symbol, in first-occurrence order.
    Fractions(Vec<ElementEntry>),
    /// The counts sum to zero; the composition is unknown.
    NoElementsProvided,
}

impl FractionOutcome {
    /// Entries of the composition; empty when no elements were provided.
    pub fn into_entries(self) -> Vec<ElementEntry> {
        match self {
            FractionOutcome::Fractions(entries) => entries,
            FractionOutcome::NoElementsProvided => Vec::new(),
        }
    }
}

/// Combine repeated symbols and normalize counts into atomic fractions.
pub fn elemental_fractions(terms: &[FormulaTerm]) -> FractionOutcome {
    let mut combined: Vec<(&str, u64)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(terms.len());
    for term in terms {
        let count = u64::from(term.count);
        match positions.get(term.symbol.as_str()) {
            Some(&index) => combined[index].1 += count,
            None => {
                positions.insert(term.symbol.as_str(), combined.len());
                combined.push((term.symbol.as_str(), count));
            }
        }
    }

    let total: u64 = combined.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return FractionOutcome::NoElementsProvided;
    }

    let total = total as f64;
    FractionOutcome::Fractions(
        combined
            .into_iter()
            .map(|(symbol, count)| ElementEntry {
                element: symbol.to_string(),
                count,
                atomic_fraction: count as f64 / total,
            })
            .collect(),
    )
}

/// Parse `formula` and compute its elemental composition.
///
/// # Errors
///
/// Returns [`MalformedFormula`] when the formula cannot be tokenized.
pub fn composition_of(formula: &str) -> Result<FractionOutcome, MalformedFormula> {
    parse_formula(formula).map(|terms| elemental_fractions(&terms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractions(formula: &str) -> Vec<ElementEntry> {
        match composition_of(formula).expect("well-formed formula") {
            FractionOutcome::Fractions(entries) => entries,
            FractionOutcome::NoElementsProvided => panic!("expected elements for {formula}"),
        }
    }

    #[test]
    fn test_silicon_dioxide() {
        let entries = fractions("SiO2");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].element, "Si");
        assert!((entries[0].atomic_fraction - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(entries[1].element, "O");
        assert!((entries[1].atomic_fraction - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_symbols_are_combined() {
        let entries = fractions("H2O2H2");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].element, "H");
        assert_eq!(entries[0].count, 4);
        assert!((entries[0].atomic_fraction - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(entries[1].element, "O");
        assert_eq!(entries[1].count, 2);
        assert!((entries[1].atomic_fraction - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_total_is_not_an_error() {
        assert_eq!(
            composition_of("Xe0").expect("well-formed formula"),
            FractionOutcome::NoElementsProvided
        );
        assert!(
            composition_of("Xe0")
                .expect("well-formed formula")
                .into_entries()
                .is_empty()
        );
    }

    #[test]
    fn test_zero_count_entry_alongside_others() {
        let entries = fractions("H0O2");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].atomic_fraction, 0.0);
        assert_eq!(entries[1].atomic_fraction, 1.0);
    }

    #[test]
    fn test_many_distinct_symbols_keep_first_occurrence_order() {
        let terms: Vec<FormulaTerm> = (0..2000u32)
            .flat_map(|index| {
                let symbol = format!("X{}", index_to_letters(index));
                [FormulaTerm::new(symbol.clone(), 1), FormulaTerm::new(symbol, 2)]
            })
            .collect();

        let FractionOutcome::Fractions(entries) = elemental_fractions(&terms) else {
            panic!("expected fractions");
        };
        assert_eq!(entries.len(), 2000);
        assert_eq!(entries[0].element, format!("X{}", index_to_letters(0)));
        assert_eq!(entries[1999].element, format!("X{}", index_to_letters(1999)));
        assert!(entries.iter().all(|entry| entry.count == 3));
    }

    fn index_to_letters(mut index: u32) -> String {
        let mut letters = String::new();
        loop {
            letters.push(char::from(b'a' + (index % 26) as u8));
            index /= 26;
            if index == 0 {
                return letters;
            }
        }
    }

    #[test]
    fn test_malformed_is_propagated() {
        assert!(composition_of("2O").is_err());
    }
}
