//! Fabrication record normalization crate.
//!
//! Runs over a record tree after it is loaded or edited and brings every
//! record's computed state in line with its own field values.
//!
//! # Overview
//!
//! This crate provides:
//! - **Formula parsing**: tokenize chemical formulas such as `SiO2` into `(symbol, count)` terms
//! - **Elemental composition**: combine terms into atomic fractions
//! - **Field materialization**: create, retype or remove derived fields from declared rules
//! - **Orchestration**: a pre-order walk applying all of the above to every record
//!
//! # Example
//!
//! ```ignore
//! use fab_normalization::Normalizer;
//!
//! let registry = fab_schemas::builtin_registry()?;
//! let report = Normalizer::new(&registry).normalize(&mut record);
//! for diagnostic in &report.diagnostics {
//!     eprintln!("{}: {}", diagnostic.path, diagnostic.message);
//! }
//! ```
//!
//! # Design Principles
//!
//! - **Declaration-driven**: rules come from the `SchemaRegistry`, never from record-type names
//! - **Stable**: normalizing an already normalized tree changes nothing
//! - **Per-record failures**: malformed formulas become diagnostics, the walk continues

mod error;

pub mod composition;
pub mod formula;
pub mod materialize;
pub mod orchestrator;

// Formula handling
pub use composition::{FractionOutcome, composition_of, elemental_fractions};
pub use error::{MalformedFormula, MalformedReason};
pub use formula::{FormulaTerm, parse_formula};

// Rule application
pub use materialize::{MaterializeSummary, apply_rules};

// Tree walk
pub use orchestrator::{Normalizer, normalize_record};
