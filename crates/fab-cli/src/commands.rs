use anyhow::Result;
use comfy_table::Table;

use fab_model::NormalizationReport;
use fab_normalization::{FractionOutcome, composition_of};
use fab_cli::normalize::{load_registry, normalize_file, write_record};

use crate::cli::{FormulaArgs, NormalizeArgs, TypesArgs};
use crate::summary::{apply_table_style, header_cell, print_composition, record_type_row};

pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizationReport> {
    let registry = load_registry(&args.schemas)?;
    let outcome = normalize_file(&args.input, &registry)?;
    write_record(&outcome.record, args.output.as_deref())?;
    if let Some(path) = &args.output {
        eprintln!("Normalized tree written to {}", path.display());
    }
    Ok(outcome.report)
}

pub fn run_types(args: &TypesArgs) -> Result<()> {
    let registry = load_registry(&args.schemas)?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record type"),
        header_cell("Capabilities"),
        header_cell("Formula field"),
        header_cell("Sections"),
        header_cell("Rules"),
    ]);
    apply_table_style(&mut table);
    for record_type in registry.record_types() {
        table.add_row(record_type_row(record_type));
    }
    println!("{table}");
    Ok(())
}

pub fn run_formula(args: &FormulaArgs) -> Result<()> {
    match composition_of(&args.formula)? {
        FractionOutcome::Fractions(entries) => print_composition(&args.formula, &entries),
        FractionOutcome::NoElementsProvided => {
            println!("{}: no elements provided", args.formula.trim());
        }
    }
    Ok(())
}
