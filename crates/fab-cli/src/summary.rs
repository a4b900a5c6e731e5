use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use fab_model::{DiagnosticKind, ElementEntry, NormalizationReport, ResolvedRecordType};

/// Print the pass summary and, when present, the diagnostics table to stderr.
pub fn print_report(report: &NormalizationReport) {
    eprintln!(
        "Records visited: {}, diagnostics: {}",
        report.records_visited,
        report.diagnostics.len()
    );
    if report.diagnostics.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Path"),
        header_cell("Record type"),
        header_cell("Kind"),
        header_cell("Field"),
        header_cell("Message"),
    ]);
    apply_diagnostic_table_style(&mut table);
    for diagnostic in &report.diagnostics {
        let path = if diagnostic.path.is_empty() {
            dim_cell("(root)")
        } else {
            Cell::new(&diagnostic.path)
        };
        table.add_row(vec![
            path,
            Cell::new(&diagnostic.record_type)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            kind_cell(diagnostic.kind),
            diagnostic
                .field
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&diagnostic.message),
        ]);
    }
    eprintln!();
    eprintln!("Diagnostics:");
    eprintln!("{table}");
}

pub fn print_composition(formula: &str, entries: &[ElementEntry]) {
    println!("Formula: {}", formula.trim());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Element"),
        header_cell("Count"),
        header_cell("Atomic fraction"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.element)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(entry.count),
            Cell::new(format!("{:.6}", entry.atomic_fraction)),
        ]);
    }
    println!("{table}");
}

pub fn record_type_row(record_type: &ResolvedRecordType) -> Vec<Cell> {
    let capabilities = if record_type.capabilities.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(record_type.capabilities.join(", "))
    };
    let formula = record_type
        .formula_field()
        .map_or_else(|| dim_cell("-"), Cell::new);
    let sections: Vec<String> = record_type
        .sections()
        .iter()
        .map(|section| format!("{} -> {}", section.name, section.record_type))
        .collect();
    let sections = if sections.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(sections.join("\n"))
    };
    vec![
        Cell::new(&record_type.name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        capabilities,
        formula,
        sections,
        count_cell(record_type.rules().len()),
    ]
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_diagnostic_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Fixed(28)),
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_cell(kind: DiagnosticKind) -> Cell {
    let color = match kind {
        DiagnosticKind::MalformedFormula | DiagnosticKind::UnknownRecordType => Color::Red,
        DiagnosticKind::NoElementsProvided | DiagnosticKind::UndeclaredSection => Color::Yellow,
    };
    Cell::new(kind.as_str()).fg(color)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
