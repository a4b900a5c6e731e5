//! File-level normalization used by the `normalize` subcommand.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info_span};

use fab_model::{NormalizationReport, Record, SchemaRegistry};
use fab_normalization::Normalizer;

/// A normalized tree together with the pass report.
#[derive(Debug)]
pub struct NormalizeOutcome {
    pub record: Record,
    pub report: NormalizationReport,
}

/// Built-in catalog plus any extra declaration files.
pub fn load_registry(schemas: &[PathBuf]) -> Result<SchemaRegistry> {
    fab_schemas::registry_with(schemas).context("load record-type declarations")
}

pub fn read_record(path: &Path) -> Result<Record> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse record tree: {}", path.display()))
}

/// Write `record` as pretty JSON to `output`, or to stdout when `None`.
pub fn write_record(record: &Record, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, record)
                .with_context(|| format!("write {}", path.display()))?;
            writeln!(writer)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, record).context("write record to stdout")?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// Read, normalize and return the tree stored in `input`.
pub fn normalize_file(input: &Path, registry: &SchemaRegistry) -> Result<NormalizeOutcome> {
    let span = info_span!("normalize", input = %input.display());
    let _guard = span.enter();

    let mut record = read_record(input)?;
    debug!(
        record_type = %record.record_type,
        records = record.subtree_len(),
        "Loaded record tree"
    );
    let report = Normalizer::new(registry).normalize(&mut record);
    Ok(NormalizeOutcome { record, report })
}
