#![deny(unsafe_code)]

//! Built-in record-type declarations and TOML declaration loading.

use std::path::{Path, PathBuf};

use fab_model::{SchemaDeclarations, SchemaRegistry};

use crate::error::SchemaError;

/// The catalog shipped with the crate.
pub const BUILTIN_DECLARATIONS: &str = include_str!("../schemas/fabrication.toml");

const BUILTIN_ORIGIN: &str = "<builtin>/fabrication.toml";
const INLINE_ORIGIN: &str = "<inline>";

pub fn builtin_declarations() -> Result<SchemaDeclarations, SchemaError> {
    parse_at(BUILTIN_DECLARATIONS, Path::new(BUILTIN_ORIGIN))
}

/// Registry of the built-in catalog only.
pub fn builtin_registry() -> Result<SchemaRegistry, SchemaError> {
    registry_with::<&Path>(&[])
}

/// Parse declarations from a TOML string.
pub fn parse_declarations(contents: &str) -> Result<SchemaDeclarations, SchemaError> {
    parse_at(contents, Path::new(INLINE_ORIGIN))
}

pub fn load_declarations(path: &Path) -> Result<SchemaDeclarations, SchemaError> {
    let contents = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
    parse_at(&contents, path)
}

/// Registry of the built-in catalog extended with declaration files.
///
/// Extra files may add capabilities and record types; redeclaring an
/// existing name is an error.
pub fn registry_with<P: AsRef<Path>>(paths: &[P]) -> Result<SchemaRegistry, SchemaError> {
    let mut declarations = builtin_declarations()?;
    for path in paths {
        let path = path.as_ref();
        let extra = load_declarations(path)?;
        tracing::debug!(
            path = %path.display(),
            capabilities = extra.capabilities.len(),
            record_types = extra.record_types.len(),
            "Loaded schema declarations"
        );
        declarations.extend(extra);
    }
    let registry = SchemaRegistry::from_declarations(declarations)?;
    tracing::info!(
        record_types = registry.len(),
        extra_files = paths.len(),
        "Schema registry ready"
    );
    Ok(registry)
}

fn parse_at(contents: &str, path: &Path) -> Result<SchemaDeclarations, SchemaError> {
    toml::from_str(contents).map_err(|e| SchemaError::Toml {
        path: PathBuf::from(path),
        source: e,
    })
}
