#![deny(unsafe_code)]

pub mod catalog;
pub mod error;

pub use crate::catalog::{
    BUILTIN_DECLARATIONS, builtin_declarations, builtin_registry, load_declarations,
    parse_declarations, registry_with,
};
pub use crate::error::SchemaError;
