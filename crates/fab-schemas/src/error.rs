#![deny(unsafe_code)]

use std::path::PathBuf;

use fab_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read declaration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML declarations {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid schema declarations: {0}")]
    Model(#[from] ModelError),
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
