use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("glossary file {path} not found")]
    MissingFile { path: PathBuf },

    #[error("failed to read glossary {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse glossary {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

pub type GlossaryResult<T> = Result<T, GlossaryError>;
