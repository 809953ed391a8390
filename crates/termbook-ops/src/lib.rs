//! The build hooks: prerender, glossary export and staging cleanup.

mod cleanup;
mod export;
mod prerender;
mod scan;

use std::io;
use std::path::PathBuf;

use termbook_config::Config;
use termbook_glossary::{Glossary, GlossaryError};
use thiserror::Error;

pub use cleanup::CleanupOutcome;
pub use export::{ExportOptions, ExportOutcome};
pub use prerender::{PrerenderOptions, PrerenderOutcome, SkippedFile, StagedFile};
pub use scan::markdown_files;

/// Errors surfaced by the hook operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("glossary file {path} not found")]
    MissingGlossary { path: PathBuf },
    #[error(transparent)]
    Glossary(GlossaryError),
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to serialise glossary export: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<GlossaryError> for OperationError {
    fn from(err: GlossaryError) -> Self {
        match err {
            GlossaryError::MissingFile { path } => OperationError::MissingGlossary { path },
            other => OperationError::Glossary(other),
        }
    }
}

/// Operation bundle bound to a resolved configuration.
pub struct Operations {
    config: Config,
}

impl Operations {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Stage every in-scope source document with placeholders and dashes rewritten.
    pub fn prerender(&self, options: PrerenderOptions) -> Result<PrerenderOutcome, OperationError> {
        prerender::run(&self.config, options)
    }

    /// Write the glossary as a flat JSON object.
    pub fn export(&self, options: ExportOptions) -> Result<ExportOutcome, OperationError> {
        export::run(&self.config, options)
    }

    /// Post-render hook. Never deletes anything.
    pub fn cleanup(&self) -> CleanupOutcome {
        cleanup::run(&self.config)
    }
}

fn load_glossary(config: &Config) -> Result<Glossary, OperationError> {
    Ok(Glossary::load(&config.glossary.path)?)
}
