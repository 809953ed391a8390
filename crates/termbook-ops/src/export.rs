use std::path::PathBuf;

use termbook_config::Config;
use termbook_utils::atomic_write;
use tracing::info;

use crate::{load_glossary, OperationError};

#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    /// Write here instead of the configured export path.
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ExportOutcome {
    pub glossary_path: PathBuf,
    pub output_path: PathBuf,
    pub terms: usize,
    pub duplicates: usize,
}

pub(crate) fn run(config: &Config, options: ExportOptions) -> Result<ExportOutcome, OperationError> {
    let glossary = load_glossary(config)?;
    let output_path = options
        .output
        .unwrap_or_else(|| config.glossary.export.clone());

    let rendered = glossary.to_json()?;
    atomic_write(&output_path, &rendered).map_err(|source| OperationError::Io {
        path: output_path.clone(),
        source,
    })?;

    info!(
        terms = glossary.len(),
        output = %output_path.display(),
        "glossary exported"
    );

    Ok(ExportOutcome {
        glossary_path: config.glossary.path.clone(),
        output_path,
        terms: glossary.len(),
        duplicates: glossary.duplicates().len(),
    })
}
