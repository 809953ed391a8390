use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use termbook_config::Config;
use termbook_render::render_document;
use termbook_utils::atomic_write;
use tracing::{debug, info, warn};

use crate::scan::{markdown_files, markdown_files_if_present};
use crate::{load_glossary, OperationError};

/// Options for the prerender hook.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrerenderOptions {
    /// Render everything but write nothing.
    pub dry_run: bool,
}

/// One source document and the staged copy produced from it.
#[derive(Clone, Debug)]
pub struct StagedFile {
    pub source: PathBuf,
    pub staged: PathBuf,
    pub terms_replaced: usize,
    pub dashes_replaced: usize,
    pub unresolved: Vec<String>,
    pub unterminated_fence: bool,
}

/// A source document excluded by a skip pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub pattern: String,
}

#[derive(Clone, Debug)]
pub struct PrerenderOutcome {
    pub staging_dir: PathBuf,
    pub files: Vec<StagedFile>,
    pub skipped: Vec<SkippedFile>,
    /// Staged documents with no current source counterpart. Left in place.
    pub orphans: Vec<PathBuf>,
    pub dry_run: bool,
}

impl PrerenderOutcome {
    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    pub fn terms_replaced(&self) -> usize {
        self.files.iter().map(|file| file.terms_replaced).sum()
    }

    pub fn dashes_replaced(&self) -> usize {
        self.files.iter().map(|file| file.dashes_replaced).sum()
    }
}

pub(crate) fn run(
    config: &Config,
    options: PrerenderOptions,
) -> Result<PrerenderOutcome, OperationError> {
    // Nothing may touch the staging directory before the glossary is known to load.
    let glossary = load_glossary(config)?;

    let settings = &config.prerender;
    let sources = markdown_files_if_present(&settings.source_dir)?;

    if !options.dry_run {
        fs::create_dir_all(&settings.staging_dir).map_err(|source| OperationError::Io {
            path: settings.staging_dir.clone(),
            source,
        })?;
    }

    let mut files = Vec::new();
    let mut skipped = Vec::new();

    for source in sources {
        let Some(file_name) = source.file_name().map(|name| name.to_os_string()) else {
            continue;
        };
        // Lossy text is for matching and logs only; the staged path keeps the raw name.
        let name = file_name.to_string_lossy().into_owned();

        if let Some(pattern) = settings.skip_patterns.matching(&name) {
            debug!(file = %name, pattern, "skipping excluded document");
            skipped.push(SkippedFile {
                path: source,
                pattern: pattern.to_string(),
            });
            continue;
        }

        let contents = fs::read_to_string(&source).map_err(|err| OperationError::Io {
            path: source.clone(),
            source: err,
        })?;
        let rendered = render_document(&contents, &glossary);

        if rendered.unterminated_fence {
            warn!(file = %name, "unterminated code fence; content after the last ``` left untouched");
        }
        for key in &rendered.unresolved {
            warn!(file = %name, term = %key, "unresolved glossary term");
        }

        let staged = settings.staging_dir.join(&file_name);
        if !options.dry_run {
            atomic_write(&staged, &rendered.text).map_err(|source| OperationError::Io {
                path: staged.clone(),
                source,
            })?;
        }
        debug!(
            file = %name,
            terms = rendered.terms_replaced,
            dashes = rendered.dashes_replaced,
            "staged document"
        );

        files.push(StagedFile {
            source,
            staged,
            terms_replaced: rendered.terms_replaced,
            dashes_replaced: rendered.dashes_replaced,
            unresolved: rendered.unresolved,
            unterminated_fence: rendered.unterminated_fence,
        });
    }

    let orphans = find_orphans(&settings.staging_dir, &files)?;
    for orphan in &orphans {
        debug!(file = %orphan.display(), "staged document has no current source");
    }

    let outcome = PrerenderOutcome {
        staging_dir: settings.staging_dir.clone(),
        files,
        skipped,
        orphans,
        dry_run: options.dry_run,
    };
    info!(
        files = outcome.files_processed(),
        skipped = outcome.skipped.len(),
        terms = outcome.terms_replaced(),
        dashes = outcome.dashes_replaced(),
        "prerender finished"
    );
    Ok(outcome)
}

fn find_orphans(staging_dir: &Path, files: &[StagedFile]) -> Result<Vec<PathBuf>, OperationError> {
    if !staging_dir.is_dir() {
        return Ok(Vec::new());
    }

    let current: HashSet<&PathBuf> = files.iter().map(|file| &file.staged).collect();
    Ok(markdown_files(staging_dir)?
        .into_iter()
        .filter(|path| !current.contains(path))
        .collect())
}
