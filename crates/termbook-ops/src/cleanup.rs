use std::path::PathBuf;

use termbook_config::Config;
use tracing::{info, warn};

use crate::scan::markdown_files;

/// Staged documents are kept so the renderer and the next build can reuse
/// them; the next prerender overwrites them.
#[derive(Clone, Debug)]
pub struct CleanupOutcome {
    pub staging_dir: PathBuf,
    pub retained: usize,
}

pub(crate) fn run(config: &Config) -> CleanupOutcome {
    let staging_dir = config.prerender.staging_dir.clone();

    let retained = if staging_dir.is_dir() {
        match markdown_files(&staging_dir) {
            Ok(files) => files.len(),
            Err(err) => {
                warn!(error = %err, "could not inspect staging directory");
                0
            }
        }
    } else {
        0
    };

    info!(dir = %staging_dir.display(), retained, "staged files left in place");
    CleanupOutcome {
        staging_dir,
        retained,
    }
}
