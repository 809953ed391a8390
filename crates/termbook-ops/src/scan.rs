use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::OperationError;

/// List `*.md` files directly inside `dir`, sorted by file name.
///
/// Only regular files (symlinks followed) with a lowercase `md` extension are
/// returned; dot-files and subdirectories are ignored.
pub fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>, OperationError> {
    let entries = fs::read_dir(dir).map_err(|source| OperationError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| OperationError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        if hidden || !is_markdown || !path.is_file() {
            continue;
        }
        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Like [`markdown_files`], but a directory that does not exist holds no files.
pub(crate) fn markdown_files_if_present(dir: &Path) -> Result<Vec<PathBuf>, OperationError> {
    match markdown_files(dir) {
        Err(OperationError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            Ok(Vec::new())
        }
        other => other,
    }
}
