//! Shared test harness utilities for termbook crates.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use termbook_config::{Config, LoadOptions};

/// Glossary used across fixtures.
pub const SAMPLE_GLOSSARY: &str = r#"terms:
  - term: api
    definition: "Application Programming Interface"
  - term: devrel
    definition: "Developer Relations"
"#;

/// Temporary book project laid out with the default directory names.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Empty project: no glossary, no source directory.
    pub fn empty() -> Self {
        Project {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    /// Project with [`SAMPLE_GLOSSARY`] and an empty source directory.
    pub fn with_sample_glossary() -> Self {
        let project = Self::empty();
        project.write_glossary(SAMPLE_GLOSSARY);
        fs::create_dir_all(project.source_dir()).expect("create source directory");
        project
    }

    pub fn root(&self) -> PathBuf {
        fs::canonicalize(self.dir.path()).expect("canonicalize project root")
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root().join("Черновики глав")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root().join("_temp_build")
    }

    pub fn export_path(&self) -> PathBuf {
        self.root().join("СЛОВАРЬ_ТЕРМИНОВ.json")
    }

    pub fn glossary_path(&self) -> PathBuf {
        self.root().join("glossary").join("terms.yml")
    }

    pub fn write_glossary(&self, contents: &str) {
        write_file(&self.glossary_path(), contents);
    }

    pub fn write_chapter(&self, name: &str, contents: &str) {
        write_file(&self.source_dir().join(name), contents);
    }

    pub fn read_staged(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.staging_dir().join(name)).ok()
    }

    /// Configuration resolved with the project root as working directory.
    pub fn config(&self) -> Config {
        Config::load(LoadOptions::default().with_working_dir(self.root()))
            .expect("load project config")
    }
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}
