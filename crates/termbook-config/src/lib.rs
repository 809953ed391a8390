//! Configuration primitives and loader for the termbook build hooks.
//!
//! The loader resolves configuration using a precedence stack:
//! override flag → working directory → git root → built-in defaults.
//! Parsed settings are normalised into typed structures so the hook
//! operations never touch raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".termbook.toml";

const DEFAULT_GLOSSARY_PATH: &str = "glossary/terms.yml";
const DEFAULT_EXPORT_PATH: &str = "СЛОВАРЬ_ТЕРМИНОВ.json";
const DEFAULT_SOURCE_DIR: &str = "Черновики глав";
const DEFAULT_STAGING_DIR: &str = "_temp_build";

/// File-name substrings excluded from prerendering unless overridden.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    "combined-book",
    "База_DevRel",
    "_OLD",
    "test_",
    "_archive",
    "_backup",
];

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub glossary: GlossarySettings,
    pub prerender: PrerenderSettings,
    pub sources: ConfigSources,
}

/// Location of the glossary definition file and its JSON export.
#[derive(Clone, Debug)]
pub struct GlossarySettings {
    pub path: PathBuf,
    pub export: PathBuf,
}

/// Settings that govern the prerender hook.
#[derive(Clone, Debug)]
pub struct PrerenderSettings {
    pub source_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub skip_patterns: SkipPatterns,
}

/// Ordered list of file-name substrings that exclude a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkipPatterns {
    patterns: Vec<String>,
}

impl SkipPatterns {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SkipPatterns {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first pattern contained in `file_name`, if any.
    pub fn matching(&self, file_name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| file_name.contains(pattern.as_str()))
            .map(String::as_str)
    }

    pub fn is_skipped(&self, file_name: &str) -> bool {
        self.matching(file_name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

/// Tracks which layers contributed to the resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = PartialConfig::default();
        merged.merge(defaults_layer(default_source.clone()));

        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let (glossary, prerender) = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            glossary,
            prerender,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    PartialConfig {
        glossary_path: Some(Located::new(
            PathBuf::from(DEFAULT_GLOSSARY_PATH),
            source.clone(),
        )),
        export_path: Some(Located::new(
            PathBuf::from(DEFAULT_EXPORT_PATH),
            source.clone(),
        )),
        source_dir: Some(Located::new(
            PathBuf::from(DEFAULT_SOURCE_DIR),
            source.clone(),
        )),
        staging_dir: Some(Located::new(
            PathBuf::from(DEFAULT_STAGING_DIR),
            source.clone(),
        )),
        skip_patterns: Some(Located::new(
            DEFAULT_SKIP_PATTERNS.iter().map(|s| s.to_string()).collect(),
            source,
        )),
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    glossary_path: Option<Located<PathBuf>>,
    export_path: Option<Located<PathBuf>>,
    source_dir: Option<Located<PathBuf>>,
    staging_dir: Option<Located<PathBuf>>,
    skip_patterns: Option<Located<Vec<String>>>,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        if other.glossary_path.is_some() {
            self.glossary_path = other.glossary_path;
        }
        if other.export_path.is_some() {
            self.export_path = other.export_path;
        }
        if other.source_dir.is_some() {
            self.source_dir = other.source_dir;
        }
        if other.staging_dir.is_some() {
            self.staging_dir = other.staging_dir;
        }
        if other.skip_patterns.is_some() {
            self.skip_patterns = other.skip_patterns;
        }
    }

    fn finalize(self) -> Result<(GlossarySettings, PrerenderSettings), ConfigValidationErrors> {
        let mut errors = Vec::new();

        let glossary_path = required_path(self.glossary_path, "glossary.path", &mut errors);
        let export_path = required_path(self.export_path, "glossary.export", &mut errors);
        let source_dir = required_path(self.source_dir, "prerender.source_dir", &mut errors);
        let staging_dir = required_path(self.staging_dir, "prerender.staging_dir", &mut errors);

        if let (Some((source, _)), Some((staging, staging_loc))) = (&source_dir, &staging_dir) {
            if source == staging {
                errors.push(
                    ConfigValidationError::new(
                        Some(staging_loc.clone()),
                        format!(
                            "staging directory must differ from source directory ({})",
                            source.display()
                        ),
                    )
                    .with_context("prerender.staging_dir"),
                );
            }
        }

        let mut skip_patterns = Vec::new();
        if let Some(located) = self.skip_patterns {
            for pattern in located.value {
                if pattern.is_empty() {
                    errors.push(
                        ConfigValidationError::new(
                            Some(located.source.clone()),
                            "skip pattern cannot be empty".into(),
                        )
                        .with_context("prerender.skip_patterns"),
                    );
                } else {
                    skip_patterns.push(pattern);
                }
            }
        }

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        // Every required path pushed an error when absent, so these are present here.
        let (
            Some((glossary_path, _)),
            Some((export_path, _)),
            Some((source_dir, _)),
            Some((staging_dir, _)),
        ) = (glossary_path, export_path, source_dir, staging_dir)
        else {
            return Err(ConfigValidationErrors(Vec::new()));
        };

        Ok((
            GlossarySettings {
                path: glossary_path,
                export: export_path,
            },
            PrerenderSettings {
                source_dir,
                staging_dir,
                skip_patterns: SkipPatterns::new(skip_patterns),
            },
        ))
    }
}

fn required_path(
    located: Option<Located<PathBuf>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Option<(PathBuf, ConfigSource)> {
    match located {
        Some(located) if !located.value.as_os_str().is_empty() => {
            Some((resolve_path(&located), located.source))
        }
        Some(located) => {
            errors.push(
                ConfigValidationError::new(Some(located.source), "path cannot be empty".into())
                    .with_context(context),
            );
            None
        }
        None => {
            errors.push(
                ConfigValidationError::new(None, "path is not configured".into())
                    .with_context(context),
            );
            None
        }
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    make_absolute(&located.value, &located.source.base_dir)
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    glossary: Option<RawGlossary>,
    #[serde(default)]
    prerender: Option<RawPrerender>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGlossary {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    export: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrerender {
    #[serde(default)]
    source_dir: Option<PathBuf>,
    #[serde(default)]
    staging_dir: Option<PathBuf>,
    #[serde(default)]
    skip_patterns: Option<Vec<String>>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        let mut partial = PartialConfig::default();
        let located = |value| Located::new(value, source.clone());

        if let Some(glossary) = self.glossary {
            partial.glossary_path = glossary.path.map(located);
            partial.export_path = glossary.export.map(located);
        }

        if let Some(prerender) = self.prerender {
            partial.source_dir = prerender.source_dir.map(located);
            partial.staging_dir = prerender.staging_dir.map(located);
            partial.skip_patterns = prerender
                .skip_patterns
                .map(|patterns| Located::new(patterns, source.clone()));
        }

        partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_patterns_match_substrings_not_globs() {
        let patterns = SkipPatterns::new(["_backup", "test_"]);
        assert_eq!(patterns.matching("notes_backup.md"), Some("_backup"));
        assert!(patterns.is_skipped("test_intro.md"));
        assert!(patterns.is_skipped("my_test_notes.md"));
        assert!(!patterns.is_skipped("backup-strategy.md"));
        assert!(!patterns.is_skipped("intro.md"));
    }

    #[test]
    fn default_skip_patterns_cover_archival_copies() {
        let patterns = SkipPatterns::new(DEFAULT_SKIP_PATTERNS.iter().copied());
        for name in [
            "combined-book.md",
            "База_DevRel_v2.md",
            "chapter_OLD.md",
            "test_draft.md",
            "ch1_archive.md",
            "ch1_backup.md",
        ] {
            assert!(patterns.is_skipped(name), "{name} should be skipped");
        }
        assert!(!patterns.is_skipped("chapter-01.md"));
    }
}
