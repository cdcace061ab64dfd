//! `gqlapi.toml` configuration.

use gqlapi_codegen::GenerationOptions;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gqlapi.toml";

/// Extensions of operation documents picked up from directories.
const DOCUMENT_EXTENSIONS: &[&str] = &["graphql", "gql"];

/// Errors raised while loading configuration or resolving inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid configuration in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("no schema given; pass --schema or set `schema` in gqlapi.toml")]
    MissingSchema,

    #[error("no operation documents found")]
    NoDocuments,
}

/// Contents of a configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema document.
    pub schema: Option<PathBuf>,
    /// Operation documents: files, or directories searched recursively.
    #[serde(default)]
    pub documents: Vec<PathBuf>,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
    /// Generation options.
    #[serde(default)]
    pub options: GenerationOptions,
}

impl Config {
    /// Parses configuration text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads a configuration file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or(Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Loads `explicit` if given, otherwise [`DEFAULT_CONFIG_FILE`] when it
    /// exists in `cwd`.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Option<Self>, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }
        let default = cwd.join(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            tracing::debug!(path = %default.display(), "using default configuration");
            Self::load(&default).map(Some)
        } else {
            Ok(None)
        }
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let join = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        self.schema = self.schema.map(join);
        self.output = self.output.map(join);
        self.documents = self.documents.into_iter().map(join).collect();
        self
    }
}

/// Expands document paths: files are kept, directories are walked
/// recursively for `.graphql` and `.gql` files in file-name order.
///
/// Symbolic links inside directories are not followed, so a linked
/// directory cannot feed the same document in twice.
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut files).map_err(|err| ConfigError::Read {
                path: err.path().map_or_else(|| path.clone(), Path::to_path_buf),
                source: err.into(),
            })?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), walkdir::Error> {
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_document(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(())
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
}
