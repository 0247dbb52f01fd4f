use std::path::PathBuf;
use thiserror::Error;

/// Livedoc error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid snapshot {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    #[error("No documentation found for {0:?}")]
    Resolution(String),

    #[error("problem in {} - {message}", display_filename(.filename))]
    ImportTime {
        filename: Option<PathBuf>,
        message: String,
    },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Livedoc operations
pub type Result<T> = std::result::Result<T, Error>;

fn display_filename(filename: &Option<PathBuf>) -> String {
    filename
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Snapshot {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a resolution error for a name that could not be found
    pub fn resolution(name: impl Into<String>) -> Self {
        Error::Resolution(name.into())
    }

    /// Create an import-time error
    pub fn import_time(filename: Option<PathBuf>, message: impl Into<String>) -> Self {
        Error::ImportTime {
            filename,
            message: message.into(),
        }
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// True for the error kinds a batch caller skips instead of aborting on
    pub fn is_skippable(&self) -> bool {
        matches!(self, Error::Resolution(_) | Error::ImportTime { .. })
    }
}
