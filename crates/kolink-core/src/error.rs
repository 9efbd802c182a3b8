//! Error type shared by every kolink phase.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KolinkError>;

#[derive(Debug, Error)]
pub enum KolinkError {
    /// The run configuration is structurally valid YAML but semantically wrong.
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A source file could not be parsed, or parsed with syntax errors.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Building or rendering a single partition failed.
    #[error("failed to render {target}: {message}")]
    Render { target: PathBuf, message: String },
}

impl KolinkError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn render(target: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Render {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Whether this error is scoped to one partition rather than the whole job.
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}
