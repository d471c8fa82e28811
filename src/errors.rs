//! Error types for the extraction and rewrite pass.
//!
//! Every failure is fatal: the pipeline stops at the first error and hands it
//! back to the caller. The binary prints it and exits non-zero; library users
//! decide for themselves. Modules rewritten before the failure stay rewritten.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for tablegen operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system errors (read, write, directory creation)
    #[error("File system error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The module is not valid Rust
    #[error("Parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// A table declaration that breaks the extraction rules
    #[error("{file}:{line}:{column}: {message}\n    in: {construct}")]
    Structural {
        file: String,
        line: usize,
        column: usize,
        construct: String,
        message: String,
    },

    /// A support import would shadow an existing binding
    #[error("{file}: cannot import `{wanted}`: `{name}` already refers to `{existing}`")]
    ImportConflict {
        file: String,
        name: String,
        existing: String,
        wanted: String,
    },

    /// CSV serialization errors
    #[error("CSV error for {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the user has to edit a source module to get past this error.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Structural { .. } | Self::ImportConflict { .. }
        )
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
