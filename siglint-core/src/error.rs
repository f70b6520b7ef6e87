//! Typed error handling for siglint.
//!
//! Parser failures carry enough context to be turned into per-item
//! diagnostics; everything above the parser (config, CLI) wraps these in
//! `anyhow` with additional context.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for siglint operations.
#[derive(Error, Debug)]
pub enum SiglintError {
    /// Input ended while a delimiter was still open.
    #[error("unmatched '{open}': input ended at depth {depth}")]
    UnmatchedDelimiter { open: char, depth: usize },

    /// Expected an identifier but found something else.
    #[error("invalid identifier at '{found}'")]
    InvalidIdentifier { found: String },

    /// A parameter list could not be consumed one `name: Type` at a time.
    #[error("malformed argument list: {message}")]
    MalformedArgumentList { message: String },

    /// Any other structural problem in a signature (missing token, trailing input).
    #[error("malformed signature: {message}")]
    MalformedSignature { message: String },

    /// Reachability was queried for a method the dependency map does not know.
    #[error("unknown start method '{method}'")]
    UnknownStartMethod { method: String },

    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Artifact (de)serialization errors
    #[error("Artifact error at {path}: {message}")]
    Artifact { path: PathBuf, message: String },
}

impl SiglintError {
    pub fn unmatched(open: char, depth: usize) -> Self {
        Self::UnmatchedDelimiter { open, depth }
    }

    /// Create an invalid-identifier error, keeping a short excerpt of the input.
    pub fn invalid_identifier(input: &str) -> Self {
        Self::InvalidIdentifier {
            found: excerpt(input),
        }
    }

    pub fn malformed_args(message: impl Into<String>) -> Self {
        Self::MalformedArgumentList {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSignature {
            message: message.into(),
        }
    }

    pub fn unknown_start(method: impl Into<String>) -> Self {
        Self::UnknownStartMethod {
            method: method.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn artifact(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stable kind name, used as the `kind` field of parser diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UnmatchedDelimiter { .. } => "UnmatchedDelimiter",
            Self::InvalidIdentifier { .. } => "InvalidIdentifier",
            Self::MalformedArgumentList { .. } => "MalformedArgumentList",
            Self::MalformedSignature { .. } => "MalformedSignature",
            Self::UnknownStartMethod { .. } => "UnknownStartMethod",
            Self::Io { .. } => "Io",
            Self::Config { .. } => "Config",
            Self::Artifact { .. } => "Artifact",
        }
    }

    /// Check if this error only affects a single parsed item.
    pub fn is_item_local(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedDelimiter { .. }
                | Self::InvalidIdentifier { .. }
                | Self::MalformedArgumentList { .. }
                | Self::MalformedSignature { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Artifact { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// First line of `input`, capped at 32 chars.
fn excerpt(input: &str) -> String {
    let line = input.lines().next().unwrap_or_default();
    if line.chars().count() > 32 {
        let truncated: String = line.chars().take(29).collect();
        format!("{}...", truncated)
    } else {
        line.to_string()
    }
}

/// Convenience type alias for siglint results.
pub type SiglintResult<T> = Result<T, SiglintError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> SiglintResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> SiglintResult<T> {
        self.map_err(|e| SiglintError::io(path, e))
    }
}
