//! Failure taxonomy for reading a chart version: file access, parse, and lookup errors.

use std::path::PathBuf;

use thiserror::Error;

/// The stage of the read → parse → lookup pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The chart file could not be opened or read
    FileAccess,
    /// The content is not a single, safe YAML document
    Parse,
    /// The document has no usable `version` scalar
    Lookup,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::FileAccess => write!(f, "file access error"),
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Lookup => write!(f, "lookup error"),
        }
    }
}

/// Everything that can go wrong between a chart path and its version.
///
/// Messages never repeat the underlying `source`; print with `{:#}` through
/// `anyhow` to get the full chain.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("file access error: cannot read {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {} is not valid YAML", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("parse error: unsupported tag `{tag}` in {}", path.display())]
    UnsupportedTag { path: PathBuf, tag: String },

    #[error("parse error: `<<` in {} must merge a mapping or a sequence of mappings", path.display())]
    InvalidMerge { path: PathBuf },

    #[error("lookup error: {} contains a {found}, expected a mapping", path.display())]
    NotAMapping { path: PathBuf, found: &'static str },

    #[error("lookup error: {} has no `version` key", path.display())]
    MissingVersion { path: PathBuf },

    #[error("lookup error: `version` in {} is a {found}, expected a scalar", path.display())]
    NotAScalar { path: PathBuf, found: &'static str },
}

impl ChartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChartError::FileAccess { .. } => ErrorKind::FileAccess,
            ChartError::Parse { .. }
            | ChartError::UnsupportedTag { .. }
            | ChartError::InvalidMerge { .. } => ErrorKind::Parse,
            ChartError::NotAMapping { .. }
            | ChartError::MissingVersion { .. }
            | ChartError::NotAScalar { .. } => ErrorKind::Lookup,
        }
    }
}
