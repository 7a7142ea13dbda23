//! Error types for catalog and ground-truth loading.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while loading campaign inputs.
#[derive(Debug)]
pub enum CatalogError {
    /// The file could not be opened or read.
    Io {
        /// The file being read, if loading from a path.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The document is not valid JSON of the expected shape.
    Parse {
        /// Decoder error message.
        reason: String,
    },
    /// A ground-truth key is not of the form `"<time> <lat> <lon>"`.
    MalformedKey {
        /// The offending key.
        key: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path: Some(p),
                source,
            } => write!(f, "cannot read {}: {source}", p.display()),
            Self::Io { path: None, source } => write!(f, "I/O error: {source}"),
            Self::Parse { reason } => write!(f, "parse error: {reason}"),
            Self::MalformedKey { key } => {
                write!(f, "malformed ground-truth key '{key}' (expected \"<time> <lat> <lon>\")")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for CatalogError {
    fn from(e: io::Error) -> Self {
        Self::Io {
            path: None,
            source: e,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            reason: e.to_string(),
        }
    }
}
