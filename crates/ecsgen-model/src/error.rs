//! Errors raised while reading, validating or writing assembly images.

use std::fmt;
use std::path::PathBuf;

/// Image I/O and encoding failures.
#[derive(Debug)]
pub enum ImageError {
    /// Reading or writing a file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The byte stream is not a valid encoded image or symbol table.
    Decode(serde_json::Error),
    /// Serializing the image failed.
    Encode(serde_json::Error),
    /// The stream decoded but is not an image of a supported format.
    UnsupportedFormat { format: String, version: u32 },
    /// The metadata graph violates a structural invariant.
    Malformed { assembly: String, reason: String },
}

impl ImageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(assembly: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            assembly: assembly.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Decode(err) => write!(f, "failed to decode image: {err}"),
            Self::Encode(err) => write!(f, "failed to encode image: {err}"),
            Self::UnsupportedFormat { format, version } => {
                write!(f, "unsupported image format '{format}' version {version}")
            }
            Self::Malformed { assembly, reason } => {
                write!(f, "malformed assembly '{assembly}': {reason}")
            }
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::UnsupportedFormat { .. } | Self::Malformed { .. } => None,
        }
    }
}
