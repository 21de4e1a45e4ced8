//! Error types.
//!
//! Construction of an engine can fail; queries cannot. A corrupt record
//! encountered at query time contributes no entries and is never surfaced
//! as an error.

use std::path::PathBuf;

/// A specialized Result type whose error defaults to [`BinlexError`].
pub type Result<T, E = BinlexError> = std::result::Result<T, E>;

/// Errors reported while opening and validating the binary resources.
#[derive(Debug, thiserror::Error)]
pub enum BinlexError {
    /// The file could not be opened or mapped.
    #[error("could not open {path:?}: {source}")]
    ImageOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is shorter than its fixed header.
    #[error("image too small: {actual} bytes, need at least {expected}")]
    ImageTooSmall { expected: usize, actual: usize },

    /// The signature at the start of the file does not match.
    #[error("bad signature in {0}")]
    BadSignature(&'static str),

    /// A section offset or length is inconsistent with the image size.
    #[error("invalid format: {arg}: {msg}")]
    InvalidFormat { arg: &'static str, msg: String },

    /// Any other I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BinlexError {
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat {
            arg,
            msg: msg.into(),
        }
    }
}
