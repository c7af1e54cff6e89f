//! Error types for tile codec operations.

use std::fmt;

/// Result type for tile codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding tile payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The kind has no tile layout (quads, or an unknown kind name).
    UnsupportedKind { kind: String },

    /// The transported payload could not be decoded.
    Transport(TransportError),
}

/// Errors in the transported form of a tile payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The text is not valid standard base64.
    Base64(base64::DecodeError),

    /// The byte length is not a whole number of cells.
    Length { len: usize, cell_size: usize },

    /// The payload held a different number of cells than required.
    CellCount { expected: usize, actual: usize },
}

impl From<TransportError> for CodecError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<base64::DecodeError> for CodecError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Transport(TransportError::Base64(err))
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedKind { kind } => write!(f, "unsupported tile kind: {kind}"),
            Self::Transport(err) => write!(f, "tile transport error: {err}"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64(err) => write!(f, "invalid base64: {err}"),
            Self::Length { len, cell_size } => {
                write!(
                    f,
                    "payload length {len} is not a multiple of cell size {cell_size}"
                )
            }
            Self::CellCount { expected, actual } => {
                write!(f, "expected {expected} cells, found {actual}")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::UnsupportedKind { .. } => None,
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64(err) => Some(err),
            Self::Length { .. } | Self::CellCount { .. } => None,
        }
    }
}
