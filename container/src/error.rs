//! Error types for container operations.

use std::fmt;

use cursor::CursorError;

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors that can occur while decoding records or bundle framing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContainerError {
    /// A record was shorter than its layout requires.
    Cursor(CursorError),

    /// Bundle is too small to contain the required header.
    BundleTooSmall { actual: usize, required: usize },

    /// Invalid magic number in bundle header.
    InvalidMagic { found: u32 },

    /// Unsupported bundle version.
    UnsupportedVersion { found: u16 },

    /// Reserved header flags were set.
    InvalidFlags { flags: u16 },

    /// Payload length mismatch.
    PayloadLengthMismatch { header_len: u32, actual_len: usize },

    /// Unknown section tag encountered.
    UnknownSectionTag { tag: u8 },

    /// Layer type code outside the supported set.
    UnknownLayerType { type_code: u32, flags: u32 },

    /// A layer record was routed to the parser for another layer type.
    LayerTypeMismatch { expected: u32, found: u32 },

    /// A record reported a negative count.
    NegativeCount { field: &'static str, value: i32 },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Section framing error.
    SectionFraming(SectionFramingError),
}

/// Specific container limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    BundleBytes,
    RecordCount,
    RecordLength,
    DataLength,
}

/// Errors that can occur while framing sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionFramingError {
    InvalidVarint,
    Truncated { needed: usize, available: usize },
}

/// Errors that can occur while building a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    LengthOverflow { length: usize },
    TooManyRecords { count: usize },
}

impl From<CursorError> for ContainerError {
    fn from(err: CursorError) -> Self {
        Self::Cursor(err)
    }
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cursor(err) => write!(f, "record unparseable: {err}"),
            Self::BundleTooSmall { actual, required } => {
                write!(
                    f,
                    "bundle too small: {actual} bytes, need at least {required}"
                )
            }
            Self::InvalidMagic { found } => {
                write!(f, "invalid magic number: 0x{found:08X}")
            }
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported bundle version: {found}")
            }
            Self::InvalidFlags { flags } => {
                write!(f, "invalid flags: 0x{flags:04X}")
            }
            Self::PayloadLengthMismatch {
                header_len,
                actual_len,
            } => {
                write!(
                    f,
                    "payload length mismatch: header {header_len} bytes but {actual_len} available"
                )
            }
            Self::UnknownSectionTag { tag } => {
                write!(f, "unknown section tag: {tag}")
            }
            Self::UnknownLayerType { type_code, flags } => {
                write!(f, "unknown layer type {type_code} (flags 0x{flags:X})")
            }
            Self::LayerTypeMismatch { expected, found } => {
                write!(f, "layer type mismatch: expected {expected}, found {found}")
            }
            Self::NegativeCount { field, value } => {
                write!(f, "negative {field}: {value}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::SectionFraming(err) => write!(f, "section framing error: {err}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BundleBytes => "bundle bytes",
            Self::RecordCount => "record count",
            Self::RecordLength => "record length",
            Self::DataLength => "data length",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for SectionFramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVarint => write!(f, "invalid varint"),
            Self::Truncated { needed, available } => {
                write!(
                    f,
                    "truncated section: need {needed} bytes, have {available}"
                )
            }
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthOverflow { length } => write!(f, "length overflow: {length}"),
            Self::TooManyRecords { count } => write!(f, "too many records: {count}"),
        }
    }
}

impl std::error::Error for ContainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cursor(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_magic() {
        let err = ContainerError::InvalidMagic { found: 0xDEAD_BEEF };
        assert!(err.to_string().contains("DEADBEEF"));
    }

    #[test]
    fn display_limits_exceeded() {
        let err = ContainerError::LimitsExceeded {
            kind: LimitKind::RecordCount,
            limit: 4,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("record count"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn cursor_error_converts() {
        let err: ContainerError = CursorError::OutOfBounds {
            requested: 4,
            available: 0,
        }
        .into();
        assert!(matches!(err, ContainerError::Cursor(_)));
        assert!(err.to_string().contains("unparseable"));
    }

    #[test]
    fn section_framing_display() {
        let err = SectionFramingError::Truncated {
            needed: 10,
            available: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError::LengthOverflow { length: 7 };
        assert!(err.to_string().contains("overflow"));
    }
}
