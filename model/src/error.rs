//! Error types for map loading and saving.

use std::fmt;

use codec::CodecError;
use container::{ContainerError, EncodeError};

/// Result type for map model operations.
pub type MapResult<T> = Result<T, MapError>;

/// Errors that can occur while assembling a map from records, or writing it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A record or the bundle framing failed to decode.
    Container(ContainerError),

    /// A packed tile payload failed to decode.
    Codec(CodecError),

    /// The bundle could not be written.
    Encode(EncodeError),

    /// A record references a data blob that is not in the bundle.
    MissingData { reference: i32 },

    /// A layer references an image that does not exist.
    ImageOutOfRange { image: i32, count: usize },

    /// A group claims layer records that are out of order or out of range.
    LayerRange {
        group: usize,
        start: u32,
        count: u32,
        expected_start: usize,
        available: usize,
    },

    /// Some layer records are not owned by any group.
    OrphanLayers { owned: usize, total: usize },

    /// A tile layer's packed payload does not hold `width * height` cells.
    CellCount {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    /// The map has no game layer.
    MissingGameLayer,

    /// The map has more than one game layer.
    DuplicateGameLayer,
}

impl From<ContainerError> for MapError {
    fn from(err: ContainerError) -> Self {
        Self::Container(err)
    }
}

impl From<CodecError> for MapError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl From<EncodeError> for MapError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(err) => write!(f, "container error: {err}"),
            Self::Codec(err) => write!(f, "tile codec error: {err}"),
            Self::Encode(err) => write!(f, "bundle encode error: {err}"),
            Self::MissingData { reference } => {
                write!(f, "data blob {reference} missing from bundle")
            }
            Self::ImageOutOfRange { image, count } => {
                write!(f, "image {image} out of range ({count} images)")
            }
            Self::LayerRange {
                group,
                start,
                count,
                expected_start,
                available,
            } => {
                write!(
                    f,
                    "group {group} claims layers {start}..{start}+{count}, expected start {expected_start} of {available}"
                )
            }
            Self::OrphanLayers { owned, total } => {
                write!(f, "groups own {owned} of {total} layers")
            }
            Self::CellCount {
                layer,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "layer {layer} holds {actual} cells, expected {expected}"
                )
            }
            Self::MissingGameLayer => write!(f, "map has no game layer"),
            Self::DuplicateGameLayer => write!(f, "map has more than one game layer"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Container(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_error_converts() {
        let err: MapError = ContainerError::InvalidMagic { found: 0 }.into();
        assert!(matches!(err, MapError::Container(_)));
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn display_cell_count() {
        let err = MapError::CellCount {
            layer: 2,
            expected: 100,
            actual: 99,
        };
        assert_eq!(err.to_string(), "layer 2 holds 99 cells, expected 100");
    }
}
