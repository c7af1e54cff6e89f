//! Error types for the change protocol.

use std::fmt;
use std::io;

use codec::{CodecError, TileKind};
use container::LayerKind;
use model::MapError;

use crate::types::Seq;

/// Result type for apply operations.
pub type ApplyResult<T> = Result<T, ApplyError>;

/// Reasons the apply engine refuses a change. A refused change never mutates the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The carried cell failed to decode.
    Codec(CodecError),

    GroupOutOfRange { group: u32, count: usize },

    LayerOutOfRange { group: u32, layer: u32, count: usize },

    CellOutOfRange {
        x: u32,
        y: u32,
        width: usize,
        height: usize,
    },

    /// A move targets a position that does not exist.
    OrderOutOfRange { order: u32, count: usize },

    /// The change's tile kind does not match the addressed layer.
    KindMismatch { layer: LayerKind, found: TileKind },

    DeletePhysicsGroup,

    RenamePhysicsGroup,

    DeleteGameLayer,

    /// Physics layers stay in the physics group.
    MovePhysicsLayer { kind: LayerKind },

    RenamePhysicsLayer { kind: LayerKind },

    /// Only tiles layers have a color.
    ColorUnsupported { kind: LayerKind },

    /// Quads layers have no dimensions.
    ResizeUnsupported { kind: LayerKind },

    InvalidDimension { value: u32, max: u32 },

    NameTooLong { len: usize, max: usize },

    TooManyGroups { max: usize },

    TooManyLayers { max: usize },

    /// The map already holds the maximum number of layers.
    TooManyMapLayers { max: usize },

    /// The packed cells of a layer would exceed the size limit.
    LayerTooLarge {
        kind: LayerKind,
        width: usize,
        height: usize,
        max: usize,
    },

    /// The layer kind cannot be created in this group.
    CreateUnsupported { kind: LayerKind },

    /// The event does not edit the map.
    NotAnEdit { name: &'static str },
}

impl From<CodecError> for ApplyError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(err) => write!(f, "invalid tile data: {err}"),
            Self::GroupOutOfRange { group, count } => {
                write!(f, "invalid group index {group} ({count} groups)")
            }
            Self::LayerOutOfRange {
                group,
                layer,
                count,
            } => {
                write!(
                    f,
                    "invalid layer index {layer} in group {group} ({count} layers)"
                )
            }
            Self::CellOutOfRange {
                x,
                y,
                width,
                height,
            } => {
                write!(f, "tile change at ({x}, {y}) outside {width}x{height} layer")
            }
            Self::OrderOutOfRange { order, count } => {
                write!(f, "invalid new position {order} ({count} slots)")
            }
            Self::KindMismatch { layer, found } => {
                write!(f, "{found} tile change on {layer} layer")
            }
            Self::DeletePhysicsGroup => write!(f, "cannot delete the physics group"),
            Self::RenamePhysicsGroup => write!(f, "cannot rename the physics group"),
            Self::DeleteGameLayer => write!(f, "cannot delete the game layer"),
            Self::MovePhysicsLayer { kind } => {
                write!(f, "cannot move the {kind} layer out of the physics group")
            }
            Self::RenamePhysicsLayer { kind } => write!(f, "cannot rename the {kind} layer"),
            Self::ColorUnsupported { kind } => write!(f, "cannot change color of {kind} layer"),
            Self::ResizeUnsupported { kind } => {
                write!(f, "cannot change dimensions of {kind} layer")
            }
            Self::InvalidDimension { value, max } => {
                write!(f, "invalid layer dimension {value} (must be 1..={max})")
            }
            Self::NameTooLong { len, max } => {
                write!(f, "name too long: {len} bytes > {max}")
            }
            Self::TooManyGroups { max } => write!(f, "too many groups (max {max})"),
            Self::TooManyLayers { max } => write!(f, "too many layers in group (max {max})"),
            Self::TooManyMapLayers { max } => write!(f, "too many layers in map (max {max})"),
            Self::LayerTooLarge {
                kind,
                width,
                height,
                max,
            } => {
                write!(f, "{width}x{height} {kind} layer exceeds {max} bytes")
            }
            Self::CreateUnsupported { kind } => {
                write!(f, "cannot create a {kind} layer in this group")
            }
            Self::NotAnEdit { name } => write!(f, "{name} does not edit the map"),
        }
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors decoding protocol messages.
#[derive(Debug)]
pub enum ProtocolError {
    /// The text is not an envelope.
    Json(serde_json::Error),

    /// The envelope names a message outside the vocabulary.
    UnknownMessage { name: String },

    /// The message is known but its content has the wrong shape.
    Malformed {
        name: &'static str,
        source: serde_json::Error,
    },

    /// The content carries invalid base64.
    Base64(base64::DecodeError),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid envelope: {err}"),
            Self::UnknownMessage { name } => write!(f, "unknown message: {name}"),
            Self::Malformed { name, source } => write!(f, "malformed {name} message: {source}"),
            Self::Base64(err) => write!(f, "invalid base64 payload: {err}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) | Self::Malformed { source: err, .. } => Some(err),
            Self::Base64(err) => Some(err),
            Self::UnknownMessage { .. } => None,
        }
    }
}

/// Errors a replica reports while following the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaError {
    /// A broadcast arrived out of sequence.
    OutOfOrder { expected: Seq, found: Seq },

    /// A sequenced broadcast failed to apply; the replica has diverged.
    Apply { seq: Seq, error: ApplyError },
}

impl fmt::Display for ReplicaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder { expected, found } => {
                write!(
                    f,
                    "broadcast out of order: expected seq {}, found {}",
                    expected.raw(),
                    found.raw()
                )
            }
            Self::Apply { seq, error } => {
                write!(f, "broadcast {} failed to apply: {error}", seq.raw())
            }
        }
    }
}

impl std::error::Error for ReplicaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apply { error, .. } => Some(error),
            Self::OutOfOrder { .. } => None,
        }
    }
}

/// Result type for map store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from a map store.
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    NotFound { name: String },
    InvalidName { name: String, reason: NameError },
}

/// Why a map name is not acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong { len: usize, max: usize },
    PathSeparator,
    LeadingDot,
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "map store i/o error: {err}"),
            Self::NotFound { name } => write!(f, "map not found: {name}"),
            Self::InvalidName { name, reason } => write!(f, "invalid map name {name:?}: {reason}"),
        }
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::TooLong { len, max } => write!(f, "{len} bytes > {max}"),
            Self::PathSeparator => write!(f, "contains a path separator"),
            Self::LeadingDot => write!(f, "starts with a dot"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for lobby operations.
pub type LobbyResult<T> = Result<T, LobbyError>;

/// Errors from lobby queries.
#[derive(Debug)]
pub enum LobbyError {
    Store(StoreError),

    /// A stored or uploaded bundle does not hold a valid map.
    Map(MapError),

    /// The peer has not joined a room.
    NotJoined,

    /// A map with this name already exists.
    Duplicate { name: String },

    /// The map has connected users.
    InUse { name: String, users: usize },

    /// No upload was reserved under this name by this peer.
    NoPendingUpload { name: String },

    /// A blank map was requested with invalid dimensions.
    InvalidDimension { value: u32, max: u32 },

    /// A blank map's game layer would exceed the layer size limit.
    MapTooLarge {
        width: u32,
        height: u32,
        max_bytes: usize,
    },
}

impl From<StoreError> for LobbyError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<MapError> for LobbyError {
    fn from(err: MapError) -> Self {
        Self::Map(err)
    }
}

impl fmt::Display for LobbyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Map(err) => write!(f, "invalid map: {err}"),
            Self::NotJoined => write!(f, "not in a room"),
            Self::Duplicate { name } => write!(f, "map already exists: {name}"),
            Self::InUse { name, users } => {
                write!(f, "map {name} has {users} connected users")
            }
            Self::NoPendingUpload { name } => write!(f, "no upload pending for {name}"),
            Self::InvalidDimension { value, max } => {
                write!(f, "invalid map dimension {value} (must be 1..={max})")
            }
            Self::MapTooLarge {
                width,
                height,
                max_bytes,
            } => {
                write!(f, "{width}x{height} map exceeds {max_bytes} bytes per layer")
            }
        }
    }
}

impl std::error::Error for LobbyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Map(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusal_messages_are_readable() {
        assert_eq!(
            ApplyError::DeletePhysicsGroup.to_string(),
            "cannot delete the physics group"
        );
        assert_eq!(
            ApplyError::InvalidDimension {
                value: 0,
                max: 10_000
            }
            .to_string(),
            "invalid layer dimension 0 (must be 1..=10000)"
        );
    }

    #[test]
    fn replica_out_of_order_display() {
        let err = ReplicaError::OutOfOrder {
            expected: Seq::new(3),
            found: Seq::new(5),
        };
        assert!(err.to_string().contains("expected seq 3, found 5"));
    }

    #[test]
    fn store_error_from_io() {
        let err: StoreError = io::Error::new(io::ErrorKind::Other, "disk").into();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn name_error_display() {
        let err = StoreError::InvalidName {
            name: "../x".to_string(),
            reason: NameError::PathSeparator,
        };
        assert!(err.to_string().contains("path separator"));
    }
}
