//! Layer kind tags and their container encoding.

use std::fmt;
use std::str::FromStr;

use crate::error::ContainerError;

/// Layer type code for tile-bearing layers.
pub const LAYER_TYPE_TILES: u32 = 2;

/// Layer type code for quad layers.
pub const LAYER_TYPE_QUADS: u32 = 3;

/// Tilemap flag bits selecting the physics kind of a tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TilemapFlags(u32);

impl TilemapFlags {
    pub const GAME: u32 = 1 << 0;
    pub const TELE: u32 = 1 << 1;
    pub const SPEEDUP: u32 = 1 << 2;
    pub const FRONT: u32 = 1 << 3;
    pub const SWITCH: u32 = 1 << 4;
    pub const TUNE: u32 = 1 << 5;

    /// Creates flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// The closed set of layer kinds a map may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LayerKind {
    Tiles,
    Quads,
    Game,
    Front,
    Tele,
    Speedup,
    Switch,
    Tune,
}

impl LayerKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Tiles,
        Self::Quads,
        Self::Game,
        Self::Front,
        Self::Tele,
        Self::Speedup,
        Self::Switch,
        Self::Tune,
    ];

    /// Resolves a kind from a layer type code and tilemap flags.
    pub fn from_type_and_flags(type_code: u32, flags: u32) -> Result<Self, ContainerError> {
        match type_code {
            LAYER_TYPE_QUADS => Ok(Self::Quads),
            LAYER_TYPE_TILES => Ok(Self::from_tilemap_flags(TilemapFlags::from_raw(flags))),
            _ => Err(ContainerError::UnknownLayerType { type_code, flags }),
        }
    }

    const fn from_tilemap_flags(flags: TilemapFlags) -> Self {
        let raw = flags.raw();
        if raw & TilemapFlags::GAME != 0 {
            Self::Game
        } else if raw & TilemapFlags::TELE != 0 {
            Self::Tele
        } else if raw & TilemapFlags::SPEEDUP != 0 {
            Self::Speedup
        } else if raw & TilemapFlags::FRONT != 0 {
            Self::Front
        } else if raw & TilemapFlags::SWITCH != 0 {
            Self::Switch
        } else if raw & TilemapFlags::TUNE != 0 {
            Self::Tune
        } else {
            Self::Tiles
        }
    }

    /// Returns the container type code for this kind.
    #[must_use]
    pub const fn type_code(self) -> u32 {
        match self {
            Self::Quads => LAYER_TYPE_QUADS,
            Self::Tiles
            | Self::Game
            | Self::Front
            | Self::Tele
            | Self::Speedup
            | Self::Switch
            | Self::Tune => LAYER_TYPE_TILES,
        }
    }

    /// Returns the tilemap flags identifying this kind (zero for plain tiles and quads).
    #[must_use]
    pub const fn tilemap_flags(self) -> TilemapFlags {
        let raw = match self {
            Self::Tiles | Self::Quads => 0,
            Self::Game => TilemapFlags::GAME,
            Self::Tele => TilemapFlags::TELE,
            Self::Speedup => TilemapFlags::SPEEDUP,
            Self::Front => TilemapFlags::FRONT,
            Self::Switch => TilemapFlags::SWITCH,
            Self::Tune => TilemapFlags::TUNE,
        };
        TilemapFlags::from_raw(raw)
    }

    /// Returns `true` for the kinds that live in the physics group.
    #[must_use]
    pub const fn is_physics(self) -> bool {
        !matches!(self, Self::Tiles | Self::Quads)
    }

    /// Returns the wire name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tiles => "tiles",
            Self::Quads => "quads",
            Self::Game => "game",
            Self::Front => "front",
            Self::Tele => "tele",
            Self::Speedup => "speedup",
            Self::Switch => "switch",
            Self::Tune => "tune",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown layer kind name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayerKind(pub String);

impl fmt::Display for UnknownLayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layer kind: {}", self.0)
    }
}

impl std::error::Error for UnknownLayerKind {}

impl FromStr for LayerKind {
    type Err = UnknownLayerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownLayerKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_from_type_code() {
        assert_eq!(
            LayerKind::from_type_and_flags(LAYER_TYPE_QUADS, 0).unwrap(),
            LayerKind::Quads
        );
    }

    #[test]
    fn tiles_flags_select_physics_kind() {
        let cases = [
            (0, LayerKind::Tiles),
            (TilemapFlags::GAME, LayerKind::Game),
            (TilemapFlags::TELE, LayerKind::Tele),
            (TilemapFlags::SPEEDUP, LayerKind::Speedup),
            (TilemapFlags::FRONT, LayerKind::Front),
            (TilemapFlags::SWITCH, LayerKind::Switch),
            (TilemapFlags::TUNE, LayerKind::Tune),
        ];
        for (flags, expected) in cases {
            let kind = LayerKind::from_type_and_flags(LAYER_TYPE_TILES, flags).unwrap();
            assert_eq!(kind, expected, "flags 0x{flags:x}");
        }
    }

    #[test]
    fn unknown_type_code_rejected() {
        let err = LayerKind::from_type_and_flags(10, 0).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::UnknownLayerType { type_code: 10, .. }
        ));
    }

    #[test]
    fn type_code_and_flags_roundtrip() {
        for kind in LayerKind::ALL {
            let back =
                LayerKind::from_type_and_flags(kind.type_code(), kind.tilemap_flags().raw())
                    .unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn names_parse_back() {
        for kind in LayerKind::ALL {
            assert_eq!(kind.name().parse::<LayerKind>().unwrap(), kind);
        }
        assert!("sounds".parse::<LayerKind>().is_err());
    }

    #[test]
    fn physics_kinds() {
        assert!(!LayerKind::Tiles.is_physics());
        assert!(!LayerKind::Quads.is_physics());
        assert!(LayerKind::Game.is_physics());
        assert!(LayerKind::Tune.is_physics());
    }
}
