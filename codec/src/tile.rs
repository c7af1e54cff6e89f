//! Tile kinds and their typed cell values.

use std::fmt;
use std::str::FromStr;

use container::LayerKind;

use crate::error::CodecError;

/// The seven layer kinds that carry tile cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TileKind {
    Tiles,
    Game,
    Front,
    Tele,
    Speedup,
    Switch,
    Tune,
}

impl TileKind {
    pub const ALL: [Self; 7] = [
        Self::Tiles,
        Self::Game,
        Self::Front,
        Self::Tele,
        Self::Speedup,
        Self::Switch,
        Self::Tune,
    ];

    /// Returns the packed size of one cell in bytes.
    #[must_use]
    pub const fn cell_size(self) -> usize {
        match self {
            Self::Tiles | Self::Game | Self::Front | Self::Switch => 4,
            Self::Tele | Self::Tune => 2,
            Self::Speedup => 6,
        }
    }

    /// Returns the layer kind this tile kind belongs to.
    #[must_use]
    pub const fn layer_kind(self) -> LayerKind {
        match self {
            Self::Tiles => LayerKind::Tiles,
            Self::Game => LayerKind::Game,
            Self::Front => LayerKind::Front,
            Self::Tele => LayerKind::Tele,
            Self::Speedup => LayerKind::Speedup,
            Self::Switch => LayerKind::Switch,
            Self::Tune => LayerKind::Tune,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.layer_kind().name()
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<LayerKind> for TileKind {
    type Error = CodecError;

    fn try_from(kind: LayerKind) -> Result<Self, Self::Error> {
        match kind {
            LayerKind::Tiles => Ok(Self::Tiles),
            LayerKind::Game => Ok(Self::Game),
            LayerKind::Front => Ok(Self::Front),
            LayerKind::Tele => Ok(Self::Tele),
            LayerKind::Speedup => Ok(Self::Speedup),
            LayerKind::Switch => Ok(Self::Switch),
            LayerKind::Tune => Ok(Self::Tune),
            LayerKind::Quads => Err(CodecError::UnsupportedKind {
                kind: kind.name().to_string(),
            }),
        }
    }
}

impl From<TileKind> for LayerKind {
    fn from(kind: TileKind) -> Self {
        kind.layer_kind()
    }
}

impl FromStr for TileKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CodecError::UnsupportedKind {
                kind: s.to_string(),
            })
    }
}

/// A plain tile cell, used by tiles, game and front layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub id: u8,
    pub flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeleTile {
    pub number: u8,
    pub id: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SpeedupTile {
    pub force: u8,
    pub max_speed: u8,
    pub id: u8,
    /// Direction in degrees.
    pub angle: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchTile {
    pub number: u8,
    pub id: u8,
    pub flags: u8,
    pub delay: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TuneTile {
    pub number: u8,
    pub id: u8,
}

/// A single cell tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum TileValue {
    Tiles(Tile),
    Game(Tile),
    Front(Tile),
    Tele(TeleTile),
    Speedup(SpeedupTile),
    Switch(SwitchTile),
    Tune(TuneTile),
}

impl TileValue {
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        match self {
            Self::Tiles(_) => TileKind::Tiles,
            Self::Game(_) => TileKind::Game,
            Self::Front(_) => TileKind::Front,
            Self::Tele(_) => TileKind::Tele,
            Self::Speedup(_) => TileKind::Speedup,
            Self::Switch(_) => TileKind::Switch,
            Self::Tune(_) => TileKind::Tune,
        }
    }

    /// Returns the empty cell of `kind`.
    #[must_use]
    pub fn empty(kind: TileKind) -> Self {
        match kind {
            TileKind::Tiles => Self::Tiles(Tile::default()),
            TileKind::Game => Self::Game(Tile::default()),
            TileKind::Front => Self::Front(Tile::default()),
            TileKind::Tele => Self::Tele(TeleTile::default()),
            TileKind::Speedup => Self::Speedup(SpeedupTile::default()),
            TileKind::Switch => Self::Switch(SwitchTile::default()),
            TileKind::Tune => Self::Tune(TuneTile::default()),
        }
    }

    /// Returns the cell id. Id 0 is the empty tile.
    #[must_use]
    pub const fn id(&self) -> u8 {
        match self {
            Self::Tiles(t) | Self::Game(t) | Self::Front(t) => t.id,
            Self::Tele(t) => t.id,
            Self::Speedup(t) => t.id,
            Self::Switch(t) => t.id,
            Self::Tune(t) => t.id,
        }
    }
}

/// Typed cells of one layer, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileCells {
    Tiles(Vec<Tile>),
    Game(Vec<Tile>),
    Front(Vec<Tile>),
    Tele(Vec<TeleTile>),
    Speedup(Vec<SpeedupTile>),
    Switch(Vec<SwitchTile>),
    Tune(Vec<TuneTile>),
}

impl TileCells {
    /// Creates `count` empty cells of `kind`.
    #[must_use]
    pub fn empty(kind: TileKind, count: usize) -> Self {
        match kind {
            TileKind::Tiles => Self::Tiles(vec![Tile::default(); count]),
            TileKind::Game => Self::Game(vec![Tile::default(); count]),
            TileKind::Front => Self::Front(vec![Tile::default(); count]),
            TileKind::Tele => Self::Tele(vec![TeleTile::default(); count]),
            TileKind::Speedup => Self::Speedup(vec![SpeedupTile::default(); count]),
            TileKind::Switch => Self::Switch(vec![SwitchTile::default(); count]),
            TileKind::Tune => Self::Tune(vec![TuneTile::default(); count]),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TileKind {
        match self {
            Self::Tiles(_) => TileKind::Tiles,
            Self::Game(_) => TileKind::Game,
            Self::Front(_) => TileKind::Front,
            Self::Tele(_) => TileKind::Tele,
            Self::Speedup(_) => TileKind::Speedup,
            Self::Switch(_) => TileKind::Switch,
            Self::Tune(_) => TileKind::Tune,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Tiles(v) | Self::Game(v) | Self::Front(v) => v.len(),
            Self::Tele(v) => v.len(),
            Self::Speedup(v) => v.len(),
            Self::Switch(v) => v.len(),
            Self::Tune(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cell `index` tagged with its kind.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<TileValue> {
        match self {
            Self::Tiles(v) => v.get(index).copied().map(TileValue::Tiles),
            Self::Game(v) => v.get(index).copied().map(TileValue::Game),
            Self::Front(v) => v.get(index).copied().map(TileValue::Front),
            Self::Tele(v) => v.get(index).copied().map(TileValue::Tele),
            Self::Speedup(v) => v.get(index).copied().map(TileValue::Speedup),
            Self::Switch(v) => v.get(index).copied().map(TileValue::Switch),
            Self::Tune(v) => v.get(index).copied().map(TileValue::Tune),
        }
    }

    /// Iterates over the cells, each tagged with its kind.
    pub fn iter(&self) -> impl Iterator<Item = TileValue> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }
}

impl From<TileValue> for TileCells {
    fn from(value: TileValue) -> Self {
        match value {
            TileValue::Tiles(t) => Self::Tiles(vec![t]),
            TileValue::Game(t) => Self::Game(vec![t]),
            TileValue::Front(t) => Self::Front(vec![t]),
            TileValue::Tele(t) => Self::Tele(vec![t]),
            TileValue::Speedup(t) => Self::Speedup(vec![t]),
            TileValue::Switch(t) => Self::Switch(vec![t]),
            TileValue::Tune(t) => Self::Tune(vec![t]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_sizes() {
        assert_eq!(TileKind::Tiles.cell_size(), 4);
        assert_eq!(TileKind::Game.cell_size(), 4);
        assert_eq!(TileKind::Front.cell_size(), 4);
        assert_eq!(TileKind::Tele.cell_size(), 2);
        assert_eq!(TileKind::Speedup.cell_size(), 6);
        assert_eq!(TileKind::Switch.cell_size(), 4);
        assert_eq!(TileKind::Tune.cell_size(), 2);
    }

    #[test]
    fn quads_is_not_a_tile_kind() {
        let err = TileKind::try_from(LayerKind::Quads).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedKind { .. }));
        assert!("quads".parse::<TileKind>().is_err());
        assert!("sounds".parse::<TileKind>().is_err());
    }

    #[test]
    fn names_match_layer_kinds() {
        for kind in TileKind::ALL {
            assert_eq!(kind.name().parse::<TileKind>().unwrap(), kind);
            assert_eq!(TileKind::try_from(LayerKind::from(kind)).unwrap(), kind);
        }
    }

    #[test]
    fn value_into_cells() {
        let value = TileValue::Tele(TeleTile { number: 3, id: 7 });
        let cells = TileCells::from(value);
        assert_eq!(cells.kind(), TileKind::Tele);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells.get(0), Some(value));
        assert_eq!(cells.get(1), None);
    }

    #[test]
    fn empty_cells() {
        let cells = TileCells::empty(TileKind::Speedup, 3);
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|v| v == TileValue::empty(TileKind::Speedup)));
        assert!(TileCells::empty(TileKind::Game, 0).is_empty());
    }
}
