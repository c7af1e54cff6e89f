//! Layers and their per-kind payloads.

use codec::{SpeedupTile, SwitchTile, TeleTile, Tile, TileGrid, TileKind, TileValue, TuneTile};
use container::{Color, LayerKind, Quad, NO_REF};

/// A plain tiles layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilesLayer {
    pub name: String,
    pub detail: bool,
    pub color: Color,
    /// Color envelope index, [`NO_REF`] when unset.
    pub color_env: i32,
    pub color_env_offset: i32,
    /// Index into the map's images.
    pub image: Option<usize>,
    pub tiles: TileGrid<Tile>,
}

impl TilesLayer {
    /// Creates an empty, untextured tiles layer.
    #[must_use]
    pub fn new(name: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            name: name.into(),
            detail: false,
            color: Color::WHITE,
            color_env: NO_REF,
            color_env_offset: 0,
            image: None,
            tiles: TileGrid::new(width, height),
        }
    }
}

/// A quads layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadsLayer {
    pub name: String,
    pub detail: bool,
    pub image: Option<usize>,
    pub quads: Vec<Quad>,
}

impl QuadsLayer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A physics layer. Physics layers have no editable attributes besides their cells.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsLayer<T> {
    pub tiles: TileGrid<T>,
}

impl<T: Copy + Default> PhysicsLayer<T> {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            tiles: TileGrid::new(width, height),
        }
    }
}

/// A map layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Layer {
    Tiles(TilesLayer),
    Quads(QuadsLayer),
    Game(PhysicsLayer<Tile>),
    Front(PhysicsLayer<Tile>),
    Tele(PhysicsLayer<TeleTile>),
    Speedup(PhysicsLayer<SpeedupTile>),
    Switch(PhysicsLayer<SwitchTile>),
    Tune(PhysicsLayer<TuneTile>),
}

macro_rules! each_grid {
    ($layer:expr, $grid:ident => $body:expr, quads => $quads:expr) => {
        match $layer {
            Layer::Tiles(TilesLayer { tiles: $grid, .. })
            | Layer::Game(PhysicsLayer { tiles: $grid })
            | Layer::Front(PhysicsLayer { tiles: $grid }) => $body,
            Layer::Tele(PhysicsLayer { tiles: $grid }) => $body,
            Layer::Speedup(PhysicsLayer { tiles: $grid }) => $body,
            Layer::Switch(PhysicsLayer { tiles: $grid }) => $body,
            Layer::Tune(PhysicsLayer { tiles: $grid }) => $body,
            Layer::Quads(_) => $quads,
        }
    };
}

impl Layer {
    /// Creates an empty physics layer of `kind`. Returns `None` for tiles and quads.
    #[must_use]
    pub fn physics(kind: LayerKind, width: usize, height: usize) -> Option<Self> {
        let layer = match kind {
            LayerKind::Game => Self::Game(PhysicsLayer::new(width, height)),
            LayerKind::Front => Self::Front(PhysicsLayer::new(width, height)),
            LayerKind::Tele => Self::Tele(PhysicsLayer::new(width, height)),
            LayerKind::Speedup => Self::Speedup(PhysicsLayer::new(width, height)),
            LayerKind::Switch => Self::Switch(PhysicsLayer::new(width, height)),
            LayerKind::Tune => Self::Tune(PhysicsLayer::new(width, height)),
            LayerKind::Tiles | LayerKind::Quads => return None,
        };
        Some(layer)
    }

    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        match self {
            Self::Tiles(_) => LayerKind::Tiles,
            Self::Quads(_) => LayerKind::Quads,
            Self::Game(_) => LayerKind::Game,
            Self::Front(_) => LayerKind::Front,
            Self::Tele(_) => LayerKind::Tele,
            Self::Speedup(_) => LayerKind::Speedup,
            Self::Switch(_) => LayerKind::Switch,
            Self::Tune(_) => LayerKind::Tune,
        }
    }

    /// Returns the tile kind of tile-bearing layers.
    #[must_use]
    pub fn tile_kind(&self) -> Option<TileKind> {
        TileKind::try_from(self.kind()).ok()
    }

    /// Returns the layer name. Physics layers have none.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Tiles(layer) => Some(&layer.name),
            Self::Quads(layer) => Some(&layer.name),
            _ => None,
        }
    }

    pub fn name_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Tiles(layer) => Some(&mut layer.name),
            Self::Quads(layer) => Some(&mut layer.name),
            _ => None,
        }
    }

    /// Returns `(width, height)` of tile-bearing layers.
    #[must_use]
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        each_grid!(self, grid => Some((grid.width(), grid.height())), quads => None)
    }

    /// Resizes a tile-bearing layer, keeping its top-left region.
    ///
    /// Returns `false` for quads layers.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        each_grid!(self, grid => {
            grid.resize(width, height);
            true
        }, quads => false)
    }

    /// Returns the cell at column `x`, row `y`.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<TileValue> {
        match self {
            Self::Tiles(layer) => layer.tiles.get(x, y).map(TileValue::Tiles),
            Self::Game(layer) => layer.tiles.get(x, y).map(TileValue::Game),
            Self::Front(layer) => layer.tiles.get(x, y).map(TileValue::Front),
            Self::Tele(layer) => layer.tiles.get(x, y).map(TileValue::Tele),
            Self::Speedup(layer) => layer.tiles.get(x, y).map(TileValue::Speedup),
            Self::Switch(layer) => layer.tiles.get(x, y).map(TileValue::Switch),
            Self::Tune(layer) => layer.tiles.get(x, y).map(TileValue::Tune),
            Self::Quads(_) => None,
        }
    }

    /// Writes a cell and returns the previous value.
    ///
    /// Returns `None` without writing when the coordinate is outside the
    /// layer or the value's kind differs from the layer's.
    pub fn replace_cell(&mut self, x: usize, y: usize, value: TileValue) -> Option<TileValue> {
        match (self, value) {
            (Self::Tiles(layer), TileValue::Tiles(t)) => {
                layer.tiles.set(x, y, t).map(TileValue::Tiles)
            }
            (Self::Game(layer), TileValue::Game(t)) => layer.tiles.set(x, y, t).map(TileValue::Game),
            (Self::Front(layer), TileValue::Front(t)) => {
                layer.tiles.set(x, y, t).map(TileValue::Front)
            }
            (Self::Tele(layer), TileValue::Tele(t)) => layer.tiles.set(x, y, t).map(TileValue::Tele),
            (Self::Speedup(layer), TileValue::Speedup(t)) => {
                layer.tiles.set(x, y, t).map(TileValue::Speedup)
            }
            (Self::Switch(layer), TileValue::Switch(t)) => {
                layer.tiles.set(x, y, t).map(TileValue::Switch)
            }
            (Self::Tune(layer), TileValue::Tune(t)) => layer.tiles.set(x, y, t).map(TileValue::Tune),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physics_constructor_rejects_tiles_and_quads() {
        assert!(Layer::physics(LayerKind::Tiles, 1, 1).is_none());
        assert!(Layer::physics(LayerKind::Quads, 1, 1).is_none());
        for kind in LayerKind::ALL.into_iter().filter(|k| k.is_physics()) {
            let layer = Layer::physics(kind, 3, 2).unwrap();
            assert_eq!(layer.kind(), kind);
            assert_eq!(layer.dimensions(), Some((3, 2)));
            assert_eq!(layer.name(), None);
        }
    }

    #[test]
    fn replace_cell_checks_kind() {
        let mut layer = Layer::physics(LayerKind::Tele, 2, 2).unwrap();
        let tele = TileValue::Tele(TeleTile { number: 1, id: 26 });
        assert_eq!(
            layer.replace_cell(1, 1, tele),
            Some(TileValue::empty(TileKind::Tele))
        );
        assert_eq!(layer.cell(1, 1), Some(tele));

        let game = TileValue::Game(Tile { id: 1, flags: 0 });
        assert_eq!(layer.replace_cell(0, 0, game), None);
        assert_eq!(layer.cell(0, 0), Some(TileValue::empty(TileKind::Tele)));
    }

    #[test]
    fn replace_cell_out_of_bounds() {
        let mut layer = Layer::Tiles(TilesLayer::new("Tiles", 2, 2));
        let value = TileValue::Tiles(Tile { id: 4, flags: 0 });
        assert_eq!(layer.replace_cell(2, 0, value), None);
    }

    #[test]
    fn quads_have_names_but_no_cells() {
        let mut layer = Layer::Quads(QuadsLayer::new("Sky"));
        assert_eq!(layer.name(), Some("Sky"));
        assert_eq!(layer.dimensions(), None);
        assert!(!layer.resize(4, 4));
        assert_eq!(layer.cell(0, 0), None);
        assert_eq!(layer.tile_kind(), None);
    }

    #[test]
    fn resize_tiles_layer() {
        let mut layer = Layer::Tiles(TilesLayer::new("Tiles", 2, 2));
        assert!(layer.resize(5, 1));
        assert_eq!(layer.dimensions(), Some((5, 1)));
    }
}
