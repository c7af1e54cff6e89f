//! Freshly created maps.

use container::{Color, Point, Quad, NO_REF};

use crate::layer::{Layer, PhysicsLayer, QuadsLayer, TilesLayer};
use crate::map::{Group, Map};

// Fixed-point scale of quad coordinates (22.10).
const FIXED_ONE: i32 = 1 << 10;

impl Map {
    /// Creates a map holding only the physics group and a `width` x `height` game layer.
    #[must_use]
    pub fn blank(name: impl Into<String>, width: usize, height: usize) -> Self {
        let mut game = Group::new("Game");
        game.layers
            .push(Layer::Game(PhysicsLayer::new(width, height)));
        Self {
            name: name.into(),
            groups: vec![game],
            images: Vec::new(),
        }
    }

    /// Creates a blank map plus a background quads group and a tiles layer
    /// sized like the game layer.
    #[must_use]
    pub fn blank_with_defaults(name: impl Into<String>, width: usize, height: usize) -> Self {
        let mut map = Self::blank(name, width, height);
        map.groups[0]
            .layers
            .insert(0, Layer::Tiles(TilesLayer::new("Tiles", width, height)));

        let mut background = Group::new("Background");
        background.parallax_x = 0;
        background.parallax_y = 0;
        let mut sky = QuadsLayer::new("Sky");
        sky.quads.push(sky_quad());
        background.layers.push(Layer::Quads(sky));
        map.groups.insert(0, background);
        map
    }
}

fn sky_quad() -> Quad {
    let (w, h) = (800 * FIXED_ONE, 600 * FIXED_ONE);
    let top = Color::new(94, 132, 174, 255);
    let bottom = Color::new(204, 232, 255, 255);
    Quad {
        points: [
            Point::new(-w, -h),
            Point::new(w, -h),
            Point::new(-w, h),
            Point::new(w, h),
            Point::new(0, 0),
        ],
        colors: [top, top, bottom, bottom],
        tex_coords: [
            Point::new(0, 0),
            Point::new(FIXED_ONE, 0),
            Point::new(0, FIXED_ONE),
            Point::new(FIXED_ONE, FIXED_ONE),
        ],
        pos_env: NO_REF,
        pos_env_offset: 0,
        color_env: NO_REF,
        color_env_offset: 0,
    }
}
