//! The map root, its groups and images.

use container::ClipRect;

use crate::layer::Layer;

/// An editable map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Map {
    /// Display name; also the registry key.
    pub name: String,
    pub groups: Vec<Group>,
    pub images: Vec<Image>,
}

/// An ordered set of layers sharing offset and parallax.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub name: String,
    pub offset_x: i32,
    pub offset_y: i32,
    pub parallax_x: i32,
    pub parallax_y: i32,
    /// Clipping rectangle; `None` disables clipping.
    pub clip: Option<ClipRect>,
    pub layers: Vec<Layer>,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            name: String::new(),
            offset_x: 0,
            offset_y: 0,
            parallax_x: 100,
            parallax_y: 100,
            clip: None,
            layers: Vec::new(),
        }
    }
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if this group holds the game layer.
    #[must_use]
    pub fn is_physics_group(&self) -> bool {
        self.layers.iter().any(|layer| matches!(layer, Layer::Game(_)))
    }
}

/// An image used as a layer texture.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Embedded pixel data; `None` for external images.
    pub data: Option<Vec<u8>>,
    pub format: Option<i32>,
}

impl Image {
    #[must_use]
    pub const fn is_external(&self) -> bool {
        self.data.is_none()
    }
}

impl Map {
    /// Returns the index of the physics group.
    #[must_use]
    pub fn physics_group(&self) -> Option<usize> {
        self.groups.iter().position(Group::is_physics_group)
    }

    /// Returns the `(group, layer)` position of the game layer.
    #[must_use]
    pub fn game_layer_position(&self) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(g, group)| {
            group
                .layers
                .iter()
                .position(|layer| matches!(layer, Layer::Game(_)))
                .map(|l| (g, l))
        })
    }

    /// Returns the game layer dimensions.
    #[must_use]
    pub fn game_dimensions(&self) -> Option<(usize, usize)> {
        let (g, l) = self.game_layer_position()?;
        self.groups[g].layers[l].dimensions()
    }

    #[must_use]
    pub fn layer(&self, group: usize, layer: usize) -> Option<&Layer> {
        self.groups.get(group)?.layers.get(layer)
    }

    pub fn layer_mut(&mut self, group: usize, layer: usize) -> Option<&mut Layer> {
        self.groups.get_mut(group)?.layers.get_mut(layer)
    }

    /// Total number of layers across all groups.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.groups.iter().map(|group| group.layers.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::TilesLayer;
    use container::LayerKind;

    fn sample() -> Map {
        let mut background = Group::new("Background");
        background
            .layers
            .push(Layer::Tiles(TilesLayer::new("Tiles", 4, 4)));
        let mut game = Group::new("Game");
        game.layers
            .push(Layer::Tiles(TilesLayer::new("Doodads", 4, 4)));
        game.layers
            .push(Layer::physics(LayerKind::Game, 4, 3).unwrap());
        Map {
            name: "sample".to_string(),
            groups: vec![background, game],
            images: Vec::new(),
        }
    }

    #[test]
    fn locates_game_layer() {
        let map = sample();
        assert_eq!(map.physics_group(), Some(1));
        assert_eq!(map.game_layer_position(), Some((1, 1)));
        assert_eq!(map.game_dimensions(), Some((4, 3)));
        assert_eq!(map.layer_count(), 3);
    }

    #[test]
    fn layer_addressing() {
        let map = sample();
        assert_eq!(map.layer(0, 0).map(Layer::kind), Some(LayerKind::Tiles));
        assert!(map.layer(0, 1).is_none());
        assert!(map.layer(2, 0).is_none());
    }

    #[test]
    fn group_defaults() {
        let group = Group::default();
        assert_eq!(group.parallax_x, 100);
        assert_eq!(group.parallax_y, 100);
        assert!(group.clip.is_none());
        assert!(!group.is_physics_group());
    }
}
