//! Configurable limits for structural edits.

use container::Limits;

/// Limits enforced by the apply engine and the lobby.
///
/// The defaults fit inside [`Limits::default`], so every map they allow can
/// be saved and loaded again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditLimits {
    /// Maximum width or height of a tile-bearing layer.
    pub max_layer_dimension: u32,

    /// Maximum packed size of one tile-bearing layer in bytes.
    pub max_layer_bytes: usize,

    /// Maximum group or layer name length in bytes.
    ///
    /// Names are stored in three words with a terminating NUL.
    pub max_name_len: usize,

    /// Maximum number of groups in a map.
    pub max_groups: usize,

    /// Maximum number of layers in a group.
    pub max_layers_per_group: usize,

    /// Maximum number of layers in a map.
    pub max_layers: usize,
}

impl Default for EditLimits {
    fn default() -> Self {
        Self {
            max_layer_dimension: 10_000,
            max_layer_bytes: 64 * 1024 * 1024,
            max_name_len: 11,
            max_groups: 256,
            max_layers_per_group: 256,
            max_layers: 4096,
        }
    }
}

impl EditLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_layer_dimension: 64,
            max_layer_bytes: 16 * 1024,
            max_name_len: 11,
            max_groups: 8,
            max_layers_per_group: 8,
            max_layers: 32,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_layer_dimension: u32::MAX,
            max_layer_bytes: usize::MAX,
            max_name_len: usize::MAX,
            max_groups: usize::MAX,
            max_layers_per_group: usize::MAX,
            max_layers: usize::MAX,
        }
    }

    /// Tightens these limits so that edited maps still decode under `bundle`.
    #[must_use]
    pub fn fitting(mut self, bundle: &Limits) -> Self {
        self.max_layer_bytes = self.max_layer_bytes.min(bundle.max_data_len);
        self.max_groups = self.max_groups.min(bundle.max_records);
        self.max_layers = self.max_layers.min(bundle.max_records);
        self
    }

    /// Returns the packed size of a `width` x `height` layer of `cell_size`
    /// bytes per cell, or `None` if it exceeds [`Self::max_layer_bytes`].
    #[must_use]
    pub fn layer_bytes(&self, width: usize, height: usize, cell_size: usize) -> Option<usize> {
        width
            .checked_mul(height)?
            .checked_mul(cell_size)
            .filter(|&bytes| bytes <= self.max_layer_bytes)
    }
}
