//! Applies change messages to a map.
//!
//! Every operation validates the whole change before the first mutation, so
//! a rejected change leaves the map untouched. The returned `bool` reports
//! whether the map actually changed; a redundant change is `Ok(false)`.

use codec::TileKind;
use container::LayerKind;
use model::{Group, Layer, Map, QuadsLayer, TilesLayer};

use crate::envelope::Event;
use crate::error::{ApplyError, ApplyResult};
use crate::limits::EditLimits;
use crate::message::{CreateGroup, CreateLayer, GroupChange, LayerChange, LayerOrder, TileChange};

/// Applies changes under a set of [`EditLimits`].
#[derive(Debug, Clone, Default)]
pub struct ApplyEngine {
    limits: EditLimits,
}

impl ApplyEngine {
    #[must_use]
    pub const fn new(limits: EditLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &EditLimits {
        &self.limits
    }

    /// Applies an edit event. Non-edit events are [`ApplyError::NotAnEdit`].
    pub fn apply(&self, map: &mut Map, event: &Event) -> ApplyResult<bool> {
        match event {
            Event::TileChange(change) => self.tile_change(map, change),
            Event::GroupChange(change) => self.group_change(map, change),
            Event::LayerChange(change) => self.layer_change(map, change),
            Event::CreateGroup(create) => self.create_group(map, create),
            Event::CreateLayer(create) => self.create_layer(map, create),
            other => Err(ApplyError::NotAnEdit { name: other.name() }),
        }
    }

    /// Writes one cell. Writing the value already present is a no-op.
    pub fn tile_change(&self, map: &mut Map, change: &TileChange) -> ApplyResult<bool> {
        let value = change.value()?;
        let layer = layer_mut(map, change.group, change.layer)?;
        if layer.tile_kind() != Some(change.kind) {
            return Err(ApplyError::KindMismatch {
                layer: layer.kind(),
                found: change.kind,
            });
        }

        let (x, y) = (change.x as usize, change.y as usize);
        let current = layer.cell(x, y).ok_or_else(|| {
            let (width, height) = layer.dimensions().unwrap_or_default();
            ApplyError::CellOutOfRange {
                x: change.x,
                y: change.y,
                width,
                height,
            }
        })?;
        if current == value {
            return Ok(false);
        }
        layer.replace_cell(x, y, value);
        log::debug!(
            "tile ({}, {}) in layer {}/{} set to {value:?}",
            change.x,
            change.y,
            change.group,
            change.layer
        );
        Ok(true)
    }

    /// Edits group attributes, deletes a group, or moves it.
    pub fn group_change(&self, map: &mut Map, change: &GroupChange) -> ApplyResult<bool> {
        let index = group_index(map, change.group)?;
        let count = map.groups.len();
        let physics = map.groups[index].is_physics_group();

        if change.delete {
            if physics {
                return Err(ApplyError::DeletePhysicsGroup);
            }
            map.groups.remove(index);
            log::debug!("group {index} deleted");
            return Ok(true);
        }

        if let Some(name) = &change.name {
            self.check_name(name)?;
            if physics && *name != map.groups[index].name {
                return Err(ApplyError::RenamePhysicsGroup);
            }
        }
        if let Some(order) = change.order {
            if order as usize >= count {
                return Err(ApplyError::OrderOutOfRange { order, count });
            }
        }

        let group = &mut map.groups[index];
        let mut changed = false;
        changed |= assign_opt(&mut group.offset_x, change.off_x);
        changed |= assign_opt(&mut group.offset_y, change.off_y);
        changed |= assign_opt(&mut group.parallax_x, change.para_x);
        changed |= assign_opt(&mut group.parallax_y, change.para_y);
        changed |= assign_opt(&mut group.name, change.name.clone());

        if let Some(order) = change.order {
            let target = order as usize;
            if target != index {
                let group = map.groups.remove(index);
                map.groups.insert(target, group);
                changed = true;
            }
        }

        if changed {
            log::debug!("group {index} changed: {change:?}");
        }
        Ok(changed)
    }

    /// Edits layer attributes, deletes a layer, or moves it.
    pub fn layer_change(&self, map: &mut Map, change: &LayerChange) -> ApplyResult<bool> {
        let g = group_index(map, change.group)?;
        let l = layer_index(&map.groups[g], change.group, change.layer)?;
        let kind = map.groups[g].layers[l].kind();

        if change.delete {
            if kind == LayerKind::Game {
                return Err(ApplyError::DeleteGameLayer);
            }
            map.groups[g].layers.remove(l);
            log::debug!("layer {g}/{l} deleted");
            return Ok(true);
        }

        self.check_layer_change(map, g, l, change)?;

        let mut changed = false;
        let group = &mut map.groups[g];
        if let Some(name) = &change.name {
            if let Some(slot) = group.layers[l].name_mut() {
                changed |= assign(slot, name.clone());
            }
        }
        if let (Some(color), Layer::Tiles(layer)) = (change.color, &mut group.layers[l]) {
            changed |= assign(&mut layer.color, color);
        }
        if change.width.is_some() || change.height.is_some() {
            changed |= resize(group, l, change.width, change.height);
        }

        match change.order {
            Some(LayerOrder::Group(target)) => {
                let target = target as usize;
                if target != g || l + 1 != map.groups[g].layers.len() {
                    let layer = map.groups[g].layers.remove(l);
                    map.groups[target].layers.push(layer);
                    changed = true;
                }
            }
            Some(LayerOrder::Layer(target)) => {
                let target = target as usize;
                if target != l {
                    let layer = map.groups[g].layers.remove(l);
                    map.groups[g].layers.insert(target, layer);
                    changed = true;
                }
            }
            None => {}
        }

        if changed {
            log::debug!("layer {g}/{l} changed: {change:?}");
        }
        Ok(changed)
    }

    fn check_layer_change(
        &self,
        map: &Map,
        g: usize,
        l: usize,
        change: &LayerChange,
    ) -> ApplyResult<()> {
        let layer = &map.groups[g].layers[l];
        let kind = layer.kind();

        if let Some(name) = &change.name {
            if kind.is_physics() {
                return Err(ApplyError::RenamePhysicsLayer { kind });
            }
            self.check_name(name)?;
        }
        if change.color.is_some() && kind != LayerKind::Tiles {
            return Err(ApplyError::ColorUnsupported { kind });
        }
        for value in [change.width, change.height].into_iter().flatten() {
            if layer.dimensions().is_none() {
                return Err(ApplyError::ResizeUnsupported { kind });
            }
            if value == 0 || value > self.limits.max_layer_dimension {
                return Err(ApplyError::InvalidDimension {
                    value,
                    max: self.limits.max_layer_dimension,
                });
            }
        }
        if let Some((width, height)) = layer.dimensions() {
            let width = change.width.map_or(width, |w| w as usize);
            let height = change.height.map_or(height, |h| h as usize);
            if kind.is_physics() {
                for other in &map.groups[g].layers {
                    if other.kind().is_physics() {
                        self.check_layer_size(other.kind(), width, height)?;
                    }
                }
            } else {
                self.check_layer_size(kind, width, height)?;
            }
        }
        match change.order {
            Some(LayerOrder::Group(target)) => {
                let count = map.groups.len();
                let Some(group) = map.groups.get(target as usize) else {
                    return Err(ApplyError::OrderOutOfRange {
                        order: target,
                        count,
                    });
                };
                if target as usize != g {
                    if kind.is_physics() {
                        return Err(ApplyError::MovePhysicsLayer { kind });
                    }
                    if group.layers.len() >= self.limits.max_layers_per_group {
                        return Err(ApplyError::TooManyLayers {
                            max: self.limits.max_layers_per_group,
                        });
                    }
                }
            }
            Some(LayerOrder::Layer(target)) => {
                let count = map.groups[g].layers.len();
                if target as usize >= count {
                    return Err(ApplyError::OrderOutOfRange {
                        order: target,
                        count,
                    });
                }
            }
            None => {}
        }
        Ok(())
    }

    /// Appends a group.
    pub fn create_group(&self, map: &mut Map, create: &CreateGroup) -> ApplyResult<bool> {
        if map.groups.len() >= self.limits.max_groups {
            return Err(ApplyError::TooManyGroups {
                max: self.limits.max_groups,
            });
        }
        let name = create.name.clone().unwrap_or_default();
        self.check_name(&name)?;
        map.groups.push(Group::new(name));
        log::debug!("group {} created", map.groups.len() - 1);
        Ok(true)
    }

    /// Appends a layer to a group.
    ///
    /// Tiles layers take the game layer's dimensions. Physics layers other
    /// than the game layer may be added to the physics group once each.
    pub fn create_layer(&self, map: &mut Map, create: &CreateLayer) -> ApplyResult<bool> {
        let g = group_index(map, create.group)?;
        let group = &map.groups[g];
        if group.layers.len() >= self.limits.max_layers_per_group {
            return Err(ApplyError::TooManyLayers {
                max: self.limits.max_layers_per_group,
            });
        }
        if map.layer_count() >= self.limits.max_layers {
            return Err(ApplyError::TooManyMapLayers {
                max: self.limits.max_layers,
            });
        }
        if let Some(name) = &create.name {
            if create.kind.is_physics() {
                return Err(ApplyError::RenamePhysicsLayer { kind: create.kind });
            }
            self.check_name(name)?;
        }
        let name = create.name.clone().unwrap_or_default();
        let (width, height) = map.game_dimensions().unwrap_or((1, 1));
        self.check_layer_size(create.kind, width, height)?;

        let layer = match create.kind {
            LayerKind::Tiles => Layer::Tiles(TilesLayer::new(name, width, height)),
            LayerKind::Quads => Layer::Quads(QuadsLayer::new(name)),
            kind => {
                let present = group.layers.iter().any(|layer| layer.kind() == kind);
                if kind == LayerKind::Game || present || !group.is_physics_group() {
                    return Err(ApplyError::CreateUnsupported { kind });
                }
                Layer::physics(kind, width, height)
                    .ok_or(ApplyError::CreateUnsupported { kind })?
            }
        };
        map.groups[g].layers.push(layer);
        log::debug!("{} layer created in group {g}", create.kind);
        Ok(true)
    }

    /// Checks the packed size of a tile-bearing layer. Quads layers always pass.
    fn check_layer_size(&self, kind: LayerKind, width: usize, height: usize) -> ApplyResult<()> {
        let Ok(tile_kind) = TileKind::try_from(kind) else {
            return Ok(());
        };
        match self.limits.layer_bytes(width, height, tile_kind.cell_size()) {
            Some(_) => Ok(()),
            None => Err(ApplyError::LayerTooLarge {
                kind,
                width,
                height,
                max: self.limits.max_layer_bytes,
            }),
        }
    }

    fn check_name(&self, name: &str) -> ApplyResult<()> {
        if name.len() > self.limits.max_name_len {
            return Err(ApplyError::NameTooLong {
                len: name.len(),
                max: self.limits.max_name_len,
            });
        }
        Ok(())
    }
}

/// Applies a tile change under default limits.
pub fn apply_tile_change(map: &mut Map, change: &TileChange) -> ApplyResult<bool> {
    ApplyEngine::default().tile_change(map, change)
}

/// Applies a group change under default limits.
pub fn apply_group_change(map: &mut Map, change: &GroupChange) -> ApplyResult<bool> {
    ApplyEngine::default().group_change(map, change)
}

/// Applies a layer change under default limits.
pub fn apply_layer_change(map: &mut Map, change: &LayerChange) -> ApplyResult<bool> {
    ApplyEngine::default().layer_change(map, change)
}

pub fn apply_create_group(map: &mut Map, create: &CreateGroup) -> ApplyResult<bool> {
    ApplyEngine::default().create_group(map, create)
}

pub fn apply_create_layer(map: &mut Map, create: &CreateLayer) -> ApplyResult<bool> {
    ApplyEngine::default().create_layer(map, create)
}

/// Applies any edit event under default limits.
pub fn apply_event(map: &mut Map, event: &Event) -> ApplyResult<bool> {
    ApplyEngine::default().apply(map, event)
}

fn group_index(map: &Map, group: u32) -> ApplyResult<usize> {
    let index = group as usize;
    if index < map.groups.len() {
        Ok(index)
    } else {
        Err(ApplyError::GroupOutOfRange {
            group,
            count: map.groups.len(),
        })
    }
}

fn layer_index(group: &Group, g: u32, layer: u32) -> ApplyResult<usize> {
    let index = layer as usize;
    if index < group.layers.len() {
        Ok(index)
    } else {
        Err(ApplyError::LayerOutOfRange {
            group: g,
            layer,
            count: group.layers.len(),
        })
    }
}

fn layer_mut(map: &mut Map, group: u32, layer: u32) -> ApplyResult<&mut Layer> {
    let g = group_index(map, group)?;
    let l = layer_index(&map.groups[g], group, layer)?;
    Ok(&mut map.groups[g].layers[l])
}

fn assign<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn assign_opt<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    value.is_some_and(|value| assign(slot, value))
}

/// Resizes layer `l` of `group`. Physics layers are resized together.
fn resize(group: &mut Group, l: usize, width: Option<u32>, height: Option<u32>) -> bool {
    let Some((old_width, old_height)) = group.layers[l].dimensions() else {
        return false;
    };
    let width = width.map_or(old_width, |w| w as usize);
    let height = height.map_or(old_height, |h| h as usize);
    if (width, height) == (old_width, old_height) {
        return false;
    }
    if group.layers[l].kind().is_physics() {
        for layer in &mut group.layers {
            if layer.kind().is_physics() {
                layer.resize(width, height);
            }
        }
    } else {
        group.layers[l].resize(width, height);
    }
    true
}
