//! Assembling a map from a bundle.

use codec::{decode_cells, TileCells, TileGrid, TileKind};
use container::{
    decode_table, parse_group, parse_image, parse_layer_header, parse_quad_layer, parse_quads,
    parse_string, parse_tile_layer, ContainerError, LayerKind, Limits, RecordTable, TileLayerRecord,
    LAYER_TYPE_QUADS, LAYER_TYPE_TILES,
};

use crate::error::{MapError, MapResult};
use crate::layer::{Layer, PhysicsLayer, QuadsLayer, TilesLayer};
use crate::map::{Group, Image, Map};

impl Map {
    /// Decodes a bundle and assembles the map it describes.
    ///
    /// Group layer ranges must be contiguous and cover every layer record,
    /// every tile layer must hold exactly `width * height` cells, and the map
    /// must have exactly one game layer.
    pub fn from_bundle(name: &str, bytes: &[u8], limits: &Limits) -> MapResult<Self> {
        let table = decode_table(bytes, limits)?;
        let images = load_images(&table)?;

        let total = table.layer_count();
        let mut next_layer = 0usize;
        let mut groups = Vec::with_capacity(table.group_count());
        for (index, bytes) in table.groups().enumerate() {
            let record = parse_group(bytes)?;
            let start = record.start_layer as usize;
            let count = record.num_layers as usize;
            let range_error = MapError::LayerRange {
                group: index,
                start: record.start_layer,
                count: record.num_layers,
                expected_start: next_layer,
                available: total,
            };
            if start != next_layer {
                return Err(range_error);
            }
            let slices = table
                .layer_range(start..start + count)
                .ok_or(range_error)?;

            let mut layers = Vec::with_capacity(count);
            for (offset, bytes) in slices.iter().enumerate() {
                layers.push(load_layer(&table, start + offset, bytes, images.len())?);
            }
            next_layer += count;

            groups.push(Group {
                name: record.name.unwrap_or_default(),
                offset_x: record.offset_x,
                offset_y: record.offset_y,
                parallax_x: record.parallax_x,
                parallax_y: record.parallax_y,
                clip: record.clip.filter(|_| record.use_clipping),
                layers,
            });
        }
        if next_layer != total {
            return Err(MapError::OrphanLayers {
                owned: next_layer,
                total,
            });
        }

        let map = Self {
            name: name.to_string(),
            groups,
            images,
        };
        check_game_layer(&map)?;
        log::info!(
            "loaded map {name}: {} groups, {} layers, {} images",
            map.groups.len(),
            map.layer_count(),
            map.images.len()
        );
        Ok(map)
    }
}

fn data<'a>(table: &RecordTable<'a>, reference: i32) -> MapResult<&'a [u8]> {
    table
        .data(reference)
        .ok_or(MapError::MissingData { reference })
}

fn load_images(table: &RecordTable<'_>) -> MapResult<Vec<Image>> {
    let mut images = Vec::with_capacity(table.image_count());
    for bytes in table.images() {
        let record = parse_image(bytes)?;
        let name = parse_string(data(table, record.name)?);
        let pixels = if record.external {
            None
        } else {
            Some(data(table, record.data)?.to_vec())
        };
        images.push(Image {
            name,
            width: record.width,
            height: record.height,
            data: pixels,
            format: record.format,
        });
    }
    Ok(images)
}

fn image_ref(image: i32, count: usize) -> MapResult<Option<usize>> {
    if image < 0 {
        return Ok(None);
    }
    match usize::try_from(image) {
        Ok(index) if index < count => Ok(Some(index)),
        _ => Err(MapError::ImageOutOfRange { image, count }),
    }
}

fn load_layer(
    table: &RecordTable<'_>,
    index: usize,
    bytes: &[u8],
    image_count: usize,
) -> MapResult<Layer> {
    let header = parse_layer_header(bytes)?;
    match header.type_code {
        LAYER_TYPE_TILES => load_tile_layer(table, index, &parse_tile_layer(bytes)?, image_count),
        LAYER_TYPE_QUADS => {
            let record = parse_quad_layer(bytes)?;
            let quads = if record.num_quads == 0 {
                Vec::new()
            } else {
                parse_quads(data(table, record.data)?, record.num_quads as usize)?
            };
            Ok(Layer::Quads(QuadsLayer {
                name: record.name.unwrap_or_default(),
                detail: header.is_detail(),
                image: image_ref(record.image, image_count)?,
                quads,
            }))
        }
        type_code => Err(ContainerError::UnknownLayerType {
            type_code,
            flags: header.flags,
        }
        .into()),
    }
}

fn load_tile_layer(
    table: &RecordTable<'_>,
    index: usize,
    record: &TileLayerRecord,
    image_count: usize,
) -> MapResult<Layer> {
    let kind = record.kind()?;
    let tile_kind = TileKind::try_from(kind)?;
    let cells = decode_cells(tile_kind, data(table, record.data_for(kind))?)?;

    let width = record.width as usize;
    let height = record.height as usize;
    let expected = width * height;
    if cells.len() != expected {
        return Err(MapError::CellCount {
            layer: index,
            expected,
            actual: cells.len(),
        });
    }

    let layer = match cells {
        TileCells::Tiles(cells) => Layer::Tiles(TilesLayer {
            name: record.name.clone().unwrap_or_default(),
            detail: record.header.is_detail(),
            color: record.color,
            color_env: record.color_env,
            color_env_offset: record.color_env_offset,
            image: image_ref(record.image, image_count)?,
            tiles: TileGrid::from_cells(width, height, cells)?,
        }),
        TileCells::Game(cells) => Layer::Game(physics(width, height, cells)?),
        TileCells::Front(cells) => Layer::Front(physics(width, height, cells)?),
        TileCells::Tele(cells) => Layer::Tele(physics(width, height, cells)?),
        TileCells::Speedup(cells) => Layer::Speedup(physics(width, height, cells)?),
        TileCells::Switch(cells) => Layer::Switch(physics(width, height, cells)?),
        TileCells::Tune(cells) => Layer::Tune(physics(width, height, cells)?),
    };
    debug_assert_eq!(layer.kind(), kind);
    Ok(layer)
}

fn physics<T: Copy + Default>(
    width: usize,
    height: usize,
    cells: Vec<T>,
) -> MapResult<PhysicsLayer<T>> {
    Ok(PhysicsLayer {
        tiles: TileGrid::from_cells(width, height, cells)?,
    })
}

fn check_game_layer(map: &Map) -> MapResult<()> {
    let games = map
        .groups
        .iter()
        .flat_map(|group| &group.layers)
        .filter(|layer| layer.kind() == LayerKind::Game)
        .count();
    match games {
        0 => Err(MapError::MissingGameLayer),
        1 => Ok(()),
        _ => Err(MapError::DuplicateGameLayer),
    }
}
