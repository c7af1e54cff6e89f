//! Writing a map back to a bundle.

use codec::{encode_cells, TileCells};
use container::{
    encode_group, encode_image, encode_quad_layer, encode_quads, encode_string,
    encode_tile_layer, Color, EncodeError, GroupRecord, ImageRecord, LayerHeader, LayerKind,
    QuadLayerRecord, RecordTableWriter, SpecialData, TileLayerRecord, GROUP_VERSION,
    IMAGE_VERSION, LAYER_FLAG_DETAIL, NO_REF, QUAD_LAYER_VERSION, TILE_LAYER_VERSION,
};

use crate::error::MapResult;
use crate::layer::{Layer, PhysicsLayer};
use crate::map::{Group, Image, Map};

impl Map {
    /// Encodes the map as a bundle using the newest record layouts.
    pub fn to_bundle(&self) -> MapResult<Vec<u8>> {
        let mut writer = RecordTableWriter::new();
        for image in &self.images {
            write_image(&mut writer, image)?;
        }
        let mut start_layer = 0u32;
        for group in &self.groups {
            let num_layers = count(group.layers.len())?;
            writer.push_group(&encode_group(&group_record(group, start_layer, num_layers)))?;
            for layer in &group.layers {
                write_layer(&mut writer, layer)?;
            }
            start_layer += num_layers;
        }
        let bytes = writer.finish()?;
        log::debug!("encoded map {} ({} bytes)", self.name, bytes.len());
        Ok(bytes)
    }
}

fn count(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::TooManyRecords { count: len })
}

fn reference(index: Option<usize>) -> Result<i32, EncodeError> {
    index.map_or(Ok(NO_REF), |index| {
        i32::try_from(index).map_err(|_| EncodeError::TooManyRecords { count: index })
    })
}

fn group_record(group: &Group, start_layer: u32, num_layers: u32) -> GroupRecord {
    GroupRecord {
        version: GROUP_VERSION,
        offset_x: group.offset_x,
        offset_y: group.offset_y,
        parallax_x: group.parallax_x,
        parallax_y: group.parallax_y,
        start_layer,
        num_layers,
        use_clipping: group.clip.is_some(),
        clip: Some(group.clip.unwrap_or_default()),
        name: Some(group.name.clone()),
    }
}

fn write_image(writer: &mut RecordTableWriter, image: &Image) -> MapResult<()> {
    let name = writer.push_data(&encode_string(&image.name))?;
    let data = match &image.data {
        Some(pixels) => writer.push_data(pixels)?,
        None => NO_REF,
    };
    let record = ImageRecord {
        version: if image.format.is_some() { 2 } else { IMAGE_VERSION },
        width: image.width,
        height: image.height,
        external: image.is_external(),
        name,
        data,
        format: image.format,
    };
    writer.push_image(&encode_image(&record))?;
    Ok(())
}

fn layer_header(kind: LayerKind, detail: bool) -> LayerHeader {
    LayerHeader {
        version: 0,
        type_code: kind.type_code(),
        flags: if detail { LAYER_FLAG_DETAIL } else { 0 },
    }
}

fn write_layer(writer: &mut RecordTableWriter, layer: &Layer) -> MapResult<()> {
    let kind = layer.kind();
    let body = match layer {
        Layer::Quads(quads) => {
            let data = if quads.quads.is_empty() {
                NO_REF
            } else {
                writer.push_data(&encode_quads(&quads.quads))?
            };
            encode_quad_layer(&QuadLayerRecord {
                header: layer_header(kind, quads.detail),
                version: QUAD_LAYER_VERSION,
                num_quads: count(quads.quads.len())?,
                data,
                image: reference(quads.image)?,
                name: Some(quads.name.clone()),
            })
        }
        Layer::Tiles(tiles) => {
            let (width, height) = (tiles.tiles.width(), tiles.tiles.height());
            let cells = TileCells::Tiles(tiles.tiles.cells().to_vec());
            let data = writer.push_data(&encode_cells(&cells))?;
            let mut record = tile_record(kind, width, height, data)?;
            record.header = layer_header(kind, tiles.detail);
            record.color = tiles.color;
            record.color_env = tiles.color_env;
            record.color_env_offset = tiles.color_env_offset;
            record.image = reference(tiles.image)?;
            record.name = Some(tiles.name.clone());
            encode_tile_layer(&record)
        }
        Layer::Game(l) => write_physics(writer, kind, l, TileCells::Game)?,
        Layer::Front(l) => write_physics(writer, kind, l, TileCells::Front)?,
        Layer::Tele(l) => write_physics(writer, kind, l, TileCells::Tele)?,
        Layer::Speedup(l) => write_physics(writer, kind, l, TileCells::Speedup)?,
        Layer::Switch(l) => write_physics(writer, kind, l, TileCells::Switch)?,
        Layer::Tune(l) => write_physics(writer, kind, l, TileCells::Tune)?,
    };
    writer.push_layer(&body)?;
    Ok(())
}

fn write_physics<T: Copy + Default>(
    writer: &mut RecordTableWriter,
    kind: LayerKind,
    layer: &PhysicsLayer<T>,
    wrap: fn(Vec<T>) -> TileCells,
) -> MapResult<Vec<u8>> {
    let (width, height) = (layer.tiles.width(), layer.tiles.height());
    let blob = writer.push_data(&encode_cells(&wrap(layer.tiles.cells().to_vec())))?;

    let mut special = SpecialData::default();
    let data = match kind {
        LayerKind::Tele => {
            special.tele = blob;
            NO_REF
        }
        LayerKind::Speedup => {
            special.speedup = blob;
            NO_REF
        }
        LayerKind::Front => {
            special.front = blob;
            NO_REF
        }
        LayerKind::Switch => {
            special.switch = blob;
            NO_REF
        }
        LayerKind::Tune => {
            special.tune = blob;
            NO_REF
        }
        _ => blob,
    };
    let mut record = tile_record(kind, width, height, data)?;
    record.special = Some(special);
    record.name = Some(physics_title(kind).to_string());
    Ok(encode_tile_layer(&record))
}

fn tile_record(
    kind: LayerKind,
    width: usize,
    height: usize,
    data: i32,
) -> Result<TileLayerRecord, EncodeError> {
    Ok(TileLayerRecord {
        header: layer_header(kind, false),
        version: TILE_LAYER_VERSION,
        width: count(width)?,
        height: count(height)?,
        flags: kind.tilemap_flags().raw(),
        color: Color::WHITE,
        color_env: NO_REF,
        color_env_offset: 0,
        image: NO_REF,
        data,
        name: Some(String::new()),
        special: Some(SpecialData::default()),
    })
}

const fn physics_title(kind: LayerKind) -> &'static str {
    match kind {
        LayerKind::Game => "Game",
        LayerKind::Front => "Front",
        LayerKind::Tele => "Tele",
        LayerKind::Speedup => "Speedup",
        LayerKind::Switch => "Switch",
        LayerKind::Tune => "Tune",
        LayerKind::Tiles | LayerKind::Quads => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{QuadsLayer, TilesLayer};
    use codec::{SpeedupTile, TeleTile, TileValue};
    use container::{decode_table, parse_tile_layer, ClipRect, Limits, Point, Quad};

    fn rich_map() -> Map {
        let mut map = Map::blank("rich", 5, 4);
        let physics = map.physics_group().unwrap();

        let mut tele = Layer::physics(LayerKind::Tele, 5, 4).unwrap();
        tele.replace_cell(1, 2, TileValue::Tele(TeleTile { number: 3, id: 26 }));
        let mut speedup = Layer::physics(LayerKind::Speedup, 5, 4).unwrap();
        speedup.replace_cell(
            4,
            3,
            TileValue::Speedup(SpeedupTile {
                force: 30,
                max_speed: 0,
                id: 28,
                angle: -90,
            }),
        );
        map.groups[physics].layers.push(tele);
        map.groups[physics].layers.push(speedup);

        let mut sky = Group::new("Sky");
        sky.parallax_x = 0;
        sky.parallax_y = 0;
        sky.clip = Some(ClipRect {
            x: 0,
            y: 0,
            w: 64,
            h: 32,
        });
        let mut quads = QuadsLayer::new("Quads");
        quads.quads.push(Quad {
            points: [Point::new(-32, -32); 5],
            ..Quad::default()
        });
        quads.image = Some(0);
        sky.layers.push(Layer::Quads(quads));
        let mut tiles = TilesLayer::new("Deco", 2, 2);
        tiles.detail = true;
        tiles.color = Color::new(10, 20, 30, 40);
        sky.layers.push(Layer::Tiles(tiles));
        map.groups.insert(0, sky);

        map.images.push(Image {
            name: "grass_main".to_string(),
            width: 1024,
            height: 1024,
            data: None,
            format: None,
        });
        map.images.push(Image {
            name: "custom".to_string(),
            width: 1,
            height: 1,
            data: Some(vec![1, 2, 3, 4]),
            format: Some(1),
        });
        map
    }

    #[test]
    fn bundle_roundtrip_reproduces_map() {
        let map = rich_map();
        let bytes = map.to_bundle().unwrap();
        let loaded = Map::from_bundle("rich", &bytes, &Limits::default()).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn special_layers_use_special_slots() {
        let map = rich_map();
        let bytes = map.to_bundle().unwrap();
        let table = decode_table(&bytes, &Limits::default()).unwrap();
        let tele = (0..table.layer_count())
            .filter_map(|i| parse_tile_layer(table.layer(i).unwrap()).ok())
            .find(|record| record.kind().unwrap() == LayerKind::Tele)
            .unwrap();
        assert_eq!(tele.data, NO_REF);
        assert_ne!(tele.special.unwrap().tele, NO_REF);
    }

    #[test]
    fn clip_presence_maps_to_use_clipping() {
        let group = Group::new("plain");
        let record = group_record(&group, 0, 0);
        assert!(!record.use_clipping);
        assert_eq!(record.name.as_deref(), Some("plain"));
    }
}
