use container::{
    decode_table, encode_group, encode_image, encode_quad_layer, encode_quads, encode_string,
    encode_tile_layer, parse_group, parse_image, parse_layer_header, parse_quad_layer,
    parse_quads, parse_string, parse_tile_layer, ClipRect, Color, ContainerError, GroupRecord,
    ImageRecord, LayerHeader, LayerKind, Limits, Point, Quad, QuadLayerRecord,
    RecordTableWriter, SpecialData, TileLayerRecord, GROUP_VERSION, NO_REF, QUAD_LAYER_VERSION,
    TILE_LAYER_VERSION,
};
use proptest::prelude::*;

fn game_layer(data: i32) -> TileLayerRecord {
    TileLayerRecord {
        header: LayerHeader {
            version: 0,
            type_code: LayerKind::Game.type_code(),
            flags: 0,
        },
        version: TILE_LAYER_VERSION,
        width: 2,
        height: 2,
        flags: LayerKind::Game.tilemap_flags().raw(),
        color: Color::WHITE,
        color_env: NO_REF,
        color_env_offset: 0,
        image: NO_REF,
        data,
        name: Some("Game".to_string()),
        special: Some(SpecialData::default()),
    }
}

#[test]
fn bundle_routes_records_to_parsers() {
    let quad = Quad {
        points: [Point::new(0, 0); 5],
        ..Quad::default()
    };

    let mut writer = RecordTableWriter::new();
    let tiles = writer.push_data(&[0u8; 16]).unwrap();
    let quads = writer.push_data(&encode_quads(&[quad.clone()])).unwrap();
    let image_name = writer.push_data(&encode_string("grass_main")).unwrap();

    let physics = GroupRecord {
        version: GROUP_VERSION,
        offset_x: 0,
        offset_y: 0,
        parallax_x: 100,
        parallax_y: 100,
        start_layer: 0,
        num_layers: 2,
        use_clipping: false,
        clip: Some(ClipRect::default()),
        name: Some("Game".to_string()),
    };
    writer.push_group(&encode_group(&physics)).unwrap();
    writer.push_layer(&encode_tile_layer(&game_layer(tiles))).unwrap();

    let quad_layer = QuadLayerRecord {
        header: LayerHeader {
            version: 0,
            type_code: LayerKind::Quads.type_code(),
            flags: 0,
        },
        version: QUAD_LAYER_VERSION,
        num_quads: 1,
        data: quads,
        image: 0,
        name: Some("Quads".to_string()),
    };
    writer.push_layer(&encode_quad_layer(&quad_layer)).unwrap();

    let image = ImageRecord {
        version: 1,
        width: 256,
        height: 256,
        external: true,
        name: image_name,
        data: NO_REF,
        format: None,
    };
    writer.push_image(&encode_image(&image)).unwrap();
    let bundle = writer.finish().unwrap();

    let table = decode_table(&bundle, &Limits::for_testing()).unwrap();
    assert_eq!(table.group_count(), 1);
    assert_eq!(table.layer_count(), 2);
    assert_eq!(table.image_count(), 1);
    assert_eq!(table.data_count(), 3);

    assert_eq!(parse_group(table.group(0).unwrap()).unwrap(), physics);

    let first = table.layer(0).unwrap();
    let header = parse_layer_header(first).unwrap();
    assert_eq!(
        LayerKind::from_type_and_flags(header.type_code, parse_tile_layer(first).unwrap().flags)
            .unwrap(),
        LayerKind::Game
    );
    let game = parse_tile_layer(first).unwrap();
    assert_eq!(table.data(game.data).unwrap().len(), 16);

    let second = parse_quad_layer(table.layer(1).unwrap()).unwrap();
    assert_eq!(second, quad_layer);
    let parsed = parse_quads(table.data(second.data).unwrap(), second.num_quads as usize).unwrap();
    assert_eq!(parsed, vec![quad]);

    let parsed_image = parse_image(table.image(0).unwrap()).unwrap();
    assert_eq!(parsed_image.format, None);
    assert_eq!(
        parse_string(table.data(parsed_image.name).unwrap()),
        "grass_main"
    );
}

#[test]
fn quad_record_routed_to_tile_parser_is_rejected() {
    let record = QuadLayerRecord {
        header: LayerHeader {
            version: 0,
            type_code: LayerKind::Quads.type_code(),
            flags: 0,
        },
        version: QUAD_LAYER_VERSION,
        num_quads: 0,
        data: NO_REF,
        image: NO_REF,
        name: None,
    };
    let err = parse_tile_layer(&encode_quad_layer(&record)).unwrap_err();
    assert!(matches!(err, ContainerError::LayerTypeMismatch { .. }));
}

proptest! {
    #[test]
    fn prop_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_table(&data, &Limits::for_testing());
        let _ = parse_group(&data);
        let _ = parse_tile_layer(&data);
        let _ = parse_quad_layer(&data);
        let _ = parse_image(&data);
    }

    #[test]
    fn prop_blobs_survive_framing(blobs in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 0..8)) {
        let mut writer = RecordTableWriter::new();
        for blob in &blobs {
            writer.push_data(blob).unwrap();
        }
        let bundle = writer.finish().unwrap();
        let table = decode_table(&bundle, &Limits::for_testing()).unwrap();
        prop_assert_eq!(table.data_count(), blobs.len());
        for (index, blob) in blobs.iter().enumerate() {
            prop_assert_eq!(table.data(index as i32).unwrap(), &blob[..]);
        }
    }
}
