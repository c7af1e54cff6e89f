#![no_main]

use container::{decode_table, parse_group, parse_image, parse_layer_header, Limits};
use libfuzzer_sys::fuzz_target;
use model::Map;

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();

    if let Ok(table) = decode_table(data, &limits) {
        for group in table.groups() {
            let _ = parse_group(group);
        }
        for index in 0..table.layer_count() {
            if let Some(layer) = table.layer(index) {
                let _ = parse_layer_header(layer);
            }
        }
        for image in table.images() {
            let _ = parse_image(image);
        }
    }

    // A map that loads must save and load again.
    if let Ok(map) = Map::from_bundle("fuzz", data, &limits) {
        let bytes = map.to_bundle().expect("loaded map must encode");
        let again = Map::from_bundle("fuzz", &bytes, &Limits::unlimited())
            .expect("encoded map must load");
        assert_eq!(again.layer_count(), map.layer_count());
        assert_eq!(again.game_dimensions(), map.game_dimensions());
    }
});
