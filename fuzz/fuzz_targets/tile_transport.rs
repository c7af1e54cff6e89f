#![no_main]

use codec::{decode_cells, decode_transport, encode_cells, encode_transport, TileKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let kind = TileKind::ALL[usize::from(selector) % TileKind::ALL.len()];

    if let Ok(cells) = decode_cells(kind, rest) {
        let encoded = encode_cells(&cells);
        assert_eq!(encoded.len(), rest.len());
        assert_eq!(decode_cells(kind, &encoded).ok(), Some(cells.clone()));
        let text = encode_transport(&cells);
        assert_eq!(decode_transport(kind, &text).ok(), Some(cells));
    }

    if let Ok(text) = std::str::from_utf8(rest) {
        let _ = decode_transport(kind, text);
    }
});
