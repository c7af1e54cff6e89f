#![no_main]

use libfuzzer_sys::fuzz_target;
use model::Map;
use protocol::{apply_event, decode_client_message, decode_server_message, ClientMessage};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = decode_server_message(text);

    if let Ok(ClientMessage::Event(event)) = decode_client_message(text) {
        let mut map = Map::blank_with_defaults("fuzz", 16, 16);
        let before = map.clone();
        if apply_event(&mut map, &event).is_err() {
            assert_eq!(map, before);
        }
    }
});
