#![no_main]

use cursor::ByteCursor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cursor = ByteCursor::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        idx += 1;

        match op {
            0 => {
                let _ = cursor.read_u8();
            }
            1 => {
                let _ = cursor.read_u32();
            }
            2 => {
                let _ = cursor.read_i32();
            }
            3 => {
                let words = usize::from(data[idx.saturating_sub(1)] % 8);
                let _ = cursor.read_str(words);
            }
            4 => {
                let len = usize::from(data[idx.saturating_sub(1)] % 64);
                let _ = cursor.read_bytes(len);
            }
            5 => {
                let len = usize::from(data[idx.saturating_sub(1)] % 16);
                let _ = cursor.skip(len);
            }
            _ => cursor.reset(),
        }
        assert!(cursor.position() <= data.len());
    }
});
