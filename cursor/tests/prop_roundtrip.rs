use cursor::{ByteCursor, ByteWriter, CursorError};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    U32(u32),
    I32(i32),
    Str { text: String, words: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<u32>().prop_map(Op::U32),
        any::<i32>().prop_map(Op::I32),
        ("[a-zA-Z0-9 ]{0,16}", 1usize..=4).prop_map(|(text, words)| Op::Str { text, words }),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = ByteWriter::new();
        for op in &ops {
            match op {
                Op::U8(v) => writer.write_u8(*v),
                Op::U32(v) => writer.write_u32(*v),
                Op::I32(v) => writer.write_i32(*v),
                Op::Str { text, words } => writer.write_str(text, *words),
            }
        }
        let bytes = writer.finish();

        let mut cursor = ByteCursor::new(&bytes);
        for op in &ops {
            match op {
                Op::U8(v) => prop_assert_eq!(cursor.read_u8().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(cursor.read_u32().unwrap(), *v),
                Op::I32(v) => prop_assert_eq!(cursor.read_i32().unwrap(), *v),
                Op::Str { text, words } => {
                    let max = words * 4 - 1;
                    let expected: String = text.chars().take(max).collect();
                    prop_assert_eq!(cursor.read_str(*words).unwrap(), expected);
                }
            }
        }
        prop_assert!(cursor.is_empty());
    }

    #[test]
    fn prop_reads_never_panic(data in prop::collection::vec(any::<u8>(), 0..32), steps in 0usize..16) {
        let mut cursor = ByteCursor::new(&data);
        for step in 0..steps {
            let result = match step % 3 {
                0 => cursor.read_u32().map(|_| ()),
                1 => cursor.read_str(3).map(|_| ()),
                _ => cursor.read_u8().map(|_| ()),
            };
            if let Err(err) = result {
                let is_oob = matches!(err, CursorError::OutOfBounds { .. });
                prop_assert!(is_oob);
            }
        }
    }
}
