//! Fixed-width packed cell layouts.
//!
//! | Kind                 | Bytes | Layout                                     |
//! |----------------------|-------|--------------------------------------------|
//! | tiles / game / front | 4     | id, flags, reserved, reserved              |
//! | tele                 | 2     | number, id                                 |
//! | speedup              | 6     | force, max_speed, id, reserved, angle (le) |
//! | switch               | 4     | number, id, flags, delay                   |
//! | tune                 | 2     | number, id                                 |
//!
//! Reserved bytes are written as zero and ignored on decode.

use crate::error::{CodecResult, TransportError};
use crate::tile::{SpeedupTile, SwitchTile, TeleTile, Tile, TileCells, TileKind, TuneTile};

/// Returns the number of cells in a packed buffer of `len` bytes.
pub fn cell_count(kind: TileKind, len: usize) -> CodecResult<usize> {
    let cell_size = kind.cell_size();
    if len % cell_size != 0 {
        return Err(TransportError::Length { len, cell_size }.into());
    }
    Ok(len / cell_size)
}

/// Decodes packed cells of `kind` in buffer order.
pub fn decode_cells(kind: TileKind, bytes: &[u8]) -> CodecResult<TileCells> {
    cell_count(kind, bytes.len())?;
    let chunks = bytes.chunks_exact(kind.cell_size());
    let cells = match kind {
        TileKind::Tiles => TileCells::Tiles(chunks.map(tile).collect()),
        TileKind::Game => TileCells::Game(chunks.map(tile).collect()),
        TileKind::Front => TileCells::Front(chunks.map(tile).collect()),
        TileKind::Tele => TileCells::Tele(
            chunks
                .map(|c| TeleTile {
                    number: c[0],
                    id: c[1],
                })
                .collect(),
        ),
        TileKind::Speedup => TileCells::Speedup(
            chunks
                .map(|c| SpeedupTile {
                    force: c[0],
                    max_speed: c[1],
                    id: c[2],
                    angle: i16::from_le_bytes([c[4], c[5]]),
                })
                .collect(),
        ),
        TileKind::Switch => TileCells::Switch(
            chunks
                .map(|c| SwitchTile {
                    number: c[0],
                    id: c[1],
                    flags: c[2],
                    delay: c[3],
                })
                .collect(),
        ),
        TileKind::Tune => TileCells::Tune(
            chunks
                .map(|c| TuneTile {
                    number: c[0],
                    id: c[1],
                })
                .collect(),
        ),
    };
    Ok(cells)
}

fn tile(chunk: &[u8]) -> Tile {
    Tile {
        id: chunk[0],
        flags: chunk[1],
    }
}

/// Packs cells into their fixed-width layout.
#[must_use]
pub fn encode_cells(cells: &TileCells) -> Vec<u8> {
    let mut out = Vec::with_capacity(cells.len() * cells.kind().cell_size());
    match cells {
        TileCells::Tiles(v) | TileCells::Game(v) | TileCells::Front(v) => {
            for t in v {
                out.extend_from_slice(&[t.id, t.flags, 0, 0]);
            }
        }
        TileCells::Tele(v) => {
            for t in v {
                out.extend_from_slice(&[t.number, t.id]);
            }
        }
        TileCells::Speedup(v) => {
            for t in v {
                let [lo, hi] = t.angle.to_le_bytes();
                out.extend_from_slice(&[t.force, t.max_speed, t.id, 0, lo, hi]);
            }
        }
        TileCells::Switch(v) => {
            for t in v {
                out.extend_from_slice(&[t.number, t.id, t.flags, t.delay]);
            }
        }
        TileCells::Tune(v) => {
            for t in v {
                out.extend_from_slice(&[t.number, t.id]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn tiles_layout() {
        let cells = TileCells::Game(vec![Tile { id: 1, flags: 8 }, Tile { id: 2, flags: 0 }]);
        assert_eq!(encode_cells(&cells), vec![1, 8, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn speedup_angle_is_little_endian() {
        let cells = TileCells::Speedup(vec![SpeedupTile {
            force: 20,
            max_speed: 5,
            id: 28,
            angle: 270,
        }]);
        let bytes = encode_cells(&cells);
        assert_eq!(bytes, vec![20, 5, 28, 0, 0x0E, 0x01]);
        assert_eq!(decode_cells(TileKind::Speedup, &bytes).unwrap(), cells);
    }

    #[test]
    fn negative_speedup_angle() {
        let bytes = [1, 2, 3, 0, 0xFF, 0xFF];
        let cells = decode_cells(TileKind::Speedup, &bytes).unwrap();
        let TileCells::Speedup(v) = cells else {
            panic!("expected speedup cells");
        };
        assert_eq!(v[0].angle, -1);
    }

    #[test]
    fn reserved_bytes_are_ignored() {
        let cells = decode_cells(TileKind::Tiles, &[5, 1, 0xAA, 0xBB]).unwrap();
        assert_eq!(cells, TileCells::Tiles(vec![Tile { id: 5, flags: 1 }]));
        assert_eq!(encode_cells(&cells), vec![5, 1, 0, 0]);
    }

    #[test]
    fn switch_layout() {
        let bytes = [4, 22, 1, 9];
        let cells = decode_cells(TileKind::Switch, &bytes).unwrap();
        assert_eq!(
            cells,
            TileCells::Switch(vec![SwitchTile {
                number: 4,
                id: 22,
                flags: 1,
                delay: 9,
            }])
        );
        assert_eq!(encode_cells(&cells), bytes);
    }

    #[test]
    fn length_not_multiple_of_cell_size() {
        let err = decode_cells(TileKind::Speedup, &[0; 7]).unwrap_err();
        assert_eq!(
            err,
            CodecError::Transport(TransportError::Length {
                len: 7,
                cell_size: 6
            })
        );
        assert!(decode_cells(TileKind::Tele, &[0; 3]).is_err());
    }

    #[test]
    fn empty_buffer_decodes_to_no_cells() {
        for kind in TileKind::ALL {
            let cells = decode_cells(kind, &[]).unwrap();
            assert!(cells.is_empty());
            assert_eq!(cells.kind(), kind);
        }
    }

    #[test]
    fn cell_count_divides() {
        assert_eq!(cell_count(TileKind::Tune, 8).unwrap(), 4);
        assert!(cell_count(TileKind::Game, 6).is_err());
    }
}
