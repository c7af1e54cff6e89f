//! Base64 transport of packed cells inside text messages.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{CodecError, CodecResult, TransportError};
use crate::layout::{decode_cells, encode_cells};
use crate::tile::{TileCells, TileKind, TileValue};

/// Packs cells and encodes them as standard base64.
#[must_use]
pub fn encode_transport(cells: &TileCells) -> String {
    STANDARD.encode(encode_cells(cells))
}

/// Decodes base64 text into cells of `kind`.
pub fn decode_transport(kind: TileKind, data: &str) -> CodecResult<TileCells> {
    let bytes = STANDARD.decode(data)?;
    decode_cells(kind, &bytes)
}

/// Encodes a single cell.
#[must_use]
pub fn encode_value(value: TileValue) -> String {
    encode_transport(&TileCells::from(value))
}

/// Decodes base64 text that must hold exactly one cell of `kind`.
pub fn decode_value(kind: TileKind, data: &str) -> CodecResult<TileValue> {
    let cells = decode_transport(kind, data)?;
    match (cells.len(), cells.get(0)) {
        (1, Some(value)) => Ok(value),
        (actual, _) => Err(CodecError::Transport(TransportError::CellCount {
            expected: 1,
            actual,
        })),
    }
}
