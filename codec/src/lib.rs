//! Per-kind tile layouts and base64 tile transport for mapsync.
//!
//! Each tile-bearing layer kind packs its cells in a fixed-width layout. This
//! crate converts between those packed buffers and typed cells, and carries
//! packed buffers inside text messages as standard base64.
//!
//! # Example
//!
//! ```
//! use codec::{decode_transport, encode_transport, TeleTile, TileCells, TileKind};
//!
//! let cells = TileCells::Tele(vec![TeleTile { number: 3, id: 7 }]);
//! let text = encode_transport(&cells);
//! assert_eq!(text, "Awc=");
//! assert_eq!(decode_transport(TileKind::Tele, &text).unwrap(), cells);
//! ```
//!
//! # Design Principles
//!
//! - **Closed kinds** - Every kind has exactly one layout; there is no fallback.
//! - **Exact inverse** - `encode_cells` reverses `decode_cells` up to reserved bytes.

mod error;
mod grid;
mod layout;
mod tile;
mod transport;

pub use error::{CodecError, CodecResult, TransportError};
pub use grid::TileGrid;
pub use layout::{cell_count, decode_cells, encode_cells};
pub use tile::{
    SpeedupTile, SwitchTile, TeleTile, Tile, TileCells, TileKind, TileValue, TuneTile,
};
pub use transport::{decode_transport, decode_value, encode_transport, encode_value};
