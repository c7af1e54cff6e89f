//! Bounded byte cursor primitives for mapsync containers.
//!
//! This crate provides [`ByteCursor`] and [`ByteWriter`] for reading and
//! writing the little-endian, word-oriented records of a map container.
//! It is designed for bounded, panic-free operation with explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about groups, layers, or tiles.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use cursor::{ByteCursor, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_u32(3);
//! writer.write_i32(-32);
//! writer.write_str("Game", 3);
//!
//! let bytes = writer.finish();
//!
//! let mut cursor = ByteCursor::new(&bytes);
//! assert_eq!(cursor.read_u32().unwrap(), 3);
//! assert_eq!(cursor.read_i32().unwrap(), -32);
//! assert_eq!(cursor.read_str(3).unwrap(), "Game");
//! ```

mod error;
mod reader;
mod writer;

pub use error::{CursorError, CursorResult};
pub use reader::ByteCursor;
pub use writer::ByteWriter;

/// Size in bytes of one container word.
pub const WORD: usize = 4;
