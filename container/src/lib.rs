//! Record parsing and bundle framing for mapsync map containers.
//!
//! This crate turns raw bundle bytes into typed records: groups, layer
//! headers, tile and quad layers, images and quads. It knows the record
//! layouts and their version gates, but not how records relate to each other;
//! assembling a map out of records is the job of the model crate.
//!
//! # Design Principles
//!
//! - **One slice per record** - Every parser reads exactly the bytes of its record.
//! - **Bounded decoding** - Bundle framing is validated against [`Limits`] before any record is parsed.
//! - **Newest layout on encode** - Every `encode_*` writes all trailing slots.
//!
//! # Example
//!
//! ```
//! use container::{decode_table, encode_string, parse_string, Limits, RecordTableWriter};
//!
//! let mut writer = RecordTableWriter::new();
//! let name = writer.push_data(&encode_string("grass_main")).unwrap();
//! let bundle = writer.finish().unwrap();
//!
//! let table = decode_table(&bundle, &Limits::default()).unwrap();
//! assert_eq!(parse_string(table.data(name).unwrap()), "grass_main");
//! ```

mod error;
mod kind;
mod limits;
mod quad;
mod record;
mod table;

pub use error::{ContainerError, ContainerResult, EncodeError, LimitKind, SectionFramingError};
pub use kind::{LayerKind, TilemapFlags, UnknownLayerKind, LAYER_TYPE_QUADS, LAYER_TYPE_TILES};
pub use limits::Limits;
pub use quad::{encode_quads, parse_quads, Color, Point, Quad, QUAD_SIZE};
pub use record::{
    encode_group, encode_image, encode_quad_layer, encode_string, encode_tile_layer,
    parse_group, parse_image, parse_layer_header, parse_quad_layer, parse_string,
    parse_tile_layer, ClipRect, GroupRecord, ImageRecord, LayerHeader, QuadLayerRecord,
    SpecialData, TileLayerRecord, GROUP_VERSION, IMAGE_VERSION, LAYER_FLAG_DETAIL, NAME_WORDS,
    NO_REF, QUAD_LAYER_VERSION, TILE_LAYER_VERSION,
};
pub use table::{decode_table, RecordTable, RecordTableWriter, SectionTag, HEADER_SIZE, MAGIC, VERSION};
