//! Typed container records and their version-gated layouts.
//!
//! Every record is a flat run of little-endian words. Each parser receives the
//! slice that belongs to exactly one record and reads a fixed prefix, then the
//! fields its `version` word unlocks. Trailing slots that an older version does
//! not define are tolerated and ignored.

use cursor::{ByteCursor, ByteWriter};

use crate::error::{ContainerError, ContainerResult};
use crate::kind::{LayerKind, LAYER_TYPE_QUADS, LAYER_TYPE_TILES};
use crate::quad::Color;

/// Number of words used by record name fields.
pub const NAME_WORDS: usize = 3;

/// Newest group record version.
pub const GROUP_VERSION: u32 = 3;

/// Newest tile layer record version.
pub const TILE_LAYER_VERSION: u32 = 3;

/// Newest quad layer record version.
pub const QUAD_LAYER_VERSION: u32 = 2;

/// Image record version written by [`encode_image`].
pub const IMAGE_VERSION: u32 = 1;

/// Sentinel used by reference fields that point nowhere.
pub const NO_REF: i32 = -1;

/// Layer flag marking a detail layer.
pub const LAYER_FLAG_DETAIL: u32 = 1;

/// Clip rectangle of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// A group record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub version: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub parallax_x: i32,
    pub parallax_y: i32,
    /// Index of the first layer record owned by this group.
    pub start_layer: u32,
    /// Number of consecutive layer records owned by this group.
    pub num_layers: u32,
    pub use_clipping: bool,
    /// Present for version 2 and later.
    pub clip: Option<ClipRect>,
    /// Present for version 3 and later.
    pub name: Option<String>,
}

/// The header shared by every layer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerHeader {
    pub version: u32,
    pub type_code: u32,
    pub flags: u32,
}

impl LayerHeader {
    /// Returns `true` if the detail flag is set.
    #[must_use]
    pub const fn is_detail(self) -> bool {
        self.flags & LAYER_FLAG_DETAIL != 0
    }
}

/// References to the packed data of the special physics layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialData {
    pub tele: i32,
    pub speedup: i32,
    pub front: i32,
    pub switch: i32,
    pub tune: i32,
}

impl Default for SpecialData {
    fn default() -> Self {
        Self {
            tele: NO_REF,
            speedup: NO_REF,
            front: NO_REF,
            switch: NO_REF,
            tune: NO_REF,
        }
    }
}

/// A tile layer record (plain tiles and every physics kind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayerRecord {
    pub header: LayerHeader,
    pub version: u32,
    pub width: u32,
    pub height: u32,
    /// Tilemap flags; select the physics kind.
    pub flags: u32,
    pub color: Color,
    pub color_env: i32,
    pub color_env_offset: i32,
    pub image: i32,
    pub data: i32,
    /// Present for version 3 and later.
    pub name: Option<String>,
    /// Present when the record reserves the special data slots.
    pub special: Option<SpecialData>,
}

impl TileLayerRecord {
    /// Returns the layer kind selected by the tilemap flags.
    pub fn kind(&self) -> ContainerResult<LayerKind> {
        LayerKind::from_type_and_flags(self.header.type_code, self.flags)
    }

    /// Returns the data reference holding the packed cells for `kind`.
    #[must_use]
    pub fn data_for(&self, kind: LayerKind) -> i32 {
        let special = self.special.unwrap_or_default();
        match kind {
            LayerKind::Tiles | LayerKind::Game | LayerKind::Quads => self.data,
            LayerKind::Tele => special.tele,
            LayerKind::Speedup => special.speedup,
            LayerKind::Front => special.front,
            LayerKind::Switch => special.switch,
            LayerKind::Tune => special.tune,
        }
    }
}

/// A quad layer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadLayerRecord {
    pub header: LayerHeader,
    pub version: u32,
    pub num_quads: u32,
    pub data: i32,
    pub image: i32,
    /// Present for version 2 and later.
    pub name: Option<String>,
}

/// An image record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    /// References a bundled asset by name instead of embedding pixels.
    pub external: bool,
    /// Data reference of the NUL-terminated image name.
    pub name: i32,
    /// Data reference of the pixel data, [`NO_REF`] for external images.
    pub data: i32,
    /// Pixel format word, present for version 2 and later.
    pub format: Option<i32>,
}

/// Parses a group record.
pub fn parse_group(bytes: &[u8]) -> ContainerResult<GroupRecord> {
    let mut cursor = ByteCursor::new(bytes);
    let version = cursor.read_u32()?;
    let offset_x = cursor.read_i32()?;
    let offset_y = cursor.read_i32()?;
    let parallax_x = cursor.read_i32()?;
    let parallax_y = cursor.read_i32()?;
    let start_layer = read_count(&mut cursor, "start_layer")?;
    let num_layers = read_count(&mut cursor, "num_layers")?;
    let use_clipping = cursor.read_u32()? != 0;
    let clip = gated(&mut cursor, version, 2, read_clip)?;
    let name = gated(&mut cursor, version, 3, read_name)?;

    Ok(GroupRecord {
        version,
        offset_x,
        offset_y,
        parallax_x,
        parallax_y,
        start_layer,
        num_layers,
        use_clipping,
        clip,
        name,
    })
}

/// Encodes a group record. All trailing slots are always written.
#[must_use]
pub fn encode_group(record: &GroupRecord) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(15 * 4);
    writer.write_u32(record.version);
    writer.write_i32(record.offset_x);
    writer.write_i32(record.offset_y);
    writer.write_i32(record.parallax_x);
    writer.write_i32(record.parallax_y);
    writer.write_u32(record.start_layer);
    writer.write_u32(record.num_layers);
    writer.write_u32(u32::from(record.use_clipping));
    let clip = record.clip.unwrap_or_default();
    writer.write_i32(clip.x);
    writer.write_i32(clip.y);
    writer.write_i32(clip.w);
    writer.write_i32(clip.h);
    writer.write_str(record.name.as_deref().unwrap_or_default(), NAME_WORDS);
    writer.finish()
}

/// Parses the header common to every layer record.
pub fn parse_layer_header(bytes: &[u8]) -> ContainerResult<LayerHeader> {
    read_layer_header(&mut ByteCursor::new(bytes))
}

fn read_layer_header(cursor: &mut ByteCursor<'_>) -> ContainerResult<LayerHeader> {
    Ok(LayerHeader {
        version: cursor.read_u32()?,
        type_code: cursor.read_u32()?,
        flags: cursor.read_u32()?,
    })
}

fn write_layer_header(header: LayerHeader, writer: &mut ByteWriter) {
    writer.write_u32(header.version);
    writer.write_u32(header.type_code);
    writer.write_u32(header.flags);
}

/// Parses a tile layer record, including its layer header.
pub fn parse_tile_layer(bytes: &[u8]) -> ContainerResult<TileLayerRecord> {
    let mut cursor = ByteCursor::new(bytes);
    let header = read_layer_header(&mut cursor)?;
    expect_type(header, LAYER_TYPE_TILES)?;
    let version = cursor.read_u32()?;
    let width = read_count(&mut cursor, "width")?;
    let height = read_count(&mut cursor, "height")?;
    let flags = cursor.read_u32()?;
    let color = Color::read(&mut cursor)?;
    let color_env = cursor.read_i32()?;
    let color_env_offset = cursor.read_i32()?;
    let image = cursor.read_i32()?;
    let data = cursor.read_i32()?;
    let name = gated(&mut cursor, version, 3, read_name)?;
    let special = if name.is_some() && cursor.remaining() >= 5 * 4 {
        Some(SpecialData {
            tele: cursor.read_i32()?,
            speedup: cursor.read_i32()?,
            front: cursor.read_i32()?,
            switch: cursor.read_i32()?,
            tune: cursor.read_i32()?,
        })
    } else {
        None
    };

    Ok(TileLayerRecord {
        header,
        version,
        width,
        height,
        flags,
        color,
        color_env,
        color_env_offset,
        image,
        data,
        name,
        special,
    })
}

/// Encodes a tile layer record, including its layer header.
#[must_use]
pub fn encode_tile_layer(record: &TileLayerRecord) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(25 * 4);
    write_layer_header(record.header, &mut writer);
    writer.write_u32(record.version);
    writer.write_u32(record.width);
    writer.write_u32(record.height);
    writer.write_u32(record.flags);
    record.color.write(&mut writer);
    writer.write_i32(record.color_env);
    writer.write_i32(record.color_env_offset);
    writer.write_i32(record.image);
    writer.write_i32(record.data);
    writer.write_str(record.name.as_deref().unwrap_or_default(), NAME_WORDS);
    let special = record.special.unwrap_or_default();
    writer.write_i32(special.tele);
    writer.write_i32(special.speedup);
    writer.write_i32(special.front);
    writer.write_i32(special.switch);
    writer.write_i32(special.tune);
    writer.finish()
}

/// Parses a quad layer record, including its layer header.
pub fn parse_quad_layer(bytes: &[u8]) -> ContainerResult<QuadLayerRecord> {
    let mut cursor = ByteCursor::new(bytes);
    let header = read_layer_header(&mut cursor)?;
    expect_type(header, LAYER_TYPE_QUADS)?;
    let version = cursor.read_u32()?;
    let num_quads = read_count(&mut cursor, "num_quads")?;
    let data = cursor.read_i32()?;
    let image = cursor.read_i32()?;
    let name = gated(&mut cursor, version, 2, read_name)?;

    Ok(QuadLayerRecord {
        header,
        version,
        num_quads,
        data,
        image,
        name,
    })
}

/// Encodes a quad layer record, including its layer header.
#[must_use]
pub fn encode_quad_layer(record: &QuadLayerRecord) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(10 * 4);
    write_layer_header(record.header, &mut writer);
    writer.write_u32(record.version);
    writer.write_u32(record.num_quads);
    writer.write_i32(record.data);
    writer.write_i32(record.image);
    writer.write_str(record.name.as_deref().unwrap_or_default(), NAME_WORDS);
    writer.finish()
}

/// Parses an image record.
pub fn parse_image(bytes: &[u8]) -> ContainerResult<ImageRecord> {
    let mut cursor = ByteCursor::new(bytes);
    let version = cursor.read_u32()?;
    let width = read_count(&mut cursor, "width")?;
    let height = read_count(&mut cursor, "height")?;
    let external = cursor.read_u32()? != 0;
    let name = cursor.read_i32()?;
    let data = cursor.read_i32()?;
    let format = gated(&mut cursor, version, 2, |c| Ok(c.read_i32()?))?;

    Ok(ImageRecord {
        version,
        width,
        height,
        external,
        name,
        data,
        format,
    })
}

/// Encodes an image record. The format slot is always written.
#[must_use]
pub fn encode_image(record: &ImageRecord) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(7 * 4);
    writer.write_u32(record.version);
    writer.write_u32(record.width);
    writer.write_u32(record.height);
    writer.write_u32(u32::from(record.external));
    writer.write_i32(record.name);
    writer.write_i32(record.data);
    writer.write_i32(record.format.unwrap_or(0));
    writer.finish()
}

/// Decodes a NUL-terminated string blob. Bytes after the first NUL are ignored.
#[must_use]
pub fn parse_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}

/// Encodes a string blob with its terminating NUL.
#[must_use]
pub fn encode_string(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 1);
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    out
}

/// Reads a version-gated field.
///
/// When `version` unlocks the field it must be present. Otherwise the slot is
/// still consumed if the slice reserves it, and the value is discarded.
fn gated<'a, T>(
    cursor: &mut ByteCursor<'a>,
    version: u32,
    since: u32,
    read: impl FnOnce(&mut ByteCursor<'a>) -> ContainerResult<T>,
) -> ContainerResult<Option<T>> {
    if version >= since {
        return read(cursor).map(Some);
    }
    let mut ahead = cursor.clone();
    if read(&mut ahead).is_ok() {
        *cursor = ahead;
    }
    Ok(None)
}

fn read_clip(cursor: &mut ByteCursor<'_>) -> ContainerResult<ClipRect> {
    Ok(ClipRect {
        x: cursor.read_i32()?,
        y: cursor.read_i32()?,
        w: cursor.read_i32()?,
        h: cursor.read_i32()?,
    })
}

fn read_name(cursor: &mut ByteCursor<'_>) -> ContainerResult<String> {
    cursor.read_str(NAME_WORDS).map_err(ContainerError::from)
}

fn read_count(cursor: &mut ByteCursor<'_>, field: &'static str) -> ContainerResult<u32> {
    let value = cursor.read_i32()?;
    u32::try_from(value).map_err(|_| ContainerError::NegativeCount { field, value })
}

fn expect_type(header: LayerHeader, expected: u32) -> ContainerResult<()> {
    if header.type_code != expected {
        return Err(ContainerError::LayerTypeMismatch {
            expected,
            found: header.type_code,
        });
    }
    Ok(())
}
