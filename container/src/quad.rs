//! Quad records and the small value types shared by several records.

use cursor::{ByteCursor, ByteWriter};

use crate::error::ContainerResult;

/// Size of one packed quad in bytes (38 words).
pub const QUAD_SIZE: usize = 38 * 4;

/// A fixed-point 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An RGBA color with 8 bits per channel.
///
/// Colors are stored as one word per channel; only the low byte is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque white, the neutral tint.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn read(cursor: &mut ByteCursor<'_>) -> ContainerResult<Self> {
        Ok(Self {
            r: channel(cursor.read_u32()?),
            g: channel(cursor.read_u32()?),
            b: channel(cursor.read_u32()?),
            a: channel(cursor.read_u32()?),
        })
    }

    pub(crate) fn write(self, writer: &mut ByteWriter) {
        writer.write_u32(u32::from(self.r));
        writer.write_u32(u32::from(self.g));
        writer.write_u32(u32::from(self.b));
        writer.write_u32(u32::from(self.a));
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn channel(word: u32) -> u8 {
    (word & 0xFF) as u8
}

/// A textured quad with per-corner colors and optional envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quad {
    /// Four corners followed by the pivot.
    pub points: [Point; 5],
    pub colors: [Color; 4],
    pub tex_coords: [Point; 4],
    pub pos_env: i32,
    pub pos_env_offset: i32,
    pub color_env: i32,
    pub color_env_offset: i32,
}

/// Parses `count` quads from a packed quad blob.
pub fn parse_quads(bytes: &[u8], count: usize) -> ContainerResult<Vec<Quad>> {
    let mut cursor = ByteCursor::new(bytes);
    let mut quads = Vec::with_capacity(count.min(bytes.len() / QUAD_SIZE));
    for _ in 0..count {
        quads.push(read_quad(&mut cursor)?);
    }
    Ok(quads)
}

fn read_quad(cursor: &mut ByteCursor<'_>) -> ContainerResult<Quad> {
    let mut quad = Quad::default();
    for point in &mut quad.points {
        *point = Point::new(cursor.read_i32()?, cursor.read_i32()?);
    }
    for color in &mut quad.colors {
        *color = Color::read(cursor)?;
    }
    for coord in &mut quad.tex_coords {
        *coord = Point::new(cursor.read_i32()?, cursor.read_i32()?);
    }
    quad.pos_env = cursor.read_i32()?;
    quad.pos_env_offset = cursor.read_i32()?;
    quad.color_env = cursor.read_i32()?;
    quad.color_env_offset = cursor.read_i32()?;
    Ok(quad)
}

/// Packs quads into a quad blob.
#[must_use]
pub fn encode_quads(quads: &[Quad]) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(quads.len() * QUAD_SIZE);
    for quad in quads {
        for point in &quad.points {
            writer.write_i32(point.x);
            writer.write_i32(point.y);
        }
        for color in quad.colors {
            color.write(&mut writer);
        }
        for coord in &quad.tex_coords {
            writer.write_i32(coord.x);
            writer.write_i32(coord.y);
        }
        writer.write_i32(quad.pos_env);
        writer.write_i32(quad.pos_env_offset);
        writer.write_i32(quad.color_env);
        writer.write_i32(quad.color_env_offset);
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cursor::CursorError;

    use crate::error::ContainerError;

    fn sample_quad() -> Quad {
        Quad {
            points: [
                Point::new(-1024, -1024),
                Point::new(1024, -1024),
                Point::new(-1024, 1024),
                Point::new(1024, 1024),
                Point::new(0, 0),
            ],
            colors: [
                Color::new(255, 0, 0, 255),
                Color::new(0, 255, 0, 255),
                Color::new(0, 0, 255, 255),
                Color::new(255, 255, 255, 128),
            ],
            tex_coords: [
                Point::new(0, 0),
                Point::new(1024, 0),
                Point::new(0, 1024),
                Point::new(1024, 1024),
            ],
            pos_env: -1,
            pos_env_offset: 0,
            color_env: 2,
            color_env_offset: 150,
        }
    }

    #[test]
    fn quad_size_matches_encoding() {
        assert_eq!(encode_quads(&[sample_quad()]).len(), QUAD_SIZE);
    }

    #[test]
    fn quads_roundtrip() {
        let quads = vec![sample_quad(), Quad::default()];
        let bytes = encode_quads(&quads);
        assert_eq!(parse_quads(&bytes, 2).unwrap(), quads);
    }

    #[test]
    fn color_words_are_masked() {
        let mut writer = ByteWriter::new();
        writer.write_u32(0x1FF);
        writer.write_u32(0x100);
        writer.write_u32(0x7F);
        writer.write_u32(0xFFFF_FFFF);
        let bytes = writer.finish();
        let color = Color::read(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(color, Color::new(0xFF, 0, 0x7F, 0xFF));
    }

    #[test]
    fn truncated_quad_blob_fails() {
        let bytes = encode_quads(&[sample_quad()]);
        let err = parse_quads(&bytes[..QUAD_SIZE - 1], 1).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::Cursor(CursorError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn count_larger_than_blob_fails() {
        let bytes = encode_quads(&[sample_quad()]);
        assert!(parse_quads(&bytes, 2).is_err());
    }
}
