//! Bundle framing: the outer table that routes record slices to the parsers.
//!
//! A bundle is a 12 byte header followed by sections. Each section is a tag
//! byte, a varint body length and the body. Records of one kind are numbered
//! in order of appearance, and data blobs are numbered the same way.

use std::ops::Range;

use crate::error::{
    ContainerError, ContainerResult, EncodeError, LimitKind, SectionFramingError,
};
use crate::limits::Limits;

/// Magic number identifying mapsync bundles.
pub const MAGIC: u32 = 0x5457_4D42; // "TWMB" in ASCII

/// Current bundle format version.
pub const VERSION: u16 = 1;

/// Header size in bytes: magic(4) + version(2) + flags(2) + payload_len(4).
pub const HEADER_SIZE: usize = 4 + 2 + 2 + 4;

/// Section tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
#[repr(u8)]
pub enum SectionTag {
    Group = 1,
    Layer = 2,
    Image = 3,
    Data = 4,
}

impl SectionTag {
    /// Parses a section tag from a raw byte.
    pub fn parse(tag: u8) -> ContainerResult<Self> {
        match tag {
            1 => Ok(Self::Group),
            2 => Ok(Self::Layer),
            3 => Ok(Self::Image),
            4 => Ok(Self::Data),
            _ => Err(ContainerError::UnknownSectionTag { tag }),
        }
    }
}

/// Record and data slices of a decoded bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable<'a> {
    groups: Vec<&'a [u8]>,
    layers: Vec<&'a [u8]>,
    images: Vec<&'a [u8]>,
    data: Vec<&'a [u8]>,
}

impl<'a> RecordTable<'a> {
    /// Returns the slice of group record `index`.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&'a [u8]> {
        self.groups.get(index).copied()
    }

    /// Returns the slice of layer record `index`.
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&'a [u8]> {
        self.layers.get(index).copied()
    }

    /// Returns the slice of image record `index`.
    #[must_use]
    pub fn image(&self, index: usize) -> Option<&'a [u8]> {
        self.images.get(index).copied()
    }

    /// Returns data blob `index`. Negative references resolve to `None`.
    #[must_use]
    pub fn data(&self, index: i32) -> Option<&'a [u8]> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.data.get(index).copied())
    }

    /// Iterates over group record slices in order.
    pub fn groups(&self) -> impl ExactSizeIterator<Item = &'a [u8]> + '_ {
        self.groups.iter().copied()
    }

    /// Iterates over image record slices in order.
    pub fn images(&self) -> impl ExactSizeIterator<Item = &'a [u8]> + '_ {
        self.images.iter().copied()
    }

    /// Returns the layer record slices in `range`, or `None` if it is out of bounds.
    #[must_use]
    pub fn layer_range(&self, range: Range<usize>) -> Option<&[&'a [u8]]> {
        self.layers.get(range)
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn data_count(&self) -> usize {
        self.data.len()
    }

    fn bucket_mut(&mut self, tag: SectionTag) -> &mut Vec<&'a [u8]> {
        match tag {
            SectionTag::Group => &mut self.groups,
            SectionTag::Layer => &mut self.layers,
            SectionTag::Image => &mut self.images,
            SectionTag::Data => &mut self.data,
        }
    }
}

/// Decodes a bundle into record slices.
pub fn decode_table<'a>(buf: &'a [u8], limits: &Limits) -> ContainerResult<RecordTable<'a>> {
    if buf.len() < HEADER_SIZE {
        return Err(ContainerError::BundleTooSmall {
            actual: buf.len(),
            required: HEADER_SIZE,
        });
    }
    if buf.len() > limits.max_bundle_bytes {
        return Err(ContainerError::LimitsExceeded {
            kind: LimitKind::BundleBytes,
            limit: limits.max_bundle_bytes,
            actual: buf.len(),
        });
    }

    let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if magic != MAGIC {
        return Err(ContainerError::InvalidMagic { found: magic });
    }

    let version = u16::from_le_bytes([buf[4], buf[5]]);
    if version != VERSION {
        return Err(ContainerError::UnsupportedVersion { found: version });
    }

    let flags = u16::from_le_bytes([buf[6], buf[7]]);
    if flags != 0 {
        return Err(ContainerError::InvalidFlags { flags });
    }

    let payload_len = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    let actual_payload_len = buf.len() - HEADER_SIZE;
    if payload_len as usize != actual_payload_len {
        return Err(ContainerError::PayloadLengthMismatch {
            header_len: payload_len,
            actual_len: actual_payload_len,
        });
    }

    decode_sections(&buf[HEADER_SIZE..], limits)
}

fn decode_sections<'a>(payload: &'a [u8], limits: &Limits) -> ContainerResult<RecordTable<'a>> {
    let mut table = RecordTable::default();
    let mut offset = 0usize;

    while offset < payload.len() {
        let tag = SectionTag::parse(payload[offset])?;
        offset += 1;
        let (len, new_offset) = read_varu32(payload, offset)?;
        offset = new_offset;
        let len = len as usize;

        let (kind, max_len) = match tag {
            SectionTag::Data => (LimitKind::DataLength, limits.max_data_len),
            _ => (LimitKind::RecordLength, limits.max_record_len),
        };
        if len > max_len {
            return Err(ContainerError::LimitsExceeded {
                kind,
                limit: max_len,
                actual: len,
            });
        }
        if offset + len > payload.len() {
            return Err(ContainerError::SectionFraming(
                SectionFramingError::Truncated {
                    needed: offset + len,
                    available: payload.len(),
                },
            ));
        }

        let bucket = table.bucket_mut(tag);
        if bucket.len() >= limits.max_records {
            return Err(ContainerError::LimitsExceeded {
                kind: LimitKind::RecordCount,
                limit: limits.max_records,
                actual: bucket.len() + 1,
            });
        }
        bucket.push(&payload[offset..offset + len]);
        offset += len;
    }

    Ok(table)
}

/// Builds a bundle section by section.
#[derive(Debug, Default)]
pub struct RecordTableWriter {
    payload: Vec<u8>,
    groups: usize,
    layers: usize,
    images: usize,
    data: usize,
}

impl RecordTableWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group record and returns its index.
    pub fn push_group(&mut self, body: &[u8]) -> Result<usize, EncodeError> {
        self.push(SectionTag::Group, body)
    }

    /// Appends a layer record and returns its index.
    pub fn push_layer(&mut self, body: &[u8]) -> Result<usize, EncodeError> {
        self.push(SectionTag::Layer, body)
    }

    /// Appends an image record and returns its index.
    pub fn push_image(&mut self, body: &[u8]) -> Result<usize, EncodeError> {
        self.push(SectionTag::Image, body)
    }

    /// Appends a data blob and returns the reference to store in records.
    pub fn push_data(&mut self, body: &[u8]) -> Result<i32, EncodeError> {
        let index = self.push(SectionTag::Data, body)?;
        i32::try_from(index).map_err(|_| EncodeError::TooManyRecords { count: index + 1 })
    }

    fn push(&mut self, tag: SectionTag, body: &[u8]) -> Result<usize, EncodeError> {
        let len = u32::try_from(body.len())
            .map_err(|_| EncodeError::LengthOverflow { length: body.len() })?;
        self.payload.push(tag as u8);
        write_varu32(len, &mut self.payload);
        self.payload.extend_from_slice(body);

        let counter = match tag {
            SectionTag::Group => &mut self.groups,
            SectionTag::Layer => &mut self.layers,
            SectionTag::Image => &mut self.images,
            SectionTag::Data => &mut self.data,
        };
        let index = *counter;
        *counter += 1;
        Ok(index)
    }

    /// Finishes the bundle and returns its bytes.
    pub fn finish(self) -> Result<Vec<u8>, EncodeError> {
        let payload_len = u32::try_from(self.payload.len()).map_err(|_| {
            EncodeError::LengthOverflow {
                length: self.payload.len(),
            }
        })?;
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&payload_len.to_le_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }
}

fn read_varu32(buf: &[u8], mut offset: usize) -> ContainerResult<(u32, usize)> {
    let mut value = 0u32;
    let mut shift = 0u32;
    for _ in 0..5 {
        if offset >= buf.len() {
            return Err(ContainerError::SectionFraming(
                SectionFramingError::Truncated {
                    needed: offset + 1,
                    available: buf.len(),
                },
            ));
        }
        let byte = buf[offset];
        offset += 1;
        value |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, offset));
        }
        shift += 7;
    }
    Err(ContainerError::SectionFraming(
        SectionFramingError::InvalidVarint,
    ))
}

#[allow(clippy::cast_possible_truncation)]
fn write_varu32(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_bundle() -> Vec<u8> {
        RecordTableWriter::new().finish().unwrap()
    }

    #[test]
    fn empty_bundle_roundtrip() {
        let buf = empty_bundle();
        assert_eq!(buf.len(), HEADER_SIZE);
        let table = decode_table(&buf, &Limits::for_testing()).unwrap();
        assert_eq!(table.group_count(), 0);
        assert_eq!(table.data_count(), 0);
    }

    #[test]
    fn magic_is_twmb_ascii() {
        assert_eq!(&MAGIC.to_be_bytes(), b"TWMB");
    }

    #[test]
    fn records_are_numbered_per_kind() {
        let mut writer = RecordTableWriter::new();
        assert_eq!(writer.push_data(b"first").unwrap(), 0);
        assert_eq!(writer.push_group(&[1, 2, 3, 4]).unwrap(), 0);
        assert_eq!(writer.push_layer(&[5]).unwrap(), 0);
        assert_eq!(writer.push_data(b"second").unwrap(), 1);
        assert_eq!(writer.push_group(&[9]).unwrap(), 1);
        let buf = writer.finish().unwrap();

        let table = decode_table(&buf, &Limits::for_testing()).unwrap();
        assert_eq!(table.group(0), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(table.group(1), Some(&[9u8][..]));
        assert_eq!(table.layer(0), Some(&[5u8][..]));
        assert_eq!(table.data(1), Some(&b"second"[..]));
        assert_eq!(table.data(-1), None);
        assert_eq!(table.image(0), None);
        assert_eq!(table.groups().len(), 2);
        assert_eq!(table.layer_range(0..1), Some(&[&[5u8][..]][..]));
        assert_eq!(table.layer_range(0..2), None);
    }

    #[test]
    fn decode_rejects_invalid_magic() {
        let mut buf = empty_bundle();
        buf[0..4].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        let err = decode_table(&buf, &Limits::for_testing()).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidMagic { .. }));
    }

    #[test]
    fn decode_rejects_unsupported_version() {
        let mut buf = empty_bundle();
        buf[4..6].copy_from_slice(&7u16.to_le_bytes());
        let err = decode_table(&buf, &Limits::for_testing()).unwrap_err();
        assert!(matches!(err, ContainerError::UnsupportedVersion { found: 7 }));
    }

    #[test]
    fn decode_rejects_reserved_flags() {
        let mut buf = empty_bundle();
        buf[6..8].copy_from_slice(&1u16.to_le_bytes());
        let err = decode_table(&buf, &Limits::for_testing()).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidFlags { flags: 1 }));
    }

    #[test]
    fn decode_payload_length_mismatch() {
        let mut buf = empty_bundle();
        buf.push(0);
        let err = decode_table(&buf, &Limits::for_testing()).unwrap_err();
        assert!(matches!(err, ContainerError::PayloadLengthMismatch { .. }));
    }

    #[test]
    fn decode_too_small() {
        let err = decode_table(&[0u8; 4], &Limits::for_testing()).unwrap_err();
        assert!(matches!(err, ContainerError::BundleTooSmall { .. }));
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        let mut buf = empty_bundle();
        buf.extend_from_slice(&[9, 0]);
        buf[8..12].copy_from_slice(&2u32.to_le_bytes());
        let err = decode_table(&buf, &Limits::for_testing()).unwrap_err();
        assert!(matches!(err, ContainerError::UnknownSectionTag { tag: 9 }));
    }

    #[test]
    fn decode_rejects_invalid_varint_len() {
        let mut buf = empty_bundle();
        buf.extend_from_slice(&[SectionTag::Data as u8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        buf[8..12].copy_from_slice(&6u32.to_le_bytes());
        let err = decode_table(&buf, &Limits::unlimited()).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::SectionFraming(SectionFramingError::InvalidVarint)
        ));
    }

    #[test]
    fn decode_rejects_truncated_body() {
        let mut buf = empty_bundle();
        buf.extend_from_slice(&[SectionTag::Group as u8, 4, 1, 2]);
        buf[8..12].copy_from_slice(&4u32.to_le_bytes());
        let err = decode_table(&buf, &Limits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::SectionFraming(SectionFramingError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_enforces_record_length_limit() {
        let mut writer = RecordTableWriter::new();
        writer.push_layer(&[0u8; 300]).unwrap();
        let buf = writer.finish().unwrap();
        let err = decode_table(&buf, &Limits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::LimitsExceeded {
                kind: LimitKind::RecordLength,
                ..
            }
        ));
    }

    #[test]
    fn decode_enforces_record_count_limit() {
        let mut writer = RecordTableWriter::new();
        writer.push_data(&[]).unwrap();
        writer.push_data(&[]).unwrap();
        let buf = writer.finish().unwrap();
        let limits = Limits {
            max_records: 1,
            ..Limits::for_testing()
        };
        let err = decode_table(&buf, &limits).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::LimitsExceeded {
                kind: LimitKind::RecordCount,
                ..
            }
        ));
    }

    #[test]
    fn long_data_uses_multibyte_length() {
        let blob = vec![7u8; 300];
        let mut writer = RecordTableWriter::new();
        writer.push_data(&blob).unwrap();
        let buf = writer.finish().unwrap();
        // tag + 2 varint bytes + body
        assert_eq!(buf.len(), HEADER_SIZE + 1 + 2 + 300);
        let table = decode_table(&buf, &Limits::for_testing()).unwrap();
        assert_eq!(table.data(0), Some(&blob[..]));
    }
}
