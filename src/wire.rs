//! # Protobuf Wire Primitives
//!
//! Low-level encoding helpers for the protobuf-compatible message layer:
//! varints, field keys, length-delimited fields, and unknown-field
//! skipping. Encoders write through a [`BoundedWriter`] capped at each
//! message's compile-time maximum and fail cleanly on exhaustion.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};

/// Protobuf wire types supported by this protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    Len,
    Fixed32,
}

/// Decoded field key: tag number plus wire type
#[derive(Debug, Clone, Copy)]
pub struct FieldHeader {
    pub tag: u32,
    pub wire_type: WireType,
}

/// Decode a base-128 varint, consuming it from the front of `buf`.
pub fn get_varint(buf: &mut &[u8]) -> ProtocolResult<u64> {
    let mut value: u64 = 0;
    for i in 0..10 {
        let Some(&byte) = buf.get(i) else {
            return Err(ProtocolError::Decode("truncated varint".into()));
        };
        let payload = (byte & 0x7f) as u64;
        if i == 9 && payload > 1 {
            return Err(ProtocolError::Decode("varint overflows u64".into()));
        }
        value |= payload << (7 * i);
        if byte & 0x80 == 0 {
            *buf = &buf[i + 1..];
            return Ok(value);
        }
    }
    Err(ProtocolError::Decode("varint longer than 10 bytes".into()))
}

/// Number of bytes `v` occupies as a varint.
pub fn varint_len(v: u64) -> usize {
    if v == 0 {
        return 1;
    }
    (64 - v.leading_zeros() as usize).div_ceil(7)
}

/// Decode a field key and classify its wire type.
pub fn get_field_header(buf: &mut &[u8]) -> ProtocolResult<FieldHeader> {
    let key = get_varint(buf)?;
    let tag = key >> 3;
    if tag == 0 || tag > u32::MAX as u64 {
        return Err(ProtocolError::Decode(format!("invalid field tag: {tag}")));
    }
    let wire_type = match key & 7 {
        0 => WireType::Varint,
        1 => WireType::Fixed64,
        2 => WireType::Len,
        5 => WireType::Fixed32,
        w => {
            return Err(ProtocolError::Decode(format!(
                "unsupported wire type: {w}"
            )))
        }
    };
    Ok(FieldHeader {
        tag: tag as u32,
        wire_type,
    })
}

/// Decode a length-delimited field, returning a view into `buf`.
pub fn get_bytes<'a>(buf: &mut &'a [u8]) -> ProtocolResult<&'a [u8]> {
    let len = get_varint(buf)?;
    if len > buf.len() as u64 {
        return Err(ProtocolError::Decode(
            "truncated length-delimited field".into(),
        ));
    }
    let (head, tail) = buf.split_at(len as usize);
    *buf = tail;
    Ok(head)
}

fn take(buf: &mut &[u8], n: usize) -> ProtocolResult<()> {
    if buf.len() < n {
        return Err(ProtocolError::Decode("truncated fixed-width field".into()));
    }
    *buf = &buf[n..];
    Ok(())
}

/// Skip over a field whose tag the decoder does not recognize.
pub fn skip_field(buf: &mut &[u8], wire_type: WireType) -> ProtocolResult<()> {
    match wire_type {
        WireType::Varint => {
            get_varint(buf)?;
        }
        WireType::Fixed64 => take(buf, 8)?,
        WireType::Len => {
            get_bytes(buf)?;
        }
        WireType::Fixed32 => take(buf, 4)?,
    }
    Ok(())
}

/// Require a specific wire type for a known field tag.
pub fn expect_wire(header: FieldHeader, expected: WireType) -> ProtocolResult<()> {
    if header.wire_type != expected {
        return Err(ProtocolError::Decode(format!(
            "wrong wire type for field {}",
            header.tag
        )));
    }
    Ok(())
}

/// Message encoder bounded by a compile-time maximum size.
pub struct BoundedWriter {
    buf: BytesMut,
    max: usize,
}

impl BoundedWriter {
    /// Create an encoder that refuses to grow past `max` bytes.
    pub fn new(max: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max),
            max,
        }
    }

    fn ensure(&mut self, need: usize) -> ProtocolResult<()> {
        if self.buf.len() + need > self.max {
            return Err(ProtocolError::Encode(format!(
                "encoding exceeds {} bytes",
                self.max
            )));
        }
        Ok(())
    }

    fn put_varint(&mut self, mut v: u64) {
        while v >= 0x80 {
            self.buf.put_u8((v as u8 & 0x7f) | 0x80);
            v >>= 7;
        }
        self.buf.put_u8(v as u8);
    }

    fn put_key(&mut self, tag: u32, wire_type: WireType) {
        let wt = match wire_type {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::Len => 2,
            WireType::Fixed32 => 5,
        };
        self.put_varint(((tag as u64) << 3) | wt);
    }

    /// Write a varint field.
    pub fn put_uint_field(&mut self, tag: u32, v: u64) -> ProtocolResult<()> {
        self.ensure(varint_len((tag as u64) << 3) + varint_len(v))?;
        self.put_key(tag, WireType::Varint);
        self.put_varint(v);
        Ok(())
    }

    /// Write a length-delimited field.
    pub fn put_bytes_field(&mut self, tag: u32, data: &[u8]) -> ProtocolResult<()> {
        let need =
            varint_len(((tag as u64) << 3) | 2) + varint_len(data.len() as u64) + data.len();
        self.ensure(need)?;
        self.put_key(tag, WireType::Len);
        self.put_varint(data.len() as u64);
        self.buf.put_slice(data);
        Ok(())
    }

    /// Finish encoding, truncating storage to the written byte count.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_varint(v: u64) -> Vec<u8> {
        let mut w = BoundedWriter::new(16);
        w.put_varint(v);
        w.finish().to_vec()
    }

    #[test]
    fn test_varint_roundtrip() {
        for v in [0u64, 1, 127, 128, 300, 16383, 16384, u32::MAX as u64, u64::MAX] {
            let encoded = encode_varint(v);
            assert_eq!(encoded.len(), varint_len(v));
            let mut slice = encoded.as_slice();
            assert_eq!(get_varint(&mut slice).unwrap(), v);
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn test_truncated_varint() {
        let mut slice: &[u8] = &[0x80];
        assert!(matches!(
            get_varint(&mut slice),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn test_overlong_varint() {
        let mut slice: &[u8] = &[0xff; 11];
        assert!(matches!(
            get_varint(&mut slice),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn test_skip_unknown_fields() {
        let mut w = BoundedWriter::new(64);
        w.put_uint_field(9, 12345).unwrap();
        w.put_bytes_field(10, b"opaque").unwrap();
        w.put_uint_field(2, 7).unwrap();
        let encoded = w.finish();

        let mut slice = &encoded[..];
        let mut seen = None;
        while !slice.is_empty() {
            let h = get_field_header(&mut slice).unwrap();
            if h.tag == 2 {
                seen = Some(get_varint(&mut slice).unwrap());
            } else {
                skip_field(&mut slice, h.wire_type).unwrap();
            }
        }
        assert_eq!(seen, Some(7));
    }

    #[test]
    fn test_skip_fixed_width_fields() {
        // Hand-encoded fixed64 (tag 1) and fixed32 (tag 2) fields.
        let raw: &[u8] = &[
            0x09, 1, 2, 3, 4, 5, 6, 7, 8, // tag 1, fixed64
            0x15, 9, 9, 9, 9, // tag 2, fixed32
        ];
        let mut slice = raw;
        while !slice.is_empty() {
            let h = get_field_header(&mut slice).unwrap();
            skip_field(&mut slice, h.wire_type).unwrap();
        }
        assert!(slice.is_empty());
    }

    #[test]
    fn test_group_wire_type_rejected() {
        // Key with wire type 3 (start-group).
        let mut slice: &[u8] = &[0x0b];
        assert!(matches!(
            get_field_header(&mut slice),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn test_bounded_writer_exhaustion() {
        let mut w = BoundedWriter::new(8);
        assert!(w.put_bytes_field(1, b"1234").is_ok());
        let result = w.put_bytes_field(2, b"56789");
        assert!(matches!(result, Err(ProtocolError::Encode(_))));
    }

    #[test]
    fn test_length_delimited_truncation() {
        // Claims 5 payload bytes, provides 2.
        let mut slice: &[u8] = &[0x05, 0xaa, 0xbb];
        assert!(matches!(
            get_bytes(&mut slice),
            Err(ProtocolError::Decode(_))
        ));
    }
}
