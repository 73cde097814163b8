// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Streaming NBT parser.

use crate::error::Error;
use crate::nbt::mutf8::decode_mutf8;
use crate::tag::{Compound, Kind, List, Tag};

/// A cursor over a byte slice, advanced as tags are decoded off it.
struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, Error> {
        if self.data.is_empty() {
            return Err(Error::Truncated("expected a tag-kind or length byte"));
        }
        let b = self.data[0];
        self.data = &self.data[1..];
        Ok(b)
    }

    #[inline]
    fn read_i8(&mut self) -> Result<i8, Error> {
        self.read_u8().map(|b| b as i8)
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, Error> {
        if self.data.len() < 2 {
            return Err(Error::Truncated("expected a 16-bit field"));
        }
        let bytes = [self.data[0], self.data[1]];
        self.data = &self.data[2..];
        Ok(u16::from_be_bytes(bytes))
    }

    #[inline]
    fn read_i16(&mut self) -> Result<i16, Error> {
        self.read_u16().map(|v| v as i16)
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32, Error> {
        if self.data.len() < 4 {
            return Err(Error::Truncated("expected a 32-bit field"));
        }
        let bytes: [u8; 4] = self.data[..4].try_into().unwrap();
        self.data = &self.data[4..];
        Ok(i32::from_be_bytes(bytes))
    }

    #[inline]
    fn read_i64(&mut self) -> Result<i64, Error> {
        if self.data.len() < 8 {
            return Err(Error::Truncated("expected a 64-bit field"));
        }
        let bytes: [u8; 8] = self.data[..8].try_into().unwrap();
        self.data = &self.data[8..];
        Ok(i64::from_be_bytes(bytes))
    }

    #[inline]
    fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_i32().map(|v| f32::from_bits(v as u32))
    }

    #[inline]
    fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_i64().map(|v| f64::from_bits(v as u64))
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.data.len() < len {
            return Err(Error::Truncated("expected more payload bytes"));
        }
        let bytes = &self.data[..len];
        self.data = &self.data[len..];
        Ok(bytes)
    }

    fn read_kind(&mut self) -> Result<Kind, Error> {
        let id = self.read_u8()?;
        Kind::from_u8(id).ok_or(Error::UnknownKind(id))
    }
}

/// Parses a length-prefixed Modified UTF-8 string.
fn parse_nbt_string(reader: &mut ByteReader) -> Result<String, Error> {
    let len = reader.read_u16()? as usize;
    let bytes = reader.read_bytes(len)?;
    decode_mutf8(bytes).map_err(|e| Error::Malformed(e.to_string()))
}

/// Parses the payload of a tag of the given `kind` (no type ID or name —
/// those are handled by [`parse_named_tag`]).
fn parse_tag_payload(reader: &mut ByteReader, kind: Kind) -> Result<Tag, Error> {
    Ok(match kind {
        Kind::End => return Err(Error::Malformed("End has no payload".into())),
        Kind::Byte => Tag::Byte(reader.read_i8()?),
        Kind::Short => Tag::Short(reader.read_i16()?),
        Kind::Int => Tag::Int(reader.read_i32()?),
        Kind::Long => Tag::Long(reader.read_i64()?),
        Kind::Float => Tag::Float(reader.read_f32()?),
        Kind::Double => Tag::Double(reader.read_f64()?),
        Kind::ByteArray => {
            let len = reader.read_i32()?;
            if len < 0 {
                return Err(Error::Malformed(format!("negative ByteArray length {len}")));
            }
            Tag::ByteArray(reader.read_bytes(len as usize)?.to_vec())
        }
        Kind::String => Tag::String(parse_nbt_string(reader)?),
        Kind::List => {
            let element_id = reader.read_u8()?;
            let element_kind =
                Kind::from_u8(element_id).ok_or(Error::UnknownKind(element_id))?;
            let len = reader.read_i32()?;
            if len < 0 {
                return Err(Error::Malformed(format!("negative List length {len}")));
            }
            let mut list = List::new();
            if element_kind != Kind::End {
                list.set_element_kind(element_kind);
            }
            for _ in 0..len {
                list.insert(list.len(), parse_tag_payload(reader, element_kind)?);
            }
            Tag::List(list)
        }
        Kind::Compound => {
            let mut compound = Compound::new();
            loop {
                let entry_kind = reader.read_kind()?;
                if entry_kind == Kind::End {
                    break;
                }
                let name = parse_nbt_string(reader)?;
                let payload = parse_tag_payload(reader, entry_kind)?;
                compound.set(name, payload);
            }
            Tag::Compound(compound)
        }
    })
}

/// Parses a named tag (type ID + name + payload) off the front of `input`,
/// advancing `input` past what was consumed.
///
/// This is the entry point for a top-level document: the returned name is
/// the document's root name, and the returned tag must be a `Compound`.
pub fn parse_named_tag(input: &mut &[u8]) -> Result<(String, Tag), Error> {
    let mut reader = ByteReader::new(input);
    let kind = reader.read_kind()?;
    if kind == Kind::End {
        return Err(Error::Malformed("expected a named tag, found End".into()));
    }
    let name = parse_nbt_string(&mut reader)?;
    let payload = parse_tag_payload(&mut reader, kind)?;
    *input = reader.data;
    Ok((name, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_payload() {
        let data = vec![0, 3, b'h', b'i', b'!'];
        let mut reader = ByteReader::new(&data);
        assert_eq!(parse_nbt_string(&mut reader).unwrap(), "hi!");
        assert!(reader.data.is_empty());
    }

    #[test]
    fn parses_byte_payload() {
        let data = vec![42];
        let mut reader = ByteReader::new(&data);
        let tag = parse_tag_payload(&mut reader, Kind::Byte).unwrap();
        assert_eq!(tag, Tag::Byte(42));
    }

    #[test]
    fn empty_list_keeps_declared_element_kind() {
        // element kind = Byte (1), length = 0
        let data = vec![1, 0, 0, 0, 0];
        let mut reader = ByteReader::new(&data);
        let tag = parse_tag_payload(&mut reader, Kind::List).unwrap();
        let Tag::List(list) = tag else { panic!("expected a list") };
        assert_eq!(list.len(), 0);
        assert_eq!(list.element_kind(), Kind::Byte);
    }

    #[test]
    fn negative_length_is_malformed() {
        let data = vec![0xff, 0xff, 0xff, 0xff]; // -1 as i32
        let mut reader = ByteReader::new(&data);
        assert!(matches!(
            parse_tag_payload(&mut reader, Kind::ByteArray),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut input: &[u8] = &[200, 0, 0];
        assert!(matches!(
            parse_named_tag(&mut input),
            Err(Error::UnknownKind(200))
        ));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let mut input: &[u8] = &[Kind::Int.as_u8(), 0, 1, b'x'];
        assert!(matches!(parse_named_tag(&mut input), Err(Error::Truncated(_))));
    }
}
