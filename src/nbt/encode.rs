// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! NBT serialization.

use crate::nbt::mutf8::encode_mutf8;
use crate::tag::{Compound, Kind, List, Tag};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{Result, Write};

/// Writes a length-prefixed Modified UTF-8 string.
fn write_nbt_string<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    let bytes = encode_mutf8(s);
    writer.write_u16::<BigEndian>(bytes.len() as u16)?;
    writer.write_all(&bytes)
}

fn write_list<W: Write>(writer: &mut W, list: &List) -> Result<()> {
    writer.write_u8(list.element_kind().as_u8())?;
    writer.write_i32::<BigEndian>(list.len() as i32)?;
    for element in list.iter() {
        write_tag_payload(writer, element)?;
    }
    Ok(())
}

fn write_compound<W: Write>(writer: &mut W, compound: &Compound) -> Result<()> {
    for (name, tag) in compound.iter() {
        writer.write_u8(tag.kind().as_u8())?;
        write_nbt_string(writer, name)?;
        write_tag_payload(writer, tag)?;
    }
    writer.write_u8(Kind::End.as_u8())
}

/// Writes the payload of `tag` (no type ID or name — see [`write_named_tag`]).
pub fn write_tag_payload<W: Write>(writer: &mut W, tag: &Tag) -> Result<()> {
    match tag {
        Tag::Byte(v) => writer.write_i8(*v),
        Tag::Short(v) => writer.write_i16::<BigEndian>(*v),
        Tag::Int(v) => writer.write_i32::<BigEndian>(*v),
        Tag::Long(v) => writer.write_i64::<BigEndian>(*v),
        Tag::Float(v) => writer.write_f32::<BigEndian>(*v),
        Tag::Double(v) => writer.write_f64::<BigEndian>(*v),
        Tag::ByteArray(v) => {
            writer.write_i32::<BigEndian>(v.len() as i32)?;
            writer.write_all(v)
        }
        Tag::String(v) => write_nbt_string(writer, v),
        Tag::List(v) => write_list(writer, v),
        Tag::Compound(v) => write_compound(writer, v),
    }
}

/// Writes a named tag (type ID + name + payload) — the standard shape of a
/// root NBT tag on disk.
pub fn write_named_tag<W: Write>(writer: &mut W, name: &str, tag: &Tag) -> Result<()> {
    writer.write_u8(tag.kind().as_u8())?;
    write_nbt_string(writer, name)?;
    write_tag_payload(writer, tag)
}

/// Writes a named `Compound` tag directly, without requiring the caller to
/// wrap it in a [`Tag::Compound`] first (document roots are a bare
/// `Compound`, and this avoids cloning one into a `Tag` just to serialize
/// it).
pub fn write_named_compound<W: Write>(
    writer: &mut W,
    name: &str,
    compound: &Compound,
) -> Result<()> {
    writer.write_u8(Kind::Compound.as_u8())?;
    write_nbt_string(writer, name)?;
    write_compound(writer, compound)
}
