// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Serde support for NBT.
//!
//! Converts between Rust types and [`Tag`]. Requires the `serde` feature.
//! NBT has no native null/unit payload (`Kind::End` is a stream-only
//! sentinel, never a value a caller can hold — see [`crate::tag`]'s module
//! docs), so `()`/`None` round-trip through `Tag::Byte(0)`; a legitimate
//! `Some(0i8)` field is therefore indistinguishable from `None` through
//! this bridge, the same ambiguity every NBT-to-serde shim in this
//! ecosystem accepts in exchange for not inventing a wire-incompatible
//! sentinel kind.

#![cfg_attr(docsrs, doc(cfg(feature = "serde")))]

use crate::tag::{Compound, List, Tag};
use serde::{Deserialize, Serialize, de, ser};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during NBT serde operations.
#[derive(Debug, Error)]
pub enum SerdeError {
    /// A custom error from a `Serialize` or `Deserialize` implementation.
    #[error("{0}")]
    Custom(String),
    /// A required field was missing during deserialization.
    #[error("missing field: {0}")]
    MissingField(String),
}

impl ser::Error for SerdeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}

impl de::Error for SerdeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}

/// Converts a [`Serialize`] value into a [`Tag`].
pub fn to_nbt<T: Serialize>(value: &T) -> Result<Tag, SerdeError> {
    value.serialize(NbtSerializer)
}

/// Converts a [`Tag`] into a [`Deserialize`] value.
pub fn from_nbt<'a, T: Deserialize<'a>>(tag: Tag) -> Result<T, SerdeError> {
    T::deserialize(NbtDeserializer::new(tag))
}

struct NbtSerializer;

impl ser::Serializer for NbtSerializer {
    type Ok = Tag;
    type Error = SerdeError;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Byte(if v { 1 } else { 0 }))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Byte(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Short(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Long(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Byte(v as i8))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Short(v as i16))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Int(v as i32))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Long(v as i64))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        self.serialize_str(&v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::ByteArray(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Byte(0))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Byte(0))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        let mut compound = Compound::new();
        compound.set(variant, value.serialize(self)?);
        Ok(Tag::Compound(compound))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SerializeSeq {
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(SerializeTupleVariant {
            variant: variant.to_owned(),
            elements: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(SerializeMap {
            compound: Compound::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(SerializeStructVariant {
            variant: variant.to_owned(),
            compound: Compound::new(),
        })
    }
}

struct SerializeSeq {
    elements: Vec<Tag>,
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.elements.push(value.serialize(NbtSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let mut list = List::new();
        for element in self.elements {
            let index = list.len();
            list.insert(index, element);
        }
        Ok(Tag::List(list))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Tag;
    type Error = SerdeError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Self::Ok, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Tag;
    type Error = SerdeError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Self::Ok, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

struct SerializeTupleVariant {
    variant: String,
    elements: Vec<Tag>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.elements.push(value.serialize(NbtSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let mut list = List::new();
        for element in self.elements {
            let index = list.len();
            list.insert(index, element);
        }
        let mut compound = Compound::new();
        compound.set(self.variant, Tag::List(list));
        Ok(Tag::Compound(compound))
    }
}

struct SerializeMap {
    compound: Compound,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        let key_nbt = key.serialize(NbtSerializer)?;
        if let Tag::String(s) = key_nbt {
            self.next_key = Some(s);
            Ok(())
        } else {
            Err(ser::Error::custom("NBT map keys must be strings"))
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| ser::Error::custom("serialize_value called before serialize_key"))?;
        self.compound.set(key, value.serialize(NbtSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Compound(self.compound))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.compound.set(key, value.serialize(NbtSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Tag::Compound(self.compound))
    }
}

struct SerializeStructVariant {
    variant: String,
    compound: Compound,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.compound.set(key, value.serialize(NbtSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let mut outer = Compound::new();
        outer.set(self.variant, Tag::Compound(self.compound));
        Ok(Tag::Compound(outer))
    }
}

struct NbtDeserializer {
    tag: Tag,
}

impl NbtDeserializer {
    fn new(tag: Tag) -> Self {
        NbtDeserializer { tag }
    }
}

impl<'de> de::Deserializer<'de> for NbtDeserializer {
    type Error = SerdeError;

    fn deserialize_any<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tag {
            Tag::Byte(v) => visitor.visit_i8(v),
            Tag::Short(v) => visitor.visit_i16(v),
            Tag::Int(v) => visitor.visit_i32(v),
            Tag::Long(v) => visitor.visit_i64(v),
            Tag::Float(v) => visitor.visit_f32(v),
            Tag::Double(v) => visitor.visit_f64(v),
            Tag::ByteArray(v) => visitor.visit_byte_buf(v),
            Tag::String(v) => visitor.visit_string(v),
            Tag::List(v) => visitor.visit_seq(SeqAccess {
                iter: v.iter().cloned().collect::<Vec<_>>().into_iter(),
            }),
            Tag::Compound(v) => visitor.visit_map(MapAccess {
                iter: v.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Vec<_>>().into_iter(),
                next_value: None,
            }),
        }
    }

    fn deserialize_bool<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tag {
            Tag::Byte(v) => visitor.visit_bool(v != 0),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tag {
            Tag::Byte(0) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.tag {
            Tag::String(s) => visitor.visit_enum(EnumAccess {
                variant: s,
                value: None,
            }),
            Tag::Compound(m) => {
                if m.len() == 1 {
                    let (k, v) = m.iter().next().unwrap();
                    visitor.visit_enum(EnumAccess {
                        variant: k.clone(),
                        value: Some(v.clone()),
                    })
                } else {
                    Err(de::Error::custom(
                        "expected a compound with a single key for an enum",
                    ))
                }
            }
            _ => Err(de::Error::custom("expected a string or compound for an enum")),
        }
    }

    serde::forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqAccess {
    iter: std::vec::IntoIter<Tag>,
}

impl<'de> de::SeqAccess<'de> for SeqAccess {
    type Error = SerdeError;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.iter.next() {
            Some(tag) => seed.deserialize(NbtDeserializer::new(tag)).map(Some),
            None => Ok(None),
        }
    }
}

struct MapAccess {
    iter: std::vec::IntoIter<(String, Tag)>,
    next_value: Option<Tag>,
}

impl<'de> de::MapAccess<'de> for MapAccess {
    type Error = SerdeError;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.iter.next() {
            Some((k, v)) => {
                self.next_value = Some(v);
                seed.deserialize(de::value::StringDeserializer::new(k))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, Self::Error> {
        let v = self
            .next_value
            .take()
            .ok_or_else(|| de::Error::custom("next_value called before next_key"))?;
        seed.deserialize(NbtDeserializer::new(v))
    }
}

struct EnumAccess {
    variant: String,
    value: Option<Tag>,
}

impl<'de> de::EnumAccess<'de> for EnumAccess {
    type Error = SerdeError;
    type Variant = VariantAccess;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), Self::Error> {
        let variant = seed.deserialize(de::value::StringDeserializer::new(self.variant))?;
        Ok((variant, VariantAccess { value: self.value }))
    }
}

struct VariantAccess {
    value: Option<Tag>,
}

impl<'de> de::VariantAccess<'de> for VariantAccess {
    type Error = SerdeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            Some(_) => Err(de::Error::custom("expected a unit variant")),
            None => Ok(()),
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, Self::Error> {
        match self.value {
            Some(tag) => seed.deserialize(NbtDeserializer::new(tag)),
            None => Err(de::Error::custom("expected a newtype variant")),
        }
    }

    fn tuple_variant<V: de::Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            Some(Tag::List(v)) => visitor.visit_seq(SeqAccess {
                iter: v.iter().cloned().collect::<Vec<_>>().into_iter(),
            }),
            _ => Err(de::Error::custom("expected a list for a tuple variant")),
        }
    }

    fn struct_variant<V: de::Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            Some(Tag::Compound(v)) => visitor.visit_map(MapAccess {
                iter: v
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Vec<_>>()
                    .into_iter(),
                next_value: None,
            }),
            _ => Err(de::Error::custom("expected a compound for a struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Meta {
        version: String,
        tags: Vec<String>,
    }

    #[test]
    fn struct_round_trips_through_nbt() {
        let original = Meta {
            version: "1.0".to_owned(),
            tags: vec!["player".to_owned(), "admin".to_owned()],
        };

        let nbt = to_nbt(&original).unwrap();
        let decoded: Meta = from_nbt(nbt).unwrap();

        assert_eq!(original, decoded);
    }
}
