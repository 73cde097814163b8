// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The NBT document codec: parsing a byte stream into a [`Tag`] tree,
//! serializing a tree back to bytes, and the gzip-framed file-level
//! read/write contract.

pub mod encode;
pub mod mutf8;
pub mod parse;
#[cfg(feature = "serde")]
pub mod serde_impl;

use crate::compress::{self, CompressionKind};
use crate::error::Error;
use crate::tag::{Compound, Tag};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// An NBT document: a root name paired with a root `Compound` tag.
///
/// Documents may be stored gzip-framed or raw; [`Document::parse`]
/// auto-detects which on read. [`Document::write`] always produces raw
/// (unframed) bytes — gzip framing is applied only at the file level by
/// [`Document::write_file`], matching the wire contract that writers always
/// gzip-frame output while in-memory serialization stays composable.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root_name: String,
    root: Compound,
}

impl Document {
    /// Creates an empty document with the given root name.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            root: Compound::new(),
        }
    }

    /// The document's root name.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Sets the document's root name.
    pub fn set_root_name(&mut self, name: impl Into<String>) {
        self.root_name = name.into();
    }

    /// Borrows the root compound.
    pub fn root(&self) -> &Compound {
        &self.root
    }

    /// Mutably borrows the root compound.
    pub fn root_mut(&mut self) -> &mut Compound {
        &mut self.root
    }

    /// Depth-first search for the first `Compound` entry named `name`,
    /// starting from the root. See [`crate::tag::find`].
    pub fn find(&self, name: &str) -> Option<&Tag> {
        crate::tag::find_in_compound(&self.root, name)
    }

    /// Parses a document out of `bytes`.
    ///
    /// If `bytes` begins with the gzip magic (`0x1F 0x8B`) it is inflated
    /// first and parsing continues on the result; otherwise `bytes` is
    /// read as a raw NBT stream. The first tag must be a named `Compound`.
    pub fn parse(bytes: &[u8]) -> Result<Document, Error> {
        let owned;
        let raw: &[u8] = if bytes.len() >= 2 && bytes[0..2] == GZIP_MAGIC {
            owned = compress::inflate(bytes, CompressionKind::Gzip)?;
            &owned
        } else {
            bytes
        };

        let mut input = raw;
        let (root_name, root_tag) = parse::parse_named_tag(&mut input)?;
        let Tag::Compound(root) = root_tag else {
            return Err(Error::Malformed(
                "document root tag must be a Compound".into(),
            ));
        };
        Ok(Document { root_name, root })
    }

    /// Serializes the document to raw (unframed) NBT bytes.
    pub fn write(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        encode::write_named_compound(&mut buf, &self.root_name, &self.root)?;
        Ok(buf)
    }

    /// Reads and parses a document from `path`, memory-mapping the file
    /// when it is non-empty.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Document, Error> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Err(Error::Truncated("empty NBT file"));
        }
        // SAFETY: the file is not expected to be concurrently truncated by
        // another process while we hold this mapping; see the crate-level
        // concurrency contract (single-threaded per open handle).
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Document::parse(&mmap)
    }

    /// Serializes and gzip-frames the document, then writes it to `path`
    /// atomically (temp file in the same directory, then rename).
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let raw = self.write()?;
        let framed = compress::deflate(&raw, CompressionKind::Gzip)?;

        let path = path.as_ref();
        let tmp_path = path.with_extension("nbt.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&framed)?;
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_round_trips() {
        let mut doc = Document::new("TestNBT");
        doc.root_mut().set("byte", Tag::Byte(0));

        let bytes = doc.write().unwrap();
        let parsed = Document::parse(&bytes).unwrap();

        assert_eq!(parsed.root_name(), "TestNBT");
        assert_eq!(
            parsed.root().find_chain(&["byte"]).map(Tag::get_int64),
            Some(0)
        );
    }

    #[test]
    fn gzip_framed_document_auto_detects() {
        let mut doc = Document::new("Level");
        doc.root_mut().set("GameType", Tag::Int(0));

        let raw = doc.write().unwrap();
        let framed = compress::deflate(&raw, CompressionKind::Gzip).unwrap();

        let parsed = Document::parse(&framed).unwrap();
        assert_eq!(parsed.root_name(), "Level");
        assert_eq!(parsed.find("GameType").map(Tag::get_int64), Some(0));
    }

    #[test]
    fn gamemode_edit_round_trips() {
        let mut doc = Document::new("Level");
        doc.root_mut().set("GameType", Tag::Int(0));

        if let Some(tag) = doc.root_mut().get_mut("GameType") {
            tag.set_int64(2);
        }

        let bytes = doc.write().unwrap();
        let reparsed = Document::parse(&bytes).unwrap();
        assert_eq!(reparsed.find("GameType").map(Tag::get_int64), Some(2));
    }

    #[test]
    fn deep_search_returns_nested_list_element() {
        let mut inner = Compound::new();
        let mut list = crate::tag::List::new();
        list.insert(0, Tag::Int(1));
        list.insert(1, Tag::Int(2));
        list.insert(2, Tag::Int(3));
        inner.set("b", Tag::List(list));

        let mut root = Document::new("root");
        root.root_mut().set("a", Tag::Compound(inner));

        let found = root.find("b").expect("should find nested list");
        let list = found.as_list().expect("should be a list");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1).map(Tag::get_int64), Some(2));
    }
}
