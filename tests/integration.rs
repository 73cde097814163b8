// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

use nbt_region::compress::{self, CompressionKind};
use nbt_region::nbt::Document;
use nbt_region::region::access::Region;
use nbt_region::tag::{Compound, List, Tag};
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A path under the system temp dir, unique per test, removed on drop.
struct ScopedPath(std::path::PathBuf);

impl ScopedPath {
    fn new(name: &str) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!(
            "nbt-region-integration-{}-{}-{}",
            std::process::id(),
            id,
            name
        ));
        ScopedPath(path)
    }

    fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Drop for ScopedPath {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
        let _ = std::fs::remove_file(self.0.with_extension("nbt.tmp"));
        let _ = std::fs::remove_file(self.0.with_extension("mca.tmp"));
    }
}

#[test]
fn complex_document_round_trips_gzip_framed() {
    let mut root = Compound::new();
    root.set("byte", Tag::Byte(127));
    root.set("short", Tag::Short(32767));
    root.set("int", Tag::Int(2147483647));

    let mut list = List::new();
    list.insert(0, Tag::String("A".into()));
    list.insert(1, Tag::String("B".into()));
    list.insert(2, Tag::String("C".into()));
    root.set("list", Tag::List(list));

    let mut nested = Compound::new();
    nested.set("key", Tag::String("value".into()));
    root.set("nested", Tag::Compound(nested));

    let mut doc = Document::new("Level");
    *doc.root_mut() = root.clone();

    let raw = doc.write().unwrap();
    let framed = compress::deflate(&raw, CompressionKind::Gzip).unwrap();

    let parsed = Document::parse(&framed).unwrap();
    assert_eq!(parsed.root_name(), "Level");
    assert_eq!(parsed.root(), &root);
}

#[test]
fn document_file_round_trip_is_atomic_and_gzip_framed() {
    let path = ScopedPath::new("level.dat");

    let mut doc = Document::new("Level");
    doc.root_mut().set("GameType", Tag::Int(0));
    doc.write_file(path.path()).unwrap();

    let on_disk = std::fs::read(path.path()).unwrap();
    assert_eq!(&on_disk[0..2], &[0x1F, 0x8B]);

    let reparsed = Document::read_file(path.path()).unwrap();
    assert_eq!(reparsed.root_name(), "Level");
    assert_eq!(reparsed.find("GameType").map(Tag::get_int64), Some(0));
}

#[test]
fn zero_length_list_and_byte_array_round_trip() {
    let mut root = Compound::new();
    root.set("empty_bytes", Tag::ByteArray(Vec::new()));
    root.set("", Tag::Int(7)); // zero-length key

    let mut empty_list = List::new();
    empty_list.set_element_kind(nbt_region::tag::Kind::Byte);
    root.set("empty_list", Tag::List(empty_list));

    let mut doc = Document::new("root");
    *doc.root_mut() = root;

    let bytes = doc.write().unwrap();
    let parsed = Document::parse(&bytes).unwrap();

    assert_eq!(parsed.root().get("empty_bytes"), Some(&Tag::ByteArray(vec![])));
    assert_eq!(parsed.root().get(""), Some(&Tag::Int(7)));
    let list = parsed.root().get("empty_list").unwrap().as_list().unwrap();
    assert_eq!(list.len(), 0);
    assert_eq!(list.element_kind(), nbt_region::tag::Kind::Byte);
}

#[test]
fn region_write_read_round_trip_matches_scenario_4() {
    let path = ScopedPath::new("write_read.mca");

    let mut chunk_root = Compound::new();
    chunk_root.set("Data", Tag::Int(123));
    let mut doc = Document::new("Chunk");
    *doc.root_mut() = chunk_root;
    let nbt_bytes = doc.write().unwrap();
    let payload = compress::deflate(&nbt_bytes, CompressionKind::Zlib).unwrap();

    {
        let mut region = Region::open(path.path(), true).unwrap();
        region
            .set_chunk(0, 0, payload.clone(), CompressionKind::Zlib, 1)
            .unwrap();
        region.flush().unwrap();
    }

    let region = Region::open(path.path(), false).unwrap();
    assert_eq!(region.timestamp(0, 0).unwrap(), 1);
    let data = region.data(0, 0).unwrap().unwrap();
    let inflated = compress::inflate(data, CompressionKind::Zlib).unwrap();
    assert_eq!(inflated, nbt_bytes);

    let parsed = region.read_chunk_document(0, 0).unwrap().unwrap();
    assert_eq!(parsed.root_name(), "Chunk");
    assert_eq!(parsed.root().get("Data"), Some(&Tag::Int(123)));
}

#[test]
fn region_sparse_layout_matches_scenario_5() {
    let path = ScopedPath::new("sparse.mca");

    let payload_a = compress::deflate(b"chunk a", CompressionKind::Zlib).unwrap();
    let payload_b = compress::deflate(b"chunk b", CompressionKind::Gzip).unwrap();

    let mut region = Region::open(path.path(), true).unwrap();
    region
        .set_chunk(0, 0, payload_a, CompressionKind::Zlib, 10)
        .unwrap();
    region
        .set_chunk(31, 31, payload_b, CompressionKind::Gzip, 20)
        .unwrap();
    region.flush().unwrap();

    assert!(region.contains_chunk(0, 0).unwrap());
    assert!(region.contains_chunk(31, 31).unwrap());
    for x in 1..31 {
        assert!(!region.contains_chunk(x, 0).unwrap());
    }

    let file_len = std::fs::metadata(path.path()).unwrap().len();
    assert_eq!(file_len, 4 * nbt_region::region::SECTOR_SIZE as u64);
}

#[test]
fn region_write_chunk_document_bridges_codec_and_compression() {
    let path = ScopedPath::new("bridge.mca");

    let mut root = Compound::new();
    root.set("foo", Tag::String("bar".into()));
    let mut doc = Document::new("Level");
    *doc.root_mut() = root;

    let mut region = Region::open(path.path(), true).unwrap();
    region
        .write_chunk_document(3, 4, &doc, CompressionKind::Zlib, 42)
        .unwrap();
    region.flush().unwrap();

    let reopened = Region::open(path.path(), false).unwrap();
    let roundtripped = reopened.read_chunk_document(3, 4).unwrap().unwrap();
    assert_eq!(roundtripped.root_name(), "Level");
    assert_eq!(
        roundtripped.root().get("foo"),
        Some(&Tag::String("bar".into()))
    );
    assert_eq!(reopened.timestamp(3, 4).unwrap(), 42);
}

#[test]
fn region_out_of_range_slot_is_rejected() {
    let path = ScopedPath::new("invalid_slot.mca");
    let region = Region::open(path.path(), true).unwrap();
    assert!(region.timestamp(32, 0).is_err());
    assert!(region.timestamp(0, -1).is_err());
}
