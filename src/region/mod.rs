// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Anvil-style region file handling: a sparse 32×32 grid of per-chunk NBT
//! blobs packed into 4096-byte sectors with a sector index and a timestamp
//! table. See [`access::Region`] for the engine itself.

pub mod access;

use crate::compress::CompressionKind;
use crate::error::{Error, UnknownCompressionCode};

/// Size of one allocation unit within a region file.
pub const SECTOR_SIZE: usize = 4096;

/// Width/height of the chunk grid a single region file covers.
pub const GRID_SIZE: i32 = 32;

/// Total addressable slots in a region (`GRID_SIZE * GRID_SIZE`).
pub const SLOT_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// Bytes of framing ahead of the compressed payload within a chunk's sector
/// run: a 4-byte big-endian length followed by a 1-byte compression code.
pub(crate) const CHUNK_HEADER_LEN: usize = 5;

/// The compression framing of a chunk's payload.
///
/// Unlike [`CompressionKind`], this can represent a code read off disk that
/// doesn't match either known scheme — the region engine tolerates that on
/// read (per the format's "other values map to unknown on read" contract)
/// rather than failing the whole chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCompression {
    Gzip,
    Zlib,
    Unknown(u8),
}

impl ChunkCompression {
    pub(crate) fn from_u8(code: u8) -> ChunkCompression {
        match code {
            1 => ChunkCompression::Gzip,
            2 => ChunkCompression::Zlib,
            other => {
                log::warn!("{}", UnknownCompressionCode(other));
                ChunkCompression::Unknown(other)
            }
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            ChunkCompression::Gzip => 1,
            ChunkCompression::Zlib => 2,
            ChunkCompression::Unknown(code) => code,
        }
    }
}

impl From<CompressionKind> for ChunkCompression {
    fn from(kind: CompressionKind) -> Self {
        match kind {
            CompressionKind::Gzip => ChunkCompression::Gzip,
            CompressionKind::Zlib => ChunkCompression::Zlib,
        }
    }
}

impl TryFrom<ChunkCompression> for CompressionKind {
    type Error = UnknownCompressionCode;

    fn try_from(value: ChunkCompression) -> Result<Self, Self::Error> {
        match value {
            ChunkCompression::Gzip => Ok(CompressionKind::Gzip),
            ChunkCompression::Zlib => Ok(CompressionKind::Zlib),
            ChunkCompression::Unknown(code) => Err(UnknownCompressionCode(code)),
        }
    }
}

/// Per-slot metadata kept alongside the mapped file: where its sector run
/// starts, how many sectors it spans, and its application-defined
/// timestamp. A slot with `sector_count == 0` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotMeta {
    pub offset: u32,
    pub sector_count: u8,
    pub timestamp: u32,
}

impl SlotMeta {
    fn is_empty(&self) -> bool {
        self.sector_count == 0
    }
}

/// Maps chunk coordinates to a slot index, rejecting anything outside the
/// `0..32` grid.
pub(crate) fn slot_index(x: i32, z: i32) -> Result<usize, Error> {
    if !(0..GRID_SIZE).contains(&x) || !(0..GRID_SIZE).contains(&z) {
        return Err(Error::InvalidSlot { x, z });
    }
    Ok((z * GRID_SIZE + x) as usize)
}

/// Number of whole sectors needed to hold `payload_len` bytes of compressed
/// chunk data plus its 5-byte header.
pub(crate) fn sectors_for_payload(payload_len: usize) -> u32 {
    let total = CHUNK_HEADER_LEN + payload_len;
    (total.div_ceil(SECTOR_SIZE)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_index_is_row_major() {
        assert_eq!(slot_index(0, 0).unwrap(), 0);
        assert_eq!(slot_index(31, 0).unwrap(), 31);
        assert_eq!(slot_index(0, 1).unwrap(), 32);
        assert_eq!(slot_index(31, 31).unwrap(), 1023);
    }

    #[test]
    fn slot_index_rejects_out_of_range() {
        assert!(matches!(slot_index(32, 0), Err(Error::InvalidSlot { .. })));
        assert!(matches!(slot_index(0, -1), Err(Error::InvalidSlot { .. })));
    }

    #[test]
    fn sectors_for_payload_rounds_up() {
        assert_eq!(sectors_for_payload(0), 1);
        assert_eq!(sectors_for_payload(SECTOR_SIZE - CHUNK_HEADER_LEN), 1);
        assert_eq!(sectors_for_payload(SECTOR_SIZE - CHUNK_HEADER_LEN + 1), 2);
    }

    #[test]
    fn unknown_compression_code_round_trips_its_byte() {
        let c = ChunkCompression::from_u8(9);
        assert_eq!(c, ChunkCompression::Unknown(9));
        assert_eq!(c.as_u8(), 9);
    }
}
