// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The region engine: open a `.mca`-style file, serve per-chunk reads off a
//! memory map, stage writes in memory, and relay the whole file on flush.

use crate::compress::CompressionKind;
use crate::endian::{read_u24_be, write_u24_be};
use crate::error::Error;
use crate::nbt::Document;
use crate::region::{
    CHUNK_HEADER_LEN, ChunkCompression, SECTOR_SIZE, SLOT_COUNT, SlotMeta, sectors_for_payload,
    slot_index,
};
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A pending, not-yet-flushed mutation of one slot.
enum Override {
    Write {
        payload: Vec<u8>,
        compression: ChunkCompression,
        timestamp: u32,
    },
    Clear,
}

/// A memory-mapped Anvil-style region file.
///
/// Reads are served directly off the map; writes are staged in
/// [`Override`]s and only take effect on [`Region::flush`]. See the
/// crate-level concurrency contract: a `Region` is owned by one logical
/// thread at a time.
pub struct Region {
    path: PathBuf,
    write_mode: bool,
    mmap: Option<Mmap>,
    slots: Box<[SlotMeta; SLOT_COUNT]>,
    overrides: HashMap<usize, Override>,
}

impl Region {
    /// Opens (or, in `write_mode`, creates) a region file at `path`.
    ///
    /// Parses the index and timestamp sectors up front. Overlapping sector
    /// claims between slots are tolerated here — logged, not rejected — a
    /// subsequent [`flush`](Region::flush) always re-lays the file without
    /// overlap.
    pub fn open<P: AsRef<Path>>(path: P, write_mode: bool) -> Result<Region, Error> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if !write_mode {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "region file does not exist",
                )));
            }
            let file = File::create(&path)?;
            file.set_len((SECTOR_SIZE * 2) as u64)?;
            file.sync_all()?;
        }

        let file = File::open(&path)?;
        let len = file.metadata()?.len() as usize;

        let mut slots = Box::new([SlotMeta::default(); SLOT_COUNT]);
        let mmap = if len >= SECTOR_SIZE * 2 {
            // SAFETY: the region file is not concurrently truncated by
            // another process for the lifetime of this mapping; see the
            // crate-level concurrency contract (single-threaded per handle).
            let mmap = unsafe { Mmap::map(&file)? };

            for i in 0..SLOT_COUNT {
                let start = i * 4;
                let offset = read_u24_be(&mmap[start..start + 3]);
                let sector_count = mmap[start + 3];

                let ts_start = SECTOR_SIZE + i * 4;
                let timestamp = u32::from_be_bytes([
                    mmap[ts_start],
                    mmap[ts_start + 1],
                    mmap[ts_start + 2],
                    mmap[ts_start + 3],
                ]);

                slots[i] = SlotMeta {
                    offset,
                    sector_count,
                    timestamp,
                };
            }

            Region::log_overlaps(&slots, mmap.len());
            Some(mmap)
        } else {
            None
        };

        Ok(Region {
            path,
            write_mode,
            mmap,
            slots,
            overrides: HashMap::new(),
        })
    }

    fn log_overlaps(slots: &[SlotMeta; SLOT_COUNT], mapped_len: usize) {
        let total_sectors = mapped_len / SECTOR_SIZE;
        let mut used = vec![false; total_sectors.max(2)];
        used[0] = true;
        used[1] = true;
        for (index, slot) in slots.iter().enumerate() {
            if slot.is_empty() {
                continue;
            }
            let start = slot.offset as usize;
            let end = start + slot.sector_count as usize;
            if end > used.len() {
                log::warn!("slot {index} claims sectors past the end of the mapped file");
                continue;
            }
            for sector in start..end {
                if used[sector] {
                    log::warn!("slot {index} overlaps another slot's sectors at sector {sector}");
                } else {
                    used[sector] = true;
                }
            }
        }
    }

    /// Whether slot `(x, z)` holds a chunk, per the "timestamp != 0" legacy
    /// convention — a slot with storage claimed but a zero timestamp does
    /// not count.
    pub fn contains_chunk(&self, x: i32, z: i32) -> Result<bool, Error> {
        Ok(self.timestamp(x, z)? != 0)
    }

    /// The slot's timestamp, or 0 if empty.
    pub fn timestamp(&self, x: i32, z: i32) -> Result<u32, Error> {
        let index = slot_index(x, z)?;
        Ok(match self.overrides.get(&index) {
            Some(Override::Clear) => 0,
            Some(Override::Write { timestamp, .. }) => *timestamp,
            None => self.slots[index].timestamp,
        })
    }

    /// The slot's compressed payload length in bytes, or 0 if empty.
    pub fn length(&self, x: i32, z: i32) -> Result<u32, Error> {
        let index = slot_index(x, z)?;
        match self.overrides.get(&index) {
            Some(Override::Clear) => Ok(0),
            Some(Override::Write { payload, .. }) => Ok(payload.len() as u32),
            None => {
                let slot = self.slots[index];
                if slot.is_empty() {
                    Ok(0)
                } else {
                    Ok(self.mapped_header(slot)?.0)
                }
            }
        }
    }

    /// The slot's compression framing, or `None` if empty.
    pub fn compression(&self, x: i32, z: i32) -> Result<Option<ChunkCompression>, Error> {
        let index = slot_index(x, z)?;
        match self.overrides.get(&index) {
            Some(Override::Clear) => Ok(None),
            Some(Override::Write { compression, .. }) => Ok(Some(*compression)),
            None => {
                let slot = self.slots[index];
                if slot.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(self.mapped_header(slot)?.1))
                }
            }
        }
    }

    /// A borrowed view of the slot's compressed payload bytes, valid until
    /// the next [`flush`](Region::flush) or [`close`](Region::close).
    ///
    /// If the slot was staged (written or cleared) since open, the staged
    /// view wins over whatever is on disk.
    pub fn data(&self, x: i32, z: i32) -> Result<Option<&[u8]>, Error> {
        let index = slot_index(x, z)?;
        match self.overrides.get(&index) {
            Some(Override::Clear) => Ok(None),
            Some(Override::Write { payload, .. }) => Ok(Some(payload.as_slice())),
            None => {
                let slot = self.slots[index];
                if slot.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(self.mapped_payload(slot)?))
                }
            }
        }
    }

    /// Reads and inflates the slot's payload, then parses it as an NBT
    /// document. `None` if the slot is empty.
    pub fn read_chunk_document(&self, x: i32, z: i32) -> Result<Option<Document>, Error> {
        let Some(bytes) = self.data(x, z)? else {
            return Ok(None);
        };
        let compression = self
            .compression(x, z)?
            .expect("data() returned Some implies a compression code is recorded");
        let kind = CompressionKind::try_from(compression)
            .map_err(|e| Error::CorruptStream(e.to_string()))?;
        let raw = crate::compress::inflate(bytes, kind)?;
        Ok(Some(Document::parse(&raw)?))
    }

    /// Serializes, compresses, and stages `document` into slot `(x, z)`.
    pub fn write_chunk_document(
        &mut self,
        x: i32,
        z: i32,
        document: &Document,
        compression: CompressionKind,
        timestamp: u32,
    ) -> Result<(), Error> {
        let raw = document.write()?;
        let payload = crate::compress::deflate(&raw, compression)?;
        self.set_chunk(x, z, payload, compression, timestamp)
    }

    /// Stages slot `(x, z)` to hold `payload`, taking effect on the next
    /// flush. `payload` is the already-compressed chunk bytes.
    pub fn set_chunk(
        &mut self,
        x: i32,
        z: i32,
        payload: Vec<u8>,
        compression: CompressionKind,
        timestamp: u32,
    ) -> Result<(), Error> {
        let index = slot_index(x, z)?;
        self.overrides.insert(
            index,
            Override::Write {
                payload,
                compression: compression.into(),
                timestamp,
            },
        );
        Ok(())
    }

    /// Stages slot `(x, z)` to be emptied, taking effect on the next flush.
    pub fn clear_chunk(&mut self, x: i32, z: i32) -> Result<(), Error> {
        let index = slot_index(x, z)?;
        self.overrides.insert(index, Override::Clear);
        Ok(())
    }

    fn mapped_header(&self, slot: SlotMeta) -> Result<(u32, ChunkCompression), Error> {
        let mmap = self
            .mmap
            .as_ref()
            .expect("a non-empty slot implies the file was mapped at open");
        let start = slot.offset as usize * SECTOR_SIZE;
        if start + CHUNK_HEADER_LEN > mmap.len() {
            return Err(Error::Truncated("chunk header exceeds mapped file"));
        }
        let payload_len = u32::from_be_bytes([
            mmap[start],
            mmap[start + 1],
            mmap[start + 2],
            mmap[start + 3],
        ]);
        let compression = ChunkCompression::from_u8(mmap[start + 4]);
        Ok((payload_len, compression))
    }

    fn mapped_payload(&self, slot: SlotMeta) -> Result<&[u8], Error> {
        let mmap = self
            .mmap
            .as_ref()
            .expect("a non-empty slot implies the file was mapped at open");
        let (payload_len, _) = self.mapped_header(slot)?;
        let start = slot.offset as usize * SECTOR_SIZE + CHUNK_HEADER_LEN;
        let end = start + payload_len as usize;
        if end > mmap.len() {
            return Err(Error::Truncated("chunk payload exceeds mapped file"));
        }
        Ok(&mmap[start..end])
    }

    /// Commits all staged writes, re-laying the file from a fresh sector
    /// cursor so the result has no overlapping or fragmented slots.
    ///
    /// For a region opened read-only, this only re-reads the map (to pick
    /// up changes made by another process) and performs no write.
    pub fn flush(&mut self) -> Result<(), Error> {
        if !self.write_mode {
            return self.reload();
        }

        // Snapshot every slot's effective content, applying overrides, as
        // owned bytes — the source map is about to be replaced.
        let mut snapshot: Vec<Option<(ChunkCompression, u32, Vec<u8>)>> =
            Vec::with_capacity(SLOT_COUNT);
        for index in 0..SLOT_COUNT {
            let entry = match self.overrides.get(&index) {
                Some(Override::Clear) => None,
                Some(Override::Write {
                    payload,
                    compression,
                    timestamp,
                }) => Some((*compression, *timestamp, payload.clone())),
                None => {
                    let slot = self.slots[index];
                    if slot.is_empty() {
                        None
                    } else {
                        let (_, compression) = self.mapped_header(slot)?;
                        let payload = self.mapped_payload(slot)?.to_vec();
                        Some((compression, slot.timestamp, payload))
                    }
                }
            };
            snapshot.push(entry);
        }

        let mut new_slots = Box::new([SlotMeta::default(); SLOT_COUNT]);
        let mut cursor: u32 = 2;
        let mut payload_runs: Vec<(usize, &ChunkCompression, &[u8])> = Vec::new();

        for (index, entry) in snapshot.iter().enumerate() {
            if let Some((compression, timestamp, payload)) = entry {
                let sector_count = sectors_for_payload(payload.len());
                new_slots[index] = SlotMeta {
                    offset: cursor,
                    sector_count: sector_count as u8,
                    timestamp: *timestamp,
                };
                payload_runs.push((index, compression, payload.as_slice()));
                cursor += sector_count;
            }
        }

        let total_sectors = cursor as usize;
        let mut out = Vec::with_capacity(total_sectors * SECTOR_SIZE);

        let mut index_sector = [0u8; SECTOR_SIZE];
        let mut timestamp_sector = [0u8; SECTOR_SIZE];
        for (i, slot) in new_slots.iter().enumerate() {
            let base = i * 4;
            write_u24_be(&mut index_sector[base..base + 3], slot.offset);
            index_sector[base + 3] = slot.sector_count;
            timestamp_sector[base..base + 4].copy_from_slice(&slot.timestamp.to_be_bytes());
        }
        out.extend_from_slice(&index_sector);
        out.extend_from_slice(&timestamp_sector);

        for (index, compression, payload) in payload_runs {
            let sector_count = new_slots[index].sector_count as usize;
            let run_len = sector_count * SECTOR_SIZE;
            let start = out.len();
            out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            out.push(compression.as_u8());
            out.extend_from_slice(payload);
            out.resize(start + run_len, 0);
        }

        let tmp_path = self.path.with_extension("mca.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&out)?;
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        self.slots = new_slots;
        self.overrides.clear();
        self.reload()
    }

    /// Re-opens the memory map from the file currently at `path` without
    /// touching pending overrides or re-parsing slot metadata.
    fn reload(&mut self) -> Result<(), Error> {
        let file = File::open(&self.path)?;
        let len = file.metadata()?.len() as usize;
        self.mmap = if len >= SECTOR_SIZE * 2 {
            // SAFETY: see Region::open.
            Some(unsafe { Mmap::map(&file)? })
        } else {
            None
        };
        Ok(())
    }

    /// Releases the mapping and discards any pending (unflushed) writes.
    pub fn close(self) {}
}
