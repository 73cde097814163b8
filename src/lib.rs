// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

#![cfg_attr(docsrs, feature(doc_cfg))]

//! # nbt-region
//!
//! NBT tag trees and Anvil-style region file storage for voxel sandbox
//! world data.
//!
//! - [`tag`] — the in-memory tag tree (`Tag`, `List`, `Compound`).
//! - [`nbt`] — the streaming codec and file-level `Document` API, with
//!   optional `serde` support behind the `serde` feature.
//! - [`region`] — the sector-indexed region file engine: open, per-chunk
//!   read/write, flush.
//! - [`compress`] and [`endian`] — the byte-order and compression
//!   primitives the two higher layers are built on.
//!
//! Bit-perfect round-trips are a design goal throughout: a tag tree
//! serialized and re-parsed, or a region flushed and reopened, is expected
//! to come back structurally identical.

pub mod compress;
pub mod endian;
pub mod error;
pub mod nbt;
pub mod region;
pub mod tag;

pub use error::Error;
pub use nbt::Document;
pub use region::access::Region;
pub use tag::{Compound, Kind, List, Tag};
