// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The crate-wide error type.
//!
//! Every fallible operation across the codec and region engine surfaces one
//! of these variants (see the error table in the format notes). Programmer
//! contract violations — wrong-kind tag accessors, list element-kind
//! mismatches — are not represented here: they go out over the `log`
//! diagnostic channel and the call returns a zero/none/no-op value instead.

use std::fmt;

/// Errors produced by the NBT codec and the region engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Wraps any I/O failure from file open/read/write/rename.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A length field or nested structure read past the end of the input.
    #[error("truncated NBT stream: {0}")]
    Truncated(&'static str),

    /// A length field, string encoding, or count was structurally invalid.
    #[error("malformed NBT data: {0}")]
    Malformed(String),

    /// A tag-kind byte outside the 0..=10 range.
    #[error("unknown NBT tag kind: {0}")]
    UnknownKind(u8),

    /// gzip/zlib inflate failed.
    #[error("corrupt compressed stream: {0}")]
    CorruptStream(String),

    /// gzip/zlib deflate failed.
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// A (x, z) pair fell outside the 0..32 slot grid.
    #[error("chunk slot ({x}, {z}) is out of the 0..32 range")]
    InvalidSlot { x: i32, z: i32 },
}

/// A chunk's compression-kind byte that did not match 1 (gzip) or 2 (zlib).
///
/// Carried separately from [`Error`] because reading an unknown code is not
/// itself fatal (the slot is still reported, with `Compression::Unknown`);
/// only attempting to *write* with it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCompressionCode(pub u8);

impl fmt::Display for UnknownCompressionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown compression code: {}", self.0)
    }
}

impl std::error::Error for UnknownCompressionCode {}
