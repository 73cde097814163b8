// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! gzip (RFC 1952) and zlib (RFC 1950) wrappers over a growable byte buffer.
//!
//! Both NBT documents and region chunk payloads are framed in one of these
//! two container formats; this module is the single place that talks to
//! `flate2` so the codec and the region engine never touch the compression
//! backend directly.

use crate::error::Error;
use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::{Read, Write};

/// Which RFC-defined compression framing wraps a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    /// RFC 1952 gzip framing.
    Gzip,
    /// RFC 1950 zlib framing.
    Zlib,
}

/// Inflates `bytes` that are framed per `kind`.
///
/// Returns [`Error::CorruptStream`] if the stream does not decode cleanly.
pub fn inflate(bytes: &[u8], kind: CompressionKind) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let result = match kind {
        CompressionKind::Gzip => GzDecoder::new(bytes).read_to_end(&mut out),
        CompressionKind::Zlib => ZlibDecoder::new(bytes).read_to_end(&mut out),
    };
    result
        .map(|_| out)
        .map_err(|e| Error::CorruptStream(e.to_string()))
}

/// Deflates `bytes`, framing the result per `kind`.
///
/// Returns [`Error::CompressionFailed`] on an underlying write failure (the
/// in-memory encoders used here practically never fail, but the stream
/// contract allows it).
pub fn deflate(bytes: &[u8], kind: CompressionKind) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let result = (|| -> std::io::Result<()> {
        match kind {
            CompressionKind::Gzip => {
                let mut encoder = GzEncoder::new(&mut out, Compression::default());
                encoder.write_all(bytes)?;
                encoder.finish()?;
            }
            CompressionKind::Zlib => {
                let mut encoder = ZlibEncoder::new(&mut out, Compression::default());
                encoder.write_all(bytes)?;
                encoder.finish()?;
            }
        }
        Ok(())
    })();
    result
        .map(|_| out)
        .map_err(|e| Error::CompressionFailed(e.to_string()))
}

/// A minimal growable byte buffer, used by the codec and region writers as
/// a named accumulator rather than a bare `Vec<u8>` at every call site.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    buf: Vec<u8>,
}

impl ByteBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates an empty buffer with room for at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Appends `bytes` to the end of the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the buffer, returning the accumulated bytes.
    pub fn finalize(self) -> Vec<u8> {
        self.buf
    }
}
