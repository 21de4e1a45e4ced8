//! Bounds-checked reader over a memory-mapped byte image.
//!
//! All integers in the image are little-endian and all offsets are byte
//! offsets from the start of the image. Every accessor checks its range
//! against the image length and answers `None` for anything out of range;
//! a damaged offset can therefore never fault, it only makes the record
//! it belongs to unreadable.

use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LE};
use memmap2::Mmap;

use crate::errors::{BinlexError, Result};

/// The memory holding an image: a read-only private mapping, or an owned
/// buffer when the image was produced in memory.
#[derive(Debug)]
enum ImageBuf {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

#[derive(Debug)]
pub(crate) struct ByteImage {
    buf: ImageBuf,
}

impl ByteImage {
    /// Maps the file at `path` read-only.
    ///
    /// The file descriptor is closed as soon as the mapping is established;
    /// the mapping itself lives until the image is dropped.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| BinlexError::ImageOpen {
            path: path.to_path_buf(),
            source,
        })?;
        // SAFETY: the mapping is private and read-only, and the engine
        // never writes through it. A concurrently truncated file can fault;
        // the image files are distributed read-only alongside the package.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| BinlexError::ImageOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            buf: ImageBuf::Mmap(mmap),
        })
    }

    /// Wraps an in-memory image, used by tests and by callers that have
    /// already read the bytes from elsewhere.
    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            buf: ImageBuf::Owned(bytes),
        }
    }

    #[inline(always)]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match &self.buf {
            ImageBuf::Mmap(m) => m,
            ImageBuf::Owned(v) => v,
        }
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline(always)]
    pub(crate) fn u8(&self, offset: usize) -> Option<u8> {
        self.as_slice().get(offset).copied()
    }

    #[allow(dead_code)]
    #[inline(always)]
    pub(crate) fn u16le(&self, offset: usize) -> Option<u16> {
        let b = self.as_slice().get(offset..offset.checked_add(2)?)?;
        Some(LE::read_u16(b))
    }

    #[inline(always)]
    pub(crate) fn u32le(&self, offset: usize) -> Option<u32> {
        let b = self.as_slice().get(offset..offset.checked_add(4)?)?;
        Some(LE::read_u32(b))
    }

    /// A slice of `len` bytes starting at `offset`.
    #[inline(always)]
    pub(crate) fn bytes(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.as_slice().get(offset..offset.checked_add(len)?)
    }

    /// The zero-terminated byte string starting at `offset`, without the
    /// terminator. `None` if no terminator exists before the end of the
    /// image.
    #[inline(always)]
    pub(crate) fn cstr(&self, offset: usize) -> Option<&[u8]> {
        let tail = self.as_slice().get(offset..)?;
        let end = tail.iter().position(|&b| b == 0)?;
        Some(&tail[..end])
    }

    /// The length-prefixed byte string at `offset`: one length byte
    /// followed by that many bytes.
    #[inline(always)]
    pub(crate) fn pstr(&self, offset: usize) -> Option<&[u8]> {
        let len = self.u8(offset)? as usize;
        self.bytes(offset + 1, len)
    }
}
