//! Memory-mapped Directed Acyclic Word Graph reader.
//!
//! A DAWG file is a small header followed by an array of 32-bit nodes:
//!
//! ```text
//! signature:  u32   the bytes "DAWG"
//! version:    u32   1
//! node_count: u32
//! root:       u32   index of the root's first edge in the node array
//! nodes:      u32[node_count]
//! ```
//!
//! Each node is one edge of a sibling list:
//!
//! - bit 31: end-of-word at this edge
//! - bit 30: last edge of the sibling list
//! - bits 8..30: index of the first child edge, 0 when there are none
//! - bits 0..8: the edge letter, a source-encoding byte
//!
//! The engine uses two of these: one holding every form allowed as a
//! compound prefix (including multi-segment prefixes), one holding every
//! form allowed as the final, inflected part of a compound.

use std::path::Path;

use crate::dictionary::image::ByteImage;
use crate::errors::{BinlexError, Result};

pub(crate) const DAWG_SIGNATURE: u32 = u32::from_le_bytes(*b"DAWG");
pub(crate) const DAWG_VERSION: u32 = 1;

const HEADER_LEN: usize = 16;
const END_OF_WORD: u32 = 0x8000_0000;
const END_OF_LIST: u32 = 0x4000_0000;
const CHILD_SHIFT: u32 = 8;
const CHILD_MASK: u32 = (1 << 22) - 1;

pub(crate) struct Dawg {
    image: ByteImage,
    node_count: u32,
    root: u32,
}

impl Dawg {
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        Self::new(ByteImage::open(path)?)
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::new(ByteImage::from_vec(bytes))
    }

    fn new(image: ByteImage) -> Result<Self> {
        if image.len() < HEADER_LEN {
            return Err(BinlexError::ImageTooSmall {
                expected: HEADER_LEN,
                actual: image.len(),
            });
        }
        if image.u32le(0) != Some(DAWG_SIGNATURE) {
            return Err(BinlexError::BadSignature("DAWG image"));
        }
        if image.u32le(4) != Some(DAWG_VERSION) {
            return Err(BinlexError::invalid_format("dawg", "unsupported version"));
        }
        let node_count = image.u32le(8).unwrap_or(0);
        let root = image.u32le(12).unwrap_or(0);
        if HEADER_LEN + node_count as usize * 4 > image.len() || root > node_count {
            return Err(BinlexError::invalid_format(
                "dawg",
                "node array inconsistent with file size",
            ));
        }
        Ok(Self {
            image,
            node_count,
            root,
        })
    }

    #[inline(always)]
    fn node(&self, ix: u32) -> Option<u32> {
        if ix >= self.node_count {
            return None;
        }
        self.image.u32le(HEADER_LEN + ix as usize * 4)
    }

    /// Finds the edge for `letter` in the sibling list starting at `ix`.
    fn edge(&self, ix: u32, letter: u8) -> Option<u32> {
        let mut ix = ix;
        loop {
            let node = self.node(ix)?;
            if (node & 0xFF) as u8 == letter {
                return Some(node);
            }
            if node & END_OF_LIST != 0 {
                return None;
            }
            ix += 1;
        }
    }

    /// Membership test for a word in the source encoding.
    pub(crate) fn contains(&self, word: &[u8]) -> bool {
        let mut list = self.root;
        for (i, &letter) in word.iter().enumerate() {
            let Some(node) = self.edge(list, letter) else {
                return false;
            };
            if i + 1 == word.len() {
                return node & END_OF_WORD != 0;
            }
            list = (node >> CHILD_SHIFT) & CHILD_MASK;
            if list == 0 {
                return false;
            }
        }
        false
    }

    /// All positions `i` with `1 <= i <= word.len() - 2` such that
    /// `word[..i]` is a member, collected in one walk, in ascending
    /// order. The upper bound leaves every split a suffix of at least
    /// two bytes.
    pub(crate) fn prefix_boundaries(&self, word: &[u8]) -> Vec<usize> {
        let mut out = Vec::new();
        let mut list = self.root;
        for (i, &letter) in word.iter().enumerate() {
            let Some(node) = self.edge(list, letter) else {
                return out;
            };
            if node & END_OF_WORD != 0 && i + 2 < word.len() {
                out.push(i + 1);
            }
            list = (node >> CHILD_SHIFT) & CHILD_MASK;
            if list == 0 {
                return out;
            }
        }
        out
    }
}
