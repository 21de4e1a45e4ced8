//! The compressed alphabet of the image.
//!
//! Single-character trie nodes store a 7-bit index into this table instead
//! of the character byte itself. The table holds at most 127 entries so the
//! index fits in the trie header; index 0 is reserved.

use crate::dictionary::image::ByteImage;
use crate::errors::{BinlexError, Result};

#[derive(Debug)]
pub(crate) struct Alphabet {
    letters: Vec<u8>,
    // Reverse table, byte -> index + 1; 0 means absent. Only exercised when
    // source words are re-encoded during compound analysis and tests.
    reverse: [u8; 256],
}

impl Alphabet {
    /// Loads the alphabet section: a 32-bit length followed by the letter
    /// bytes in index order.
    pub(crate) fn load(image: &ByteImage, offset: usize) -> Result<Self> {
        let len = image
            .u32le(offset)
            .ok_or_else(|| BinlexError::invalid_format("alphabet", "length out of range"))?
            as usize;
        if len > 127 {
            return Err(BinlexError::invalid_format(
                "alphabet",
                format!("{} letters, at most 127 are addressable", len),
            ));
        }
        let letters = image
            .bytes(offset + 4, len)
            .ok_or_else(|| BinlexError::invalid_format("alphabet", "letters out of range"))?
            .to_vec();
        let mut reverse = [0u8; 256];
        for (i, &b) in letters.iter().enumerate() {
            reverse[b as usize] = (i + 1) as u8;
        }
        Ok(Self { letters, reverse })
    }

    /// The source-encoding byte for compressed letter index `i`.
    #[inline(always)]
    pub(crate) fn letter(&self, i: usize) -> Option<u8> {
        self.letters.get(i).copied()
    }

    /// The compressed letter index for a source-encoding byte.
    #[allow(dead_code)]
    #[inline(always)]
    pub(crate) fn index_of(&self, b: u8) -> Option<usize> {
        match self.reverse[b as usize] {
            0 => None,
            i => Some(i as usize - 1),
        }
    }

    #[allow(dead_code)]
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.letters.len()
    }
}
