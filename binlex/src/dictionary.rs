//! The compressed dictionary image.
//!
//! The image is a single packed file mapped read-only into the process
//! address space; every lookup walks the mapping directly and nothing is
//! unpacked up front except the alphabet and the subcategory names. The
//! layout is:
//!
//! - bytes 0..16: the ASCII signature, a project marker and version tuple
//! - bytes 16..48: eight little-endian `u32` offsets naming the starts of
//!   the mappings, forms, lemmas, templates, meanings, alphabet, subcats
//!   and ksnid sections
//!
//! Section contents are described in their modules: the radix trie in
//! [`trie`], packed meaning records in [`mapping`], lemma records and
//! inflection templates in [`lemmas`], meaning and ksnid strings in
//! [`meanings`] and [`ksnid`].

pub(crate) mod alphabet;
pub(crate) mod image;
pub(crate) mod ksnid;
pub(crate) mod lemmas;
pub(crate) mod mapping;
pub(crate) mod meanings;
pub(crate) mod trie;

use std::path::Path;

use crate::dictionary::alphabet::Alphabet;
use crate::dictionary::image::ByteImage;
use crate::dictionary::ksnid::KsnidAttrs;
use crate::dictionary::lemmas::{LemmaRecord, LEMMA_RECORD_LEN};
use crate::dictionary::mapping::RawMeaning;
use crate::dictionary::trie::FormIndex;
use crate::errors::{BinlexError, Result};
use crate::latin;

/// Signature of a compatible image: project marker plus format version.
pub const IMAGE_SIGNATURE: &[u8; 16] = b"Greynir 04.00.00";

const HEADER_LEN: usize = 48;

/// The eight section offsets from the image header.
#[derive(Debug, Clone, Copy)]
struct Header {
    mappings: usize,
    forms: usize,
    lemmas: usize,
    templates: usize,
    meanings: usize,
    alphabet: usize,
    subcats: usize,
    ksnid: usize,
}

/// A read-only, memory-resident dictionary image.
///
/// Construction validates the signature and the section offsets; a
/// constructed dictionary never fails at query time. The image is shared
/// freely between threads since nothing in it is ever mutated.
#[derive(Debug)]
pub struct Dictionary {
    image: ByteImage,
    header: Header,
    alphabet: Alphabet,
    subcats: Vec<String>,
    lemma_count: u32,
}

impl Dictionary {
    /// Memory-maps and validates the image at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(ByteImage::open(path.as_ref())?)
    }

    /// Validates an image already held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::new(ByteImage::from_vec(bytes))
    }

    fn new(image: ByteImage) -> Result<Self> {
        if image.len() < HEADER_LEN {
            return Err(BinlexError::ImageTooSmall {
                expected: HEADER_LEN,
                actual: image.len(),
            });
        }
        if image.bytes(0, 16) != Some(&IMAGE_SIGNATURE[..]) {
            return Err(BinlexError::BadSignature("dictionary image"));
        }
        let off = |i: usize| image.u32le(16 + i * 4).map(|v| v as usize);
        let header = Header {
            mappings: off(0).unwrap_or(0),
            forms: off(1).unwrap_or(0),
            lemmas: off(2).unwrap_or(0),
            templates: off(3).unwrap_or(0),
            meanings: off(4).unwrap_or(0),
            alphabet: off(5).unwrap_or(0),
            subcats: off(6).unwrap_or(0),
            ksnid: off(7).unwrap_or(0),
        };
        for (name, offset) in [
            ("mappings", header.mappings),
            ("forms", header.forms),
            ("lemmas", header.lemmas),
            ("templates", header.templates),
            ("meanings", header.meanings),
            ("alphabet", header.alphabet),
            ("subcats", header.subcats),
            ("ksnid", header.ksnid),
        ] {
            if offset < HEADER_LEN || offset >= image.len() {
                return Err(BinlexError::invalid_format(
                    name,
                    format!("section offset {} outside image", offset),
                ));
            }
        }
        // The templates section acts as the end sentinel of the fixed
        // stride lemma array.
        let lemma_span = header
            .templates
            .checked_sub(header.lemmas)
            .ok_or_else(|| BinlexError::invalid_format("lemmas", "section after templates"))?;
        if lemma_span % LEMMA_RECORD_LEN != 0 {
            return Err(BinlexError::invalid_format(
                "lemmas",
                "section length is not a whole number of records",
            ));
        }
        let lemma_count = (lemma_span / LEMMA_RECORD_LEN) as u32;
        let alphabet = Alphabet::load(&image, header.alphabet)?;
        let subcats = Self::load_subcats(&image, header.subcats)?;
        Ok(Self {
            image,
            header,
            alphabet,
            subcats,
            lemma_count,
        })
    }

    /// Subcategory names: a count followed by offsets to length-prefixed
    /// strings. The count is bounded by the 5-bit index in lemma bindings.
    fn load_subcats(image: &ByteImage, offset: usize) -> Result<Vec<String>> {
        let count = image
            .u32le(offset)
            .ok_or_else(|| BinlexError::invalid_format("subcats", "count out of range"))?;
        if count > (1u32 << lemmas::SUBCAT_BITS) {
            return Err(BinlexError::invalid_format(
                "subcats",
                format!("{} subcategories, at most 32 are addressable", count),
            ));
        }
        let mut out = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let name_offset = image
                .u32le(offset + 4 + i * 4)
                .ok_or_else(|| BinlexError::invalid_format("subcats", "offset out of range"))?;
            let name = image
                .pstr(name_offset as usize)
                .ok_or_else(|| BinlexError::invalid_format("subcats", "name out of range"))?;
            out.push(latin::decode(name));
        }
        Ok(out)
    }

    /// Finds the mapping index of a surface form in the trie.
    pub(crate) fn find_mapping(&self, word: &[u8]) -> Option<u32> {
        FormIndex::new(&self.image, &self.alphabet, self.header.forms).find(word)
    }

    /// Decodes the packed record run starting at `mapping`.
    pub(crate) fn meanings_at(&self, mapping: u32) -> Vec<RawMeaning> {
        mapping::walk(&self.image, self.header.mappings, mapping)
    }

    /// The `(word_class, tag)` pair of meaning `ix`.
    pub(crate) fn meaning(&self, ix: u32) -> Option<(String, String)> {
        meanings::meaning(&self.image, self.header.meanings, ix)
    }

    /// Lemma record of the given table row.
    pub(crate) fn lemma(&self, row: u32) -> Option<LemmaRecord> {
        lemmas::lemma(&self.image, self.header.lemmas, self.lemma_count, row)
    }

    /// All inflected forms of the lemma in `row`, the lemma included.
    pub(crate) fn lemma_forms(&self, row: u32) -> Option<Vec<Vec<u8>>> {
        lemmas::lemma_forms(
            &self.image,
            self.header.lemmas,
            self.header.templates,
            self.lemma_count,
            row,
        )
    }

    /// Augmented attributes of ksnid record `ix`.
    pub(crate) fn ksnid_attrs(&self, ix: u32) -> Option<KsnidAttrs> {
        ksnid::attrs(&self.image, self.header.ksnid, ix)
    }

    /// Subcategory (domain) name for a 5-bit index.
    pub(crate) fn subcat(&self, ix: u32) -> Option<&str> {
        self.subcats.get(ix as usize).map(String::as_str)
    }

    /// Number of rows in the lemma table.
    pub(crate) fn lemma_count(&self) -> u32 {
        self.lemma_count
    }
}
