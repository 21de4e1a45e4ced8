//! The ksnid table: augmented KRISTINsnid attributes per ksnid index.
//!
//! Each record is a length-prefixed ASCII string of nine `;`-separated
//! fields. Index 0 is reserved for the default attribute set and is decoded
//! without touching the table.

use crate::dictionary::image::ByteImage;
use crate::latin;

/// The decoded attribute set of one ksnid record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KsnidAttrs {
    pub correctness: u8,
    pub register: String,
    pub grammar_note: String,
    pub cross_ref: String,
    pub publication: char,
    pub form_correctness: u8,
    pub form_register: String,
    pub form_binding: String,
    pub alt_lemma: String,
}

impl Default for KsnidAttrs {
    fn default() -> Self {
        Self {
            correctness: 1,
            register: String::new(),
            grammar_note: String::new(),
            cross_ref: String::new(),
            publication: 'K',
            form_correctness: 1,
            form_register: String::new(),
            form_binding: String::new(),
            alt_lemma: String::new(),
        }
    }
}

impl KsnidAttrs {
    /// Parses the nine `;`-separated fields. `None` if the field count or
    /// a numeric field is off, in which case the whole record is treated
    /// as corrupt.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let mut fields = s.split(';');
        let correctness = fields.next()?.parse().ok()?;
        let register = fields.next()?.to_string();
        let grammar_note = fields.next()?.to_string();
        let cross_ref = fields.next()?.to_string();
        let publication = fields.next()?.chars().next().unwrap_or('K');
        let form_correctness = fields.next()?.parse().ok()?;
        let form_register = fields.next()?.to_string();
        let form_binding = fields.next()?.to_string();
        let alt_lemma = fields.next()?.to_string();
        if fields.next().is_some() {
            return None;
        }
        Some(Self {
            correctness,
            register,
            grammar_note,
            cross_ref,
            publication,
            form_correctness,
            form_register,
            form_binding,
            alt_lemma,
        })
    }
}

/// Decodes ksnid record `ix`; index 0 short-circuits to the defaults.
pub(crate) fn attrs(image: &ByteImage, ksnid_offset: usize, ix: u32) -> Option<KsnidAttrs> {
    if ix == 0 {
        return Some(KsnidAttrs::default());
    }
    let record_offset = image.u32le(ksnid_offset + ix as usize * 4)? as usize;
    let record = image.pstr(record_offset)?;
    KsnidAttrs::parse(&latin::decode(record))
}
