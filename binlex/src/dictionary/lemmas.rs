//! The lemma table and the inflection-template sets.
//!
//! Lemma records are 16 bytes each:
//!
//! ```text
//! string_offset: u32    length-prefixed lemma string
//! binding:       u32    bit 31 = has template,
//!                       bits 5..25 = public lemma id, bits 0..5 = subcategory
//! template:      u32    offset into the templates section, when bit 31 is set
//! reserved:      u32
//! ```
//!
//! The templates section directly follows the lemma array, so the lemma
//! count falls out of the two section offsets.
//!
//! A template set is a front-coded list of the lemma's inflected forms,
//! decoded against the lemma string: each entry `[cut][len][bytes]` removes
//! `cut` bytes from the end of the previous word and appends `len` new
//! bytes; `0xFF` terminates the list. Identical sets are shared between
//! lemmas, which is what makes the section small.

use crate::dictionary::image::ByteImage;

pub(crate) const LEMMA_RECORD_LEN: usize = 16;
pub(crate) const SUBCAT_BITS: u32 = 5;
pub(crate) const SUBCAT_MASK: u32 = (1 << SUBCAT_BITS) - 1;
pub(crate) const LEMMA_ID_BITS: u32 = 20;
pub(crate) const LEMMA_ID_MASK: u32 = (1 << LEMMA_ID_BITS) - 1;

const HAS_TEMPLATE: u32 = 0x8000_0000;
const TEMPLATE_END: u8 = 0xFF;

/// One decoded lemma record. The string is still in the source encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LemmaRecord {
    pub lemma: Vec<u8>,
    pub lemma_id: u32,
    pub subcat_ix: u32,
    pub template: Option<u32>,
}

/// Reads lemma row `row`, bounds-checked against the row count.
pub(crate) fn lemma(
    image: &ByteImage,
    lemmas_offset: usize,
    lemma_count: u32,
    row: u32,
) -> Option<LemmaRecord> {
    if row >= lemma_count {
        return None;
    }
    let rec = lemmas_offset + row as usize * LEMMA_RECORD_LEN;
    let string_offset = image.u32le(rec)? as usize;
    let binding = image.u32le(rec + 4)?;
    let lemma = image.pstr(string_offset)?.to_vec();
    let template = if binding & HAS_TEMPLATE != 0 {
        Some(image.u32le(rec + 8)?)
    } else {
        None
    };
    Some(LemmaRecord {
        lemma,
        lemma_id: (binding >> SUBCAT_BITS) & LEMMA_ID_MASK,
        subcat_ix: binding & SUBCAT_MASK,
        template,
    })
}

/// All inflected forms of the lemma in row `row`, including the lemma
/// itself. Forms other than the lemma come from the template set; a lemma
/// without a template has itself as its only form.
pub(crate) fn lemma_forms(
    image: &ByteImage,
    lemmas_offset: usize,
    templates_offset: usize,
    lemma_count: u32,
    row: u32,
) -> Option<Vec<Vec<u8>>> {
    let rec = lemma(image, lemmas_offset, lemma_count, row)?;
    let mut forms = match rec.template {
        Some(rel) => decode_set(image, templates_offset + rel as usize, &rec.lemma)?,
        None => Vec::new(),
    };
    forms.push(rec.lemma);
    Some(forms)
}

/// Decodes one front-coded set at `offset`, against `base`.
fn decode_set(image: &ByteImage, offset: usize, base: &[u8]) -> Option<Vec<Vec<u8>>> {
    let mut out = Vec::new();
    let mut last = base.to_vec();
    let mut p = offset;
    loop {
        let cut = image.u8(p)?;
        if cut == TEMPLATE_END {
            return Some(out);
        }
        let cut = cut as usize;
        let len = image.u8(p + 1)? as usize;
        let tail = image.bytes(p + 2, len)?;
        if cut > last.len() {
            return None;
        }
        last.truncate(last.len() - cut);
        last.extend_from_slice(tail);
        out.push(last.clone());
        p += 2 + len;
    }
}
