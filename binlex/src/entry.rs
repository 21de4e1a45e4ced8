//! Result records returned by lookups.
//!
//! Two views exist over the same underlying data: the basic six-field
//! [`BinEntry`] and the augmented fifteen-field [`KsnidEntry`] carrying the
//! additional KRISTINsnid attributes. All fields are owned copies; results
//! stay valid after the engine that produced them is dropped.

use std::fmt;

/// A basic dictionary entry: one meaning of one surface form.
///
/// `lemma_id` is the public identifier of the lemma; `0` marks a synthetic
/// entry produced by the compound analyser and never occurs in the image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinEntry {
    /// Canonical dictionary form (headword).
    pub lemma: String,
    /// Public lemma identifier; `0` for synthetic compounds.
    pub lemma_id: u32,
    /// Word class, such as `kk`, `kvk`, `hk`, `so`, `lo`.
    pub word_class: String,
    /// Semantic domain (subcategory), such as `alm` or `örn`.
    pub domain: String,
    /// The inflected surface form this entry describes.
    pub surface: String,
    /// Grammatical tag, such as `ÞGFETgr`.
    pub tag: String,
}

impl fmt::Display for BinEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}/{}/{}, {}, {})",
            self.lemma, self.word_class, self.domain, self.lemma_id, self.surface, self.tag
        )
    }
}

/// An augmented entry: [`BinEntry`] plus the KRISTINsnid attributes.
///
/// When a meaning has no explicit ksnid record, the attributes take their
/// defaults: `correctness` and `form_correctness` are `1`, `publication` is
/// `'K'`, and the remaining fields are empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KsnidEntry {
    pub lemma: String,
    pub lemma_id: u32,
    pub word_class: String,
    pub domain: String,
    pub surface: String,
    pub tag: String,
    /// Lemma-level correctness grade, 0–5.
    pub correctness: u8,
    /// Lemma-level language register.
    pub register: String,
    /// Grammatical notes.
    pub grammar_note: String,
    /// Cross reference to another lemma id, empty if none.
    pub cross_ref: String,
    /// `'K'` for kernel entries, `'V'` for other published entries.
    pub publication: char,
    /// Form-level correctness grade, 0–5.
    pub form_correctness: u8,
    /// Form-level language register.
    pub form_register: String,
    /// Form-level binding information.
    pub form_binding: String,
    /// Alternative lemma, empty if none.
    pub alt_lemma: String,
}

impl KsnidEntry {
    /// Narrows this entry to its basic six-field view.
    pub fn to_entry(&self) -> BinEntry {
        BinEntry {
            lemma: self.lemma.clone(),
            lemma_id: self.lemma_id,
            word_class: self.word_class.clone(),
            domain: self.domain.clone(),
            surface: self.surface.clone(),
            tag: self.tag.clone(),
        }
    }

    /// The deduplication key shared by all lookup results.
    pub(crate) fn dedup_key(&self) -> (String, String, String, String) {
        (
            self.surface.clone(),
            self.tag.clone(),
            self.lemma.clone(),
            self.word_class.clone(),
        )
    }
}

impl fmt::Display for KsnidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}/{}/{}, {}, {})",
            self.lemma, self.word_class, self.domain, self.lemma_id, self.surface, self.tag
        )
    }
}
