//! The lookup front end.
//!
//! [`Bin`] owns the mapped image and the two compound DAWGs, applies input
//! normalisation, orchestrates the fallback chain for unknown words, and
//! deduplicates results. It is the type embedding applications interact
//! with.
//!
//! # Example
//!
//! ```no_run
//! use binlex::{Bin, BinConfig};
//!
//! let bin = Bin::new(BinConfig::new(
//!     "resources/compressed.bin",
//!     "resources/prefixes.dawg.bin",
//!     "resources/suffixes.dawg.bin",
//! ))?;
//! let (key, entries) = bin.lookup("færi", false, false);
//! for e in &entries {
//!     println!("{} {} {}", e.lemma, e.word_class, e.tag);
//! }
//! # Ok::<(), binlex::BinlexError>(())
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use hashbrown::HashSet;

use crate::cache::LookupCache;
use crate::compound::Compounder;
use crate::dictionary::mapping::RawMeaning;
use crate::dictionary::Dictionary;
use crate::entry::{BinEntry, KsnidEntry};
use crate::errors::Result;
use crate::latin;

/// Capacity of the surface-form to mapping-index cache.
const FORM_CACHE_CAPACITY: usize = 1000;
/// Capacity of the word to compound-split cache.
const SPLIT_CACHE_CAPACITY: usize = 500;

/// Word classes counted as nouns by the `"no"` category wildcard.
pub(crate) const GENDERS: [&str; 3] = ["kk", "kvk", "hk"];

/// Adjective endings recognised by the `-legur` heuristic, with the tag of
/// the form each ending produces.
const ADJECTIVE_ENDINGS: &[(&str, &str)] = &[
    ("legur", "FSB-KK-NFET"),
    ("legan", "FSB-KK-ÞFET"),
    ("legum", "FSB-KK-ÞGFET"),
    ("legs", "FSB-KK-EFET"),
    ("legir", "FSB-KK-NFFT"),
    ("leg", "FSB-KVK-NFET"),
    ("legri", "FSB-KVK-ÞGFET"),
    ("legrar", "FSB-KVK-EFET"),
    ("legra", "FSB-KK-EFFT"),
    ("legar", "FSB-KVK-NFFT"),
    ("legt", "FSB-HK-NFET"),
    ("lega", "FSB-HK-NFFT"),
    ("legu", "FVB-HK-NFET"),
];

/// Option flags of the front end. The defaults match the distribution.
#[derive(Debug, Clone, Copy)]
pub struct BinOptions {
    /// Synthesise `ó`-negated adjectives for unknown words.
    pub add_negation: bool,
    /// Synthesise `-legur` adjectives for unknown words.
    pub add_legur: bool,
    /// Fall back to the compound analyser for unknown words.
    pub add_compounds: bool,
    /// Apply the old-spelling substitution `tzt`→`st`, `z`→`s`.
    pub replace_z: bool,
    /// Disable every augmentation above, returning image contents only.
    pub only_bin: bool,
}

impl Default for BinOptions {
    fn default() -> Self {
        Self {
            add_negation: true,
            add_legur: true,
            add_compounds: true,
            replace_z: true,
            only_bin: false,
        }
    }
}

/// Locations of the three mapped files, plus the option flags.
///
/// There is no process-wide default; every engine is constructed from an
/// explicit configuration.
#[derive(Debug, Clone)]
pub struct BinConfig {
    /// The main dictionary image.
    pub image: PathBuf,
    /// The DAWG of forms allowed as compound prefixes.
    pub prefixes: PathBuf,
    /// The DAWG of forms allowed as compound suffixes.
    pub suffixes: PathBuf,
    pub options: BinOptions,
}

impl BinConfig {
    pub fn new<P: Into<PathBuf>>(image: P, prefixes: P, suffixes: P) -> Self {
        Self {
            image: image.into(),
            prefixes: prefixes.into(),
            suffixes: suffixes.into(),
            options: BinOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BinOptions) -> Self {
        self.options = options;
        self
    }
}

/// The BÍN lookup engine.
///
/// All query methods take `&self`; the engine is `Send + Sync` and may be
/// shared between threads. The only mutable state is a pair of bounded
/// caches behind short mutexes. Returned entries are owned copies and
/// outlive the engine.
pub struct Bin {
    dict: Dictionary,
    compounder: Option<Compounder>,
    add_negation: bool,
    add_legur: bool,
    replace_z: bool,
    form_cache: LookupCache<Vec<u8>, Option<u32>>,
    split_cache: LookupCache<Vec<u8>, Option<usize>>,
}

impl Bin {
    /// Opens the engine over the files named in `config`.
    ///
    /// A missing or unreadable dictionary image is fatal. Missing DAWG
    /// files merely disable the compound fallback; direct lookups keep
    /// working.
    pub fn new(config: BinConfig) -> Result<Self> {
        let dict = Dictionary::from_path(&config.image)?;
        let opts = config.options;
        let only_bin = opts.only_bin;
        let compounder = if opts.add_compounds && !only_bin {
            match Compounder::from_paths(&config.prefixes, &config.suffixes) {
                Ok(c) => Some(c),
                Err(e) => {
                    log::warn!("compound analysis disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Ok(Self::assemble(dict, compounder, opts))
    }

    pub(crate) fn assemble(
        dict: Dictionary,
        compounder: Option<Compounder>,
        opts: BinOptions,
    ) -> Self {
        let compounder = if opts.add_compounds && !opts.only_bin {
            compounder
        } else {
            None
        };
        Self {
            dict,
            compounder,
            add_negation: opts.add_negation && !opts.only_bin,
            add_legur: opts.add_legur && !opts.only_bin,
            replace_z: opts.replace_z && !opts.only_bin,
            form_cache: LookupCache::new(FORM_CACHE_CAPACITY),
            split_cache: LookupCache::new(SPLIT_CACHE_CAPACITY),
        }
    }

    pub(crate) fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// True if the surface form is in the image, with no fallbacks.
    pub fn contains(&self, word: &str) -> bool {
        latin::encode(word).is_some_and(|latin| self.cached_mapping(&latin).is_some())
    }

    /// Looks up all meanings of a surface form.
    ///
    /// Returns the search key actually used (after normalisation) and the
    /// deduplicated entries in image order. An unknown or empty word
    /// yields an empty list, never an error.
    pub fn lookup(
        &self,
        word: &str,
        at_sentence_start: bool,
        auto_uppercase: bool,
    ) -> (String, Vec<BinEntry>) {
        let (key, entries) = self.lookup_impl(word, at_sentence_start, auto_uppercase);
        (key, entries.iter().map(KsnidEntry::to_entry).collect())
    }

    /// Like [`lookup`](Self::lookup), but returns augmented entries.
    pub fn lookup_ksnid(
        &self,
        word: &str,
        at_sentence_start: bool,
        auto_uppercase: bool,
    ) -> (String, Vec<KsnidEntry>) {
        self.lookup_impl(word, at_sentence_start, auto_uppercase)
    }

    /// The set of word classes the word can belong to.
    pub fn lookup_cats(&self, word: &str, at_sentence_start: bool) -> BTreeSet<String> {
        let (_, entries) = self.lookup_impl(word, at_sentence_start, false);
        entries.into_iter().map(|e| e.word_class).collect()
    }

    /// The set of `(lemma, word_class)` pairs the word can belong to.
    pub fn lookup_lemmas_and_cats(
        &self,
        word: &str,
        at_sentence_start: bool,
    ) -> BTreeSet<(String, String)> {
        let (_, entries) = self.lookup_impl(word, at_sentence_start, false);
        entries.into_iter().map(|e| (e.lemma, e.word_class)).collect()
    }

    /// Entries for which the given word is itself the headword.
    pub fn lookup_lemmas(&self, lemma: &str) -> (String, Vec<BinEntry>) {
        let (key, entries) = self.lookup(lemma, false, false);
        let headwords = entries.into_iter().filter(|e| e.lemma == key).collect();
        (key, headwords)
    }

    /// All entries of the lemma with the given public id.
    ///
    /// The lemma table is scanned linearly; the matching lemma string is
    /// then re-entered through the form index and the results filtered by
    /// id. `0` is the synthetic-compound id and matches nothing.
    pub fn lookup_id(&self, lemma_id: u32) -> Vec<KsnidEntry> {
        if lemma_id == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        for row in 0..self.dict.lemma_count() {
            let Some(rec) = self.dict.lemma(row) else {
                continue;
            };
            if rec.lemma_id != lemma_id {
                continue;
            }
            let surface = latin::decode(&rec.lemma);
            for t in self.raw_lookup(&rec.lemma) {
                if let Some(e) = self.ksnid_from_raw(&surface, t) {
                    if e.lemma_id == lemma_id {
                        out.push(e);
                    }
                }
            }
        }
        dedup(out)
    }

    fn lookup_impl(
        &self,
        word: &str,
        at_sentence_start: bool,
        auto_uppercase: bool,
    ) -> (String, Vec<KsnidEntry>) {
        if word.is_empty() {
            return (String::new(), Vec::new());
        }
        let mut key = if self.replace_z {
            latin::replace_z(word)
        } else {
            word.to_string()
        };
        let mut entries = self.direct_entries(&key);

        if entries.is_empty() && at_sentence_start && latin::starts_upper(&key) {
            // At a sentence start an uppercase first letter carries no
            // information; retry with it lowered.
            let lowered = latin::lower_first(&key);
            entries = self.direct_entries(&lowered);
            if !entries.is_empty() {
                key = lowered;
            }
        }

        if entries.is_empty() && self.add_legur {
            entries = self.legur_entries(&key);
        }

        if entries.is_empty() {
            if let Some(compounder) = &self.compounder {
                entries = self.compound_entries(compounder, &key);
            }
        }

        if entries.is_empty() && self.add_negation {
            entries = self.negation_entries(&key);
        }

        let entries = dedup(entries);
        if auto_uppercase && entries.iter().any(|e| latin::starts_upper(&e.surface)) {
            key = latin::upper_first(&key);
        }
        (key, entries)
    }

    /// Trie lookup through the bounded form cache. The lock is dropped
    /// before the trie is traversed.
    fn cached_mapping(&self, latin: &[u8]) -> Option<u32> {
        let key = latin.to_vec();
        if let Some(cached) = self.form_cache.get(&key) {
            return cached;
        }
        let mapping = self.dict.find_mapping(latin);
        self.form_cache.put(key, mapping);
        mapping
    }

    pub(crate) fn raw_lookup(&self, latin: &[u8]) -> Vec<RawMeaning> {
        match self.cached_mapping(latin) {
            Some(mapping) => self.dict.meanings_at(mapping),
            None => Vec::new(),
        }
    }

    /// Builds the augmented entry for one decoded record. `None` when any
    /// referenced table row is unreadable; the record is then dropped.
    pub(crate) fn ksnid_from_raw(&self, surface: &str, t: RawMeaning) -> Option<KsnidEntry> {
        let (word_class, tag) = self.dict.meaning(t.meaning_ix)?;
        let rec = self.dict.lemma(t.lemma_row)?;
        let domain = self.dict.subcat(rec.subcat_ix)?.to_string();
        let attrs = self.dict.ksnid_attrs(t.ksnid_ix)?;
        Some(KsnidEntry {
            lemma: latin::decode(&rec.lemma),
            lemma_id: rec.lemma_id,
            word_class,
            domain,
            surface: surface.to_string(),
            tag,
            correctness: attrs.correctness,
            register: attrs.register,
            grammar_note: attrs.grammar_note,
            cross_ref: attrs.cross_ref,
            publication: attrs.publication,
            form_correctness: attrs.form_correctness,
            form_register: attrs.form_register,
            form_binding: attrs.form_binding,
            alt_lemma: attrs.alt_lemma,
        })
    }

    fn direct_entries(&self, word: &str) -> Vec<KsnidEntry> {
        let Some(latin) = latin::encode(word) else {
            return Vec::new();
        };
        self.raw_lookup(&latin)
            .into_iter()
            .filter_map(|t| self.ksnid_from_raw(word, t))
            .collect()
    }

    /// Adjectives in `-legur` follow a fully productive declension, so an
    /// unknown word with a matching ending gets a synthesised adjective
    /// entry, and `-lega` additionally an adverb reading.
    fn legur_entries(&self, key: &str) -> Vec<KsnidEntry> {
        let lower = key.to_lowercase();
        if !lower.contains("leg") {
            return Vec::new();
        }
        let mut out = Vec::new();
        for &(ending, tag) in ADJECTIVE_ENDINGS {
            if lower.ends_with(ending) && lower.len() > ending.len() {
                let stem = &lower[..lower.len() - ending.len()];
                out.push(synthetic_entry(
                    format!("{}legur", stem),
                    "lo",
                    lower.clone(),
                    tag,
                ));
            }
        }
        if lower.ends_with("lega") && lower.len() > 4 {
            out.push(synthetic_entry(
                lower.clone(),
                "ao",
                lower.clone(),
                "OBEYGJANLEGT",
            ));
        }
        out
    }

    /// The compound fallback: split into known prefix and suffix, then
    /// re-derive every entry of the suffix onto the whole word.
    fn compound_entries(&self, compounder: &Compounder, key: &str) -> Vec<KsnidEntry> {
        let Some(latin_word) = latin::encode(key) else {
            return Vec::new();
        };
        let split = match self.split_cache.get(&latin_word) {
            Some(cached) => cached,
            None => {
                let found = compounder
                    .splits(&latin_word)
                    .into_iter()
                    .find(|&i| !self.raw_lookup(&latin_word[i..]).is_empty());
                self.split_cache.put(latin_word.clone(), found);
                found
            }
        };
        let Some(i) = split else {
            return Vec::new();
        };
        let prefix = latin::decode(&latin_word[..i]);
        let suffix = latin::decode(&latin_word[i..]);
        self.raw_lookup(&latin_word[i..])
            .into_iter()
            .filter_map(|t| self.ksnid_from_raw(&suffix, t))
            .map(|e| KsnidEntry {
                lemma: format!("{}-{}", prefix, e.lemma),
                lemma_id: 0,
                surface: format!("{}-{}", prefix, e.surface),
                ..e
            })
            .collect()
    }

    /// The `ó`-negation fallback: adjectives found for the word without
    /// its `ó`-prefix are re-emitted with the prefix restored.
    fn negation_entries(&self, key: &str) -> Vec<KsnidEntry> {
        let lower = key.to_lowercase();
        let Some(tail) = lower.strip_prefix('ó') else {
            return Vec::new();
        };
        if tail.is_empty() {
            return Vec::new();
        }
        self.direct_entries(tail)
            .into_iter()
            .filter(|e| e.word_class == "lo")
            .map(|e| KsnidEntry {
                lemma: format!("ó{}", e.lemma),
                surface: format!("ó{}", e.surface),
                ..e
            })
            .collect()
    }
}

/// Synthetic entries carry the reserved lemma id 0 and default attributes.
fn synthetic_entry(lemma: String, word_class: &str, surface: String, tag: &str) -> KsnidEntry {
    let attrs = crate::dictionary::ksnid::KsnidAttrs::default();
    KsnidEntry {
        lemma,
        lemma_id: 0,
        word_class: word_class.to_string(),
        domain: "alm".to_string(),
        surface,
        tag: tag.to_string(),
        correctness: attrs.correctness,
        register: attrs.register,
        grammar_note: attrs.grammar_note,
        cross_ref: attrs.cross_ref,
        publication: attrs.publication,
        form_correctness: attrs.form_correctness,
        form_register: attrs.form_register,
        form_binding: attrs.form_binding,
        alt_lemma: attrs.alt_lemma,
    }
}

/// Order-preserving deduplication on `(surface, tag, lemma, word_class)`.
pub(crate) fn dedup(entries: Vec<KsnidEntry>) -> Vec<KsnidEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.dedup_key()))
        .collect()
}
