//! The inflection-variant engine.
//!
//! Starting from one inflected seed form, the engine resolves the lemma,
//! enumerates every form of that lemma through its inflection template,
//! and keeps the forms whose tags match the requested features.

use hashbrown::HashSet;

use crate::entry::KsnidEntry;
use crate::latin;
use crate::lookup::{Bin, GENDERS};

/// The requirement token that excludes forms with the attached article.
const NO_ARTICLE: &str = "nogr";

impl Bin {
    /// Enumerates alternative inflections of `word`.
    ///
    /// Candidates are resolved with [`lookup_ksnid`](Self::lookup_ksnid),
    /// so the full normalisation and fallback chain applies to the seed.
    /// `cat` constrains the word class of the seed; `"no"` matches a noun
    /// of any gender. Each element of `requirements` must occur as a
    /// substring of the candidate tag, except the token `"nogr"`, which
    /// instead rejects tags containing `"gr"`. `lemma` and `lemma_id`
    /// narrow the seed further, and `tag_filter` is applied to every
    /// candidate tag last.
    ///
    /// Synthetic candidates carrying the reserved lemma id 0 (compound
    /// and `-legur` entries) have no lemma row to enumerate and yield
    /// nothing; `ó`-negated candidates enumerate the bare lemma's forms
    /// with the prefix re-attached.
    ///
    /// Results are deduplicated on `(surface, tag)` and keep the order in
    /// which the forms are enumerated.
    pub fn lookup_variants(
        &self,
        word: &str,
        cat: &str,
        requirements: &[&str],
        lemma: Option<&str>,
        lemma_id: Option<u32>,
        tag_filter: Option<&dyn Fn(&str) -> bool>,
    ) -> Vec<KsnidEntry> {
        let (_, candidates) = self.lookup_ksnid(word, false, false);
        let cats: &[&str] = if cat == "no" {
            &GENDERS
        } else {
            std::slice::from_ref(&cat)
        };
        let needs_no_article = requirements.iter().any(|r| *r == NO_ARTICLE);
        let required: Vec<&str> = requirements
            .iter()
            .copied()
            .filter(|r| *r != NO_ARTICLE)
            .collect();

        let mut out = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut seeded: HashSet<(u32, String, String)> = HashSet::new();
        for cand in candidates {
            if !cats.contains(&cand.word_class.as_str()) {
                continue;
            }
            if lemma.is_some_and(|l| cand.lemma != l) {
                continue;
            }
            if lemma_id.is_some_and(|id| cand.lemma_id != id) {
                continue;
            }
            if cand.lemma_id == 0 {
                // Synthetic compound or -legur entry: no lemma row exists.
                continue;
            }
            if !seeded.insert((cand.lemma_id, cand.lemma.clone(), cand.word_class.clone())) {
                continue;
            }
            let Some((row, prefix)) = self.resolve_row(&cand) else {
                continue;
            };
            let Some(forms) = self.dictionary().lemma_forms(row) else {
                continue;
            };
            for form in forms {
                let bare = latin::decode(&form);
                for t in self.raw_lookup(&form) {
                    if t.lemma_row != row {
                        continue;
                    }
                    let Some((class, tag)) = self.dictionary().meaning(t.meaning_ix) else {
                        continue;
                    };
                    if class != cand.word_class {
                        continue;
                    }
                    if !required.iter().all(|r| tag.contains(r)) {
                        continue;
                    }
                    if needs_no_article && tag.contains("gr") {
                        continue;
                    }
                    if let Some(f) = tag_filter {
                        if !f(&tag) {
                            continue;
                        }
                    }
                    let surface = format!("{}{}", prefix, bare);
                    if !seen.insert((surface.clone(), tag.clone())) {
                        continue;
                    }
                    if let Some(mut e) = self.ksnid_from_raw(&surface, t) {
                        if !prefix.is_empty() {
                            e.lemma = format!("{}{}", prefix, e.lemma);
                        }
                        out.push(e);
                    }
                }
            }
        }
        out
    }

    /// The lemma table row behind a candidate entry, together with the
    /// prefix the front end attached to the row's lemma: empty for direct
    /// candidates, `"ó"` for negation-synthesised ones.
    fn resolve_row(&self, cand: &KsnidEntry) -> Option<(u32, &'static str)> {
        if let Some(row) = self.row_of(&cand.lemma, cand.lemma_id) {
            return Some((row, ""));
        }
        let tail = cand.lemma.strip_prefix('ó')?;
        let row = self.row_of(tail, cand.lemma_id)?;
        Some((row, "ó"))
    }

    /// Finds the table row whose lemma string and public id both match,
    /// by re-entering the form index with the lemma as surface.
    fn row_of(&self, lemma: &str, lemma_id: u32) -> Option<u32> {
        let latin_lemma = latin::encode(lemma)?;
        self.raw_lookup(&latin_lemma).into_iter().find_map(|t| {
            let rec = self.dictionary().lemma(t.lemma_row)?;
            (rec.lemma_id == lemma_id && rec.lemma == latin_lemma).then_some(t.lemma_row)
        })
    }
}
