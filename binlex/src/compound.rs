//! The compound-word analyser.
//!
//! Invoked when a direct lookup misses: the word is split into a known
//! prefix and a known suffix, and the suffix's dictionary entries are
//! re-templated onto the whole word. The prefix DAWG already contains
//! multi-segment prefixes, so a single split covers compounds of any
//! number of parts; scanning candidate splits by descending suffix length
//! realises the "fewest components, longest suffix" preference.

use std::path::Path;

use crate::dawg::Dawg;
use crate::errors::Result;

pub(crate) struct Compounder {
    prefixes: Dawg,
    suffixes: Dawg,
}

impl Compounder {
    pub(crate) fn from_paths(prefixes: &Path, suffixes: &Path) -> Result<Self> {
        Ok(Self {
            prefixes: Dawg::from_path(prefixes)?,
            suffixes: Dawg::from_path(suffixes)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(prefixes: Vec<u8>, suffixes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            prefixes: Dawg::from_bytes(prefixes)?,
            suffixes: Dawg::from_bytes(suffixes)?,
        })
    }

    /// Candidate split positions: every `i` where `word[..i]` is a valid
    /// prefix and `word[i..]` is a valid suffix, ordered by descending
    /// suffix length. The caller takes the first split whose suffix is
    /// actually in the form index.
    pub(crate) fn splits(&self, word: &[u8]) -> Vec<usize> {
        self.prefixes
            .prefix_boundaries(word)
            .into_iter()
            .filter(|&i| self.suffixes.contains(&word[i..]))
            .collect()
    }
}
