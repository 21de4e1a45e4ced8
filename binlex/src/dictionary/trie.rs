//! The in-image radix trie over surface forms.
//!
//! Nodes are traversed directly in the mapped image; no part of the trie is
//! ever unpacked. The node header is a single 32-bit word:
//!
//! - bit 31: single-character node, the character is inlined in the header
//! - bit 30: childless node
//! - bits 23..30: for single-character nodes, alphabet index plus one
//! - bits 0..23: the value at end-of-word, `0x7FFFFF` for interior nodes
//!
//! A multi-character node stores its fragment as a zero-terminated byte
//! string after the header (and after the child pointer array, when there
//! is one). Children are ordered by the numeric value of their first
//! source-encoding byte, which makes a binary search over the child
//! pointers possible.

use crate::dictionary::alphabet::Alphabet;
use crate::dictionary::image::ByteImage;

const SINGLE_CHAR: u32 = 0x8000_0000;
const CHILDLESS: u32 = 0x4000_0000;
const VALUE_MASK: u32 = 0x007F_FFFF;

/// Outcome of matching one child node against the word suffix.
enum FragMatch {
    /// The node's full fragment matched; this many bytes were consumed.
    Consumed(usize),
    /// The node orders before the word suffix.
    Less,
    /// The node orders after the word suffix (or is longer than it).
    Greater,
}

pub(crate) struct FormIndex<'a> {
    image: &'a ByteImage,
    alphabet: &'a Alphabet,
    root_offset: usize,
}

impl<'a> FormIndex<'a> {
    pub(crate) fn new(image: &'a ByteImage, alphabet: &'a Alphabet, root_offset: usize) -> Self {
        Self {
            image,
            alphabet,
            root_offset,
        }
    }

    /// Looks up a surface form, returning the value stored at its leaf:
    /// an index into the mappings section. `None` when the form is not in
    /// the trie or the trie data is unreadable.
    pub(crate) fn find(&self, word: &[u8]) -> Option<u32> {
        let mut node_offset = self.root_offset;
        let mut hdr = self.image.u32le(node_offset)?;
        let mut word_ix = 0usize;
        loop {
            if word_ix >= word.len() {
                // Arrived; interior nodes carry the sentinel.
                let value = hdr & VALUE_MASK;
                return if value == VALUE_MASK { None } else { Some(value) };
            }
            if hdr & CHILDLESS != 0 {
                return None;
            }
            let num_children = self.image.u32le(node_offset + 4)? as usize;
            let child_base = node_offset + 8;
            let mut lo = 0usize;
            let mut hi = num_children;
            let mut descended = false;
            while lo < hi {
                let mid = (lo + hi) / 2;
                let mid_offset = self.image.u32le(child_base + mid * 4)? as usize;
                let mid_hdr = self.image.u32le(mid_offset)?;
                match self.matches(mid_offset, mid_hdr, word, word_ix)? {
                    FragMatch::Consumed(n) => {
                        node_offset = mid_offset;
                        hdr = mid_hdr;
                        word_ix += n;
                        descended = true;
                        break;
                    }
                    FragMatch::Less => lo = mid + 1,
                    FragMatch::Greater => hi = mid,
                }
            }
            if !descended {
                return None;
            }
        }
    }

    /// Matches the fragment of the node at `node_offset` against
    /// `word[word_ix..]`. Ordering is by source-encoding byte value.
    fn matches(
        &self,
        node_offset: usize,
        hdr: u32,
        word: &[u8],
        word_ix: usize,
    ) -> Option<FragMatch> {
        if hdr & SINGLE_CHAR != 0 {
            let index = ((hdr >> 23) & 0x7F) as usize;
            if index == 0 {
                // Empty fragment, only valid on the root; never a match.
                return Some(FragMatch::Greater);
            }
            let ch = self.alphabet.letter(index - 1)?;
            let word_ch = word[word_ix];
            return Some(if ch == word_ch {
                FragMatch::Consumed(1)
            } else if ch > word_ch {
                FragMatch::Greater
            } else {
                FragMatch::Less
            });
        }
        let frag_offset = if hdr & CHILDLESS != 0 {
            node_offset + 4
        } else {
            let num_children = self.image.u32le(node_offset + 4)? as usize;
            node_offset + 8 + 4 * num_children
        };
        let frag = self.image.cstr(frag_offset)?;
        let mut matched = 0usize;
        while matched < frag.len()
            && word_ix + matched < word.len()
            && frag[matched] == word[word_ix + matched]
        {
            matched += 1;
        }
        if matched == frag.len() {
            // The whole fragment matched the word.
            return Some(if matched > 0 {
                FragMatch::Consumed(matched)
            } else {
                FragMatch::Greater
            });
        }
        if word_ix + matched >= word.len() {
            // The fragment is longer than the remaining word.
            return Some(FragMatch::Greater);
        }
        Some(if frag[matched] > word[word_ix + matched] {
            FragMatch::Greater
        } else {
            FragMatch::Less
        })
    }
}
