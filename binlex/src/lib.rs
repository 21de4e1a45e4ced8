//! # Binlex
//!
//! A read-only, memory-resident lookup engine for the Database of
//! Icelandic Morphology (DIM/BÍN).
//!
//! The dictionary ships as a compact binary image that is mapped straight
//! into the process address space; lookups walk a radix trie and a handful
//! of packed tables inside the mapping without unpacking anything up
//! front. Two auxiliary word graphs drive a compound-word analyser that
//! resolves words absent from the dictionary into prefix and suffix, and a
//! variant engine enumerates alternative inflections of a known form.
//!
//! ## Usage
//!
//! ```no_run
//! use binlex::{Bin, BinConfig};
//!
//! let bin = Bin::new(BinConfig::new(
//!     "resources/compressed.bin",
//!     "resources/prefixes.dawg.bin",
//!     "resources/suffixes.dawg.bin",
//! ))?;
//!
//! // All meanings of an inflected form.
//! let (key, entries) = bin.lookup("færi", false, false);
//! assert_eq!(key, "færi");
//! for e in &entries {
//!     println!("{} ({}): {}", e.lemma, e.word_class, e.tag);
//! }
//!
//! // The dative of a street name.
//! let variants = bin.lookup_variants("Laugavegur", "kk", &["ÞGF"], None, None, None);
//! assert!(variants.iter().any(|v| v.surface == "Laugavegi"));
//! # Ok::<(), binlex::BinlexError>(())
//! ```
//!
//! The engine is `Send + Sync`: the image is immutable after load and the
//! internal caches take a short lock per access, so one instance can serve
//! any number of threads.

/// Bounded LRU caches used by the front end.
mod cache;

/// The compound-word analyser.
mod compound;

/// Memory-mapped DAWG reader.
mod dawg;

/// The dictionary image and its packed sections.
pub mod dictionary;

/// Result record types.
pub mod entry;

/// Error types.
pub mod errors;

/// UTF-8 to Latin-1 conversion helpers.
mod latin;

/// The lookup front end.
mod lookup;

/// The inflection-variant engine.
mod variants;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use dictionary::Dictionary;
pub use entry::{BinEntry, KsnidEntry};
pub use errors::{BinlexError, Result};
pub use lookup::{Bin, BinConfig, BinOptions};

/// The version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
