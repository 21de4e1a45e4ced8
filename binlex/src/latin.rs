//! Conversion between the public UTF-8 surface and the single-byte
//! encoding used inside the binary image.
//!
//! The image stores all strings in a Latin-1 superset restricted to the
//! BÍN alphabet. Conversion is lossless for any code point below 256;
//! words containing other code points cannot occur in the image and are
//! treated as unknown by the callers.

/// Encodes a UTF-8 string into Latin-1 bytes.
///
/// Returns `None` if the string contains a code point above U+00FF.
pub(crate) fn encode(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        let cp = ch as u32;
        if cp > 0xFF {
            return None;
        }
        out.push(cp as u8);
    }
    Some(out)
}

/// Decodes Latin-1 bytes into an owned UTF-8 string.
pub(crate) fn decode(b: &[u8]) -> String {
    b.iter().map(|&c| c as char).collect()
}

/// True if the first character is uppercase.
pub(crate) fn starts_upper(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}

/// Lowercases only the first character.
pub(crate) fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercases only the first character.
pub(crate) fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Applies the old-spelling substitution: `tzt` becomes `st`, then any
/// remaining `z` becomes `s`, left to right, non-overlapping.
pub(crate) fn replace_z(s: &str) -> String {
    s.replace("tzt", "st").replace('z', "s")
}
