//! The meanings table: word class and grammatical tag per meaning index.

use crate::dictionary::image::ByteImage;
use crate::latin;

/// Width of a meaning record in the image. Records are space-padded ASCII,
/// `<class> <tag>`, and shorter than this in practice.
const MEANING_RECORD_LEN: usize = 24;

/// Decodes meaning `ix`: the `(word_class, tag)` pair.
pub(crate) fn meaning(
    image: &ByteImage,
    meanings_offset: usize,
    ix: u32,
) -> Option<(String, String)> {
    let record_offset = image.u32le(meanings_offset + ix as usize * 4)? as usize;
    let record = image.bytes(record_offset, MEANING_RECORD_LEN)?;
    let space = record.iter().position(|&b| b == b' ')?;
    let class = &record[..space];
    let tail = &record[space + 1..];
    let tag_end = tail
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |p| p + 1);
    let tag = &tail[..tag_end];
    if class.is_empty() || tag.is_empty() {
        return None;
    }
    Some((latin::decode(class), latin::decode(tag)))
}
