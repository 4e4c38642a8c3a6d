//! Finding blocks inside a larger document.
//!
//! Offsets are byte offsets into the document. The substring a locator
//! returns is exactly what [`crate::decrypt`] expects.

use std::ops::Range;

use crate::block::{BEGIN_MARKER, END_MARKER};

/// A marker-delimited block and its position in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRange<'a> {
    /// Offset of the first byte of the begin marker.
    pub begin: usize,
    /// Offset one past the last byte of the end marker.
    pub end: usize,
    pub block: &'a str,
}

/// All complete blocks in `text`, left to right.
///
/// A begin marker with no end marker after it ends the scan.
pub fn find_blocks(text: &str) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(BEGIN_MARKER) {
        let begin = pos + found;
        let body = begin + BEGIN_MARKER.len();
        let Some(found_end) = text[body..].find(END_MARKER) else {
            break;
        };

        let end = body + found_end + END_MARKER.len();
        blocks.push(begin..end);
        pos = end;
    }

    blocks
}

/// The block containing the cursor, or failing that the nearest one.
///
/// The cursor is `max(from, to)`. Bounds are inclusive when testing
/// containment; distance is measured to the nearer edge of a block, and the
/// earlier block wins a tie.
pub fn block_range(text: &str, from: usize, to: usize) -> Option<BlockRange<'_>> {
    let cursor = from.max(to);
    let blocks = find_blocks(text);

    let chosen = blocks
        .iter()
        .find(|b| b.start <= cursor && cursor <= b.end)
        .or_else(|| {
            blocks
                .iter()
                .min_by_key(|b| cursor.abs_diff(b.start).min(cursor.abs_diff(b.end)))
        })?;

    Some(BlockRange {
        begin: chosen.start,
        end: chosen.end,
        block: &text[chosen.clone()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(payload: &str) -> String {
        format!("{BEGIN_MARKER}\n{payload}\n{END_MARKER}")
    }

    #[test]
    fn finds_every_complete_block() {
        let doc = format!("a\n{}\nb\n{}\nc", block("one"), block("two"));
        let blocks = find_blocks(&doc);

        assert_eq!(blocks.len(), 2);
        assert_eq!(&doc[blocks[0].clone()], block("one"));
        assert_eq!(&doc[blocks[1].clone()], block("two"));
    }

    #[test]
    fn unterminated_block_stops_scan() {
        let doc = format!("{}\n{BEGIN_MARKER}\nnever closed", block("one"));
        assert_eq!(find_blocks(&doc).len(), 1);
        assert!(find_blocks(&format!("{BEGIN_MARKER} dangling")).is_empty());
    }

    #[test]
    fn cursor_inside_block_selects_it() {
        let doc = format!("intro\n{}\nmiddle\n{}\n", block("one"), block("two"));
        let second = find_blocks(&doc)[1].clone();

        let range = block_range(&doc, second.start + 3, second.start + 3).unwrap();
        assert_eq!(range.begin, second.start);
        assert_eq!(range.end, second.end);
        assert_eq!(range.block, block("two"));
    }

    #[test]
    fn edges_count_as_inside() {
        let doc = format!("xx{}yy", block("one"));
        let only = find_blocks(&doc)[0].clone();

        assert_eq!(block_range(&doc, only.start, only.start).unwrap().begin, only.start);
        assert_eq!(block_range(&doc, only.end, only.end).unwrap().end, only.end);
    }

    #[test]
    fn cursor_outside_selects_nearest() {
        let doc = format!("{}\n{}\n{}", block("one"), "-".repeat(40), block("two"));
        let blocks = find_blocks(&doc);

        let near_second = blocks[1].start - 2;
        let range = block_range(&doc, near_second, near_second).unwrap();
        assert_eq!(range.block, block("two"));

        let near_first = blocks[0].end + 2;
        let range = block_range(&doc, near_first, near_first).unwrap();
        assert_eq!(range.block, block("one"));
    }

    #[test]
    fn selection_uses_its_far_end() {
        let doc = format!("{}\n{}\n{}", block("one"), "-".repeat(40), block("two"));
        let blocks = find_blocks(&doc);

        let range = block_range(&doc, 0, blocks[1].start + 1).unwrap();
        assert_eq!(range.block, block("two"));
    }

    #[test]
    fn no_blocks_is_none() {
        assert_eq!(block_range("plain text", 0, 0), None);
        assert_eq!(block_range("", 0, 0), None);
    }
}
