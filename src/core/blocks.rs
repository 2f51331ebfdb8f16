//! Tag block extraction.
//!
//! Splits a text blob on an open/close delimiter pair. Every match yields the
//! text between the delimiters and the text trailing the close delimiter up to
//! the next open delimiter. The same primitive segments a dump into pages, a
//! page into sections, and a section into links.

/// One matched delimiter pair, both halves trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Text strictly between the open and close delimiters.
    pub inner: &'a str,
    /// Text after the close delimiter, up to the next open delimiter or end of input.
    pub trailing: &'a str,
}

/// Lazy iterator over the blocks of `text` delimited by `open`/`close`.
///
/// Matching is leftmost-first, non-overlapping and non-nested. An open
/// delimiter without a following close delimiter ends the iteration; the
/// dangling text is dropped without an error. The iterator is `Clone`, so a
/// caller can restart a scan from any point it has reached.
#[derive(Debug, Clone)]
pub struct TagBlocks<'a> {
    text: &'a str,
    open: &'a str,
    close: &'a str,
    cursor: usize,
    done: bool,
}

/// Scans `text` for blocks delimited by `open` and `close`.
pub fn tag_blocks<'a>(text: &'a str, open: &'a str, close: &'a str) -> TagBlocks<'a> {
    TagBlocks {
        text,
        open,
        close,
        cursor: 0,
        // Empty delimiters would match everywhere without advancing.
        done: open.is_empty() || close.is_empty(),
    }
}

impl<'a> Iterator for TagBlocks<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(start) = find_from(self.text, self.open, self.cursor) else {
            self.done = true;
            return None;
        };
        let inner_start = start + self.open.len();

        let Some(end) = find_from(self.text, self.close, inner_start) else {
            self.done = true;
            return None;
        };
        let after = end + self.close.len();

        let trailing_end = find_from(self.text, self.open, after).unwrap_or(self.text.len());
        self.cursor = after;

        Some(Block {
            inner: self.text[inner_start..end].trim(),
            trailing: self.text[after..trailing_end].trim(),
        })
    }
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack
        .get(from..)
        .and_then(|rest| rest.find(needle))
        .map(|idx| idx + from)
}
