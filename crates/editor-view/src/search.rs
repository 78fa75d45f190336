//! Search helpers for match highlighting.
//!
//! Searches run line by line over the buffer's line array and report matches as [`Range`]s in
//! UTF-16 coordinates, ready to be stored as inline decorations. It supports:
//!
//! - plain substring search (escaped and compiled into a regex)
//! - regex search
//! - optional case-insensitive and whole-word matching
//!
//! Matches never span a line break.

use regex::{Regex, RegexBuilder};

use crate::error::SearchError;
use crate::position::{Position, Range, clamp_u32, line_len_utf16};

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (alphanumeric and `_`).
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// Byte offset → UTF-16 column lookup for one line.
struct Utf16Index {
    /// `(byte_offset, utf16_column)` for every char boundary, including the line end.
    boundaries: Vec<(usize, u32)>,
}

impl Utf16Index {
    fn new(text: &str) -> Self {
        let mut boundaries = Vec::with_capacity(text.len() + 1);
        let mut column = 0u32;
        for (byte, ch) in text.char_indices() {
            boundaries.push((byte, column));
            column = column.saturating_add(clamp_u32(ch.len_utf16()));
        }
        boundaries.push((text.len(), column));
        Self { boundaries }
    }

    fn column(&self, byte: usize) -> u32 {
        match self
            .boundaries
            .binary_search_by_key(&byte, |(offset, _)| *offset)
        {
            Ok(idx) => self.boundaries[idx].1,
            // Regex matches always start and end on char boundaries.
            Err(idx) => self.boundaries[idx.saturating_sub(1)].1,
        }
    }
}

fn compile_search_regex(query: &str, options: SearchOptions) -> Result<Regex, SearchError> {
    let pattern = if options.regex {
        query.to_string()
    } else {
        regex::escape(query)
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(SearchError::InvalidRegex)
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Find all occurrences of `query` in `lines`.
///
/// - Returns an empty list if `query` is empty.
/// - Empty regex matches are skipped.
/// - Ranges are half-open and ordered by offset.
pub fn find_all<S: AsRef<str>>(
    lines: &[S],
    query: &str,
    options: SearchOptions,
) -> Result<Vec<Range>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let re = compile_search_regex(query, options)?;
    let mut matches = Vec::new();
    let mut line_start = 0u32;

    for (line_idx, line) in lines.iter().enumerate() {
        let text = line.as_ref();
        let line_no = clamp_u32(line_idx);
        let mut index: Option<Utf16Index> = None;

        for m in re.find_iter(text) {
            if m.start() == m.end() {
                continue;
            }
            if options.whole_word && !is_whole_word(text, m.start(), m.end()) {
                continue;
            }

            let index = index.get_or_insert_with(|| Utf16Index::new(text));
            let start = index.column(m.start());
            let end = index.column(m.end());
            matches.push(Range {
                start: Position {
                    line: line_no,
                    column: start,
                    offset: line_start.saturating_add(start),
                },
                end: Position {
                    line: line_no,
                    column: end,
                    offset: line_start.saturating_add(end),
                },
            });
        }

        line_start = line_start
            .saturating_add(line_len_utf16(text))
            .saturating_add(1);
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(ranges: &[Range]) -> Vec<(u32, u32, u32)> {
        ranges
            .iter()
            .map(|r| (r.start.line, r.start.column, r.end.column))
            .collect()
    }

    #[test]
    fn test_plain_search_is_escaped() {
        let lines = ["a.b a+b", "a.b"];
        let found = find_all(&lines, "a.b", SearchOptions::default()).unwrap();
        assert_eq!(spans(&found), vec![(0, 0, 3), (1, 0, 3)]);
        assert_eq!(found[1].start.offset, 8);
    }

    #[test]
    fn test_case_insensitive() {
        let lines = ["Foo foo FOO"];
        let options = SearchOptions {
            case_sensitive: false,
            ..SearchOptions::default()
        };
        assert_eq!(find_all(&lines, "foo", options).unwrap().len(), 3);
        assert_eq!(
            find_all(&lines, "foo", SearchOptions::default())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_whole_word() {
        let lines = ["cat concat cat_ cat"];
        let options = SearchOptions {
            whole_word: true,
            ..SearchOptions::default()
        };
        let found = find_all(&lines, "cat", options).unwrap();
        assert_eq!(spans(&found), vec![(0, 0, 3), (0, 16, 19)]);
    }

    #[test]
    fn test_regex_and_utf16_columns() {
        let lines = ["👋 x1 x22"];
        let options = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        let found = find_all(&lines, r"x\d+", options).unwrap();
        // The emoji takes two UTF-16 units.
        assert_eq!(spans(&found), vec![(0, 3, 5), (0, 6, 9)]);
    }

    #[test]
    fn test_invalid_regex() {
        let options = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        let err = find_all(&["x"], "(", options).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRegex(_)));
    }

    #[test]
    fn test_empty_query() {
        assert!(
            find_all(&["abc"], "", SearchOptions::default())
                .unwrap()
                .is_empty()
        );
    }
}
