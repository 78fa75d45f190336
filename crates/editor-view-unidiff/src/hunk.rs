//! Hunk header parsing.

use crate::error::UnidiffError;

/// Numbers of a `@@ -old_start,old_len +new_start,new_len @@ section` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HunkHeader {
    /// First base line covered by the hunk (1-based; 0 for an empty range).
    pub old_start: u32,
    /// Number of base lines in the hunk.
    pub old_len: u32,
    /// First current line covered by the hunk (1-based; 0 for an empty range).
    pub new_start: u32,
    /// Number of current lines in the hunk.
    pub new_len: u32,
    /// Trailing section heading (usually the enclosing function), if any.
    pub section: Option<String>,
}

/// Strictly parse a hunk header. A missing length means `1`, as in `@@ -3 +3 @@`.
pub fn parse_hunk_header(line: &str) -> Result<HunkHeader, UnidiffError> {
    let not_header = || UnidiffError::NotAHunkHeader(line.to_string());

    let rest = line.strip_prefix("@@ ").ok_or_else(not_header)?;
    let (ranges, section) = rest.split_once("@@").ok_or_else(not_header)?;

    let mut parts = ranges.split_whitespace();
    let old = parts
        .next()
        .and_then(|part| part.strip_prefix('-'))
        .ok_or_else(|| UnidiffError::MissingRange {
            side: "old",
            line: line.to_string(),
        })?;
    let new = parts
        .next()
        .and_then(|part| part.strip_prefix('+'))
        .ok_or_else(|| UnidiffError::MissingRange {
            side: "new",
            line: line.to_string(),
        })?;
    if parts.next().is_some() {
        return Err(not_header());
    }

    let (old_start, old_len) = parse_range(old)?;
    let (new_start, new_len) = parse_range(new)?;
    let section = section.trim();

    Ok(HunkHeader {
        old_start,
        old_len,
        new_start,
        new_len,
        section: (!section.is_empty()).then(|| section.to_string()),
    })
}

fn parse_range(range: &str) -> Result<(u32, u32), UnidiffError> {
    let number = |text: &str| {
        text.parse::<u32>()
            .map_err(|source| UnidiffError::InvalidRange {
                range: range.to_string(),
                source,
            })
    };
    match range.split_once(',') {
        Some((start, len)) => Ok((number(start)?, number(len)?)),
        None => Ok((number(range)?, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_header() {
        let header = parse_hunk_header("@@ -12,7 +12,9 @@ fn main() {").unwrap();
        assert_eq!(
            header,
            HunkHeader {
                old_start: 12,
                old_len: 7,
                new_start: 12,
                new_len: 9,
                section: Some("fn main() {".to_string()),
            }
        );
    }

    #[test]
    fn test_implicit_lengths() {
        let header = parse_hunk_header("@@ -3 +4 @@").unwrap();
        assert_eq!((header.old_len, header.new_len), (1, 1));
        assert_eq!(header.section, None);
    }

    #[test]
    fn test_empty_side() {
        let header = parse_hunk_header("@@ -0,0 +1,2 @@").unwrap();
        assert_eq!((header.old_start, header.old_len), (0, 0));
        assert_eq!((header.new_start, header.new_len), (1, 2));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            parse_hunk_header("@ -1 +1 @"),
            Err(UnidiffError::NotAHunkHeader(_))
        ));
        assert!(matches!(
            parse_hunk_header("@@ -1 @@"),
            Err(UnidiffError::MissingRange { side: "new", .. })
        ));
        assert!(matches!(
            parse_hunk_header("@@ -x,1 +1 @@"),
            Err(UnidiffError::InvalidRange { .. })
        ));
    }
}
