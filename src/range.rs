//! Page range parsing
//!
//! Turns user input such as `"1-3, 5, 8-10"` into one page group per
//! comma-separated entry. Each group becomes one output document when
//! splitting.

use crate::error::{Error, Result};

/// Pages selected by one range entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRangeGroup {
    /// First page number as typed (1-based)
    pub start: u32,
    /// Last page number as typed (1-based)
    pub end: u32,
    /// 0-based page indices that exist in the document, in order
    pub indices: Vec<usize>,
}

impl PageRangeGroup {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The group's pages as 1-based page numbers
    pub fn page_numbers(&self) -> Vec<u32> {
        self.indices.iter().map(|&index| index as u32 + 1).collect()
    }
}

/// Parse a comma-separated page range list against a document of
/// `page_count` pages
///
/// Supported entries:
/// - `"7"` → page 7
/// - `"3-5"` → pages 3, 4 and 5
/// - `"5-3"` → nothing (ranges only count forward)
///
/// Whitespace around entries and around the hyphen is ignored. Pages that
/// don't exist in the document are dropped from their group. A blank input
/// yields no groups.
///
/// Any entry that is not a number or a `A-B` pair aborts the whole parse
/// with [`Error::MalformedRangeToken`].
///
/// # Example
///
/// ```
/// use securepdf_tools::range::parse_ranges;
///
/// let groups = parse_ranges("1-3, 5", 10).unwrap();
/// assert_eq!(groups[0].indices, vec![0, 1, 2]);
/// assert_eq!(groups[1].indices, vec![4]);
/// ```
pub fn parse_ranges(input: &str, page_count: usize) -> Result<Vec<PageRangeGroup>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(',')
        .enumerate()
        .map(|(position, token)| {
            let (start, end) = parse_token(token.trim(), position)?;
            Ok(PageRangeGroup {
                start,
                end,
                indices: page_indices(start, end, page_count),
            })
        })
        .collect()
}

/// Parse one entry into its (start, end) page numbers
fn parse_token(token: &str, position: usize) -> Result<(u32, u32)> {
    let malformed = || Error::MalformedRangeToken {
        token: token.to_string(),
        position,
    };

    match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_page_number(start).ok_or_else(malformed)?;
            let end = parse_page_number(end).ok_or_else(malformed)?;
            Ok((start, end))
        }
        None => {
            let page = parse_page_number(token).ok_or_else(malformed)?;
            Ok((page, page))
        }
    }
}

/// Digits only; signs, blanks and a second hyphen are rejected
///
/// Numbers too large for `u32` saturate. They lie past the end of any
/// document and get clamped like every other out-of-range page.
fn parse_page_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(text.parse().unwrap_or(u32::MAX))
}

/// Inclusive page range converted to existing 0-based indices
fn page_indices(start: u32, end: u32, page_count: usize) -> Vec<usize> {
    // Page 0 doesn't exist; clamp so huge ranges stay cheap
    let first = start.max(1) as usize;
    let last = (end as usize).min(page_count);
    if first > last {
        return Vec::new();
    }
    (first - 1..last).collect()
}
