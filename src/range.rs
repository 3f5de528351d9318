//! # Range Syntax
//!
//! Parses frame selections such as `"3,5,10-15,20"`: comma-separated tokens,
//! each a single index or an inclusive `start-end` pair. A blank string selects
//! nothing. Repeating a frame across tokens is an error.
//!
//! ```rust
//! use vace_sequence::range::parse_range;
//!
//! let frames = parse_range("3,5,10-12").unwrap();
//! assert_eq!(frames.into_iter().collect::<Vec<_>>(), vec![3, 5, 10, 11, 12]);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{RangeError, Result};

/// Field name used in messages when the caller does not name one
const DEFAULT_FIELD: &str = "range";

/// One inclusive run of frame indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    pub start: usize,
    pub end: usize,
}

impl FrameSpan {
    /// Number of frames in the span (always at least one), saturating at
    /// `usize::MAX`
    pub fn count(&self) -> usize {
        (self.end - self.start).saturating_add(1)
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

impl fmt::Display for FrameSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A parsed, duplicate-free frame selection
///
/// Spans are kept unexpanded so that bounds can be checked with
/// [`RangeSpec::max_index`] before any index list is materialised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSpec {
    spans: Vec<FrameSpan>,
}

impl RangeSpec {
    /// Parse a range string
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_field(input, DEFAULT_FIELD)
    }

    /// Parse a range string, naming `field` in any error
    pub fn parse_field(input: &str, field: &str) -> Result<Self> {
        let mut spans = Vec::new();
        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            spans.push(parse_token(token, field)?);
        }

        if let Some(index) = first_duplicate(&spans) {
            return Err(RangeError::Duplicate {
                field: field.to_string(),
                index,
            }
            .into());
        }

        Ok(Self { spans })
    }

    /// True when the selection is empty (the "skip" case)
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of selected frames, saturating at `usize::MAX`
    pub fn len(&self) -> usize {
        self.spans
            .iter()
            .map(FrameSpan::count)
            .fold(0, usize::saturating_add)
    }

    /// Largest selected index, if any
    pub fn max_index(&self) -> Option<usize> {
        self.spans.iter().map(|span| span.end).max()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.spans.iter().any(|span| span.contains(index))
    }

    pub fn spans(&self) -> &[FrameSpan] {
        &self.spans
    }

    /// Iterate over every selected index, in token order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.spans.iter().flat_map(|span| span.start..=span.end)
    }

    pub fn to_set(&self) -> BTreeSet<usize> {
        self.indices().collect()
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.spans.iter().map(|span| span.to_string()).collect();
        write!(f, "{}", tokens.join(","))
    }
}

/// Parse a range string into the set of frame indices it selects
pub fn parse_range(input: &str) -> Result<BTreeSet<usize>> {
    Ok(RangeSpec::parse(input)?.to_set())
}

/// Parse a comma-separated list of single positions, keeping listed order
///
/// Unlike [`parse_range`], dashes are not accepted and an empty list is an
/// error. Duplicates are left in place for the caller to report.
pub fn parse_positions(input: &str) -> Result<Vec<usize>> {
    let mut positions = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.starts_with('-') {
            return Err(RangeError::NegativeIndex {
                field: "keyframe_positions".to_string(),
                token: token.to_string(),
            }
            .into());
        }
        let position = token.parse::<usize>().map_err(|_| RangeError::InvalidNumber {
            field: "keyframe_positions".to_string(),
            token: token.to_string(),
        })?;
        positions.push(position);
    }

    if positions.is_empty() {
        return Err(RangeError::EmptyPositions.into());
    }
    Ok(positions)
}

fn parse_token(token: &str, field: &str) -> Result<FrameSpan> {
    if token.starts_with('-') {
        return Err(RangeError::NegativeIndex {
            field: field.to_string(),
            token: token.to_string(),
        }
        .into());
    }

    let number = |text: &str| -> Result<usize> {
        text.trim().parse::<usize>().map_err(|_| {
            RangeError::InvalidNumber {
                field: field.to_string(),
                token: token.to_string(),
            }
            .into()
        })
    };

    match token.split_once('-') {
        Some((start, end)) => {
            if end.contains('-') || end.trim().is_empty() {
                return Err(RangeError::MalformedRange {
                    field: field.to_string(),
                    token: token.to_string(),
                }
                .into());
            }
            let (start, end) = (number(start)?, number(end)?);
            if start > end {
                return Err(RangeError::InvalidRange {
                    field: field.to_string(),
                    token: token.to_string(),
                    start,
                    end,
                }
                .into());
            }
            Ok(FrameSpan { start, end })
        }
        None => {
            let index = number(token)?;
            Ok(FrameSpan { start: index, end: index })
        }
    }
}

/// Smallest index covered by more than one span
fn first_duplicate(spans: &[FrameSpan]) -> Option<usize> {
    let mut sorted = spans.to_vec();
    sorted.sort_by_key(|span| (span.start, span.end));

    let mut covered_to: Option<usize> = None;
    for span in sorted {
        if let Some(end) = covered_to {
            if span.start <= end {
                return Some(span.start);
            }
        }
        covered_to = Some(covered_to.map_or(span.end, |end| end.max(span.end)));
    }
    None
}
