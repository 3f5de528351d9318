use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::{
    error::{MaskError, Result},
    range::RangeSpec,
    sequence::{Mask, MaskSequence},
};

/// Sets whole mask frames to white (1.0) or black (0.0) by frame range
///
/// Either range may be blank to skip it. A frame listed in both ranges is an
/// error, so the order in which the two ranges are applied never matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskRangeEditor;

impl MaskRangeEditor {
    pub fn new() -> Self {
        Self
    }

    pub fn edit(
        &self,
        masks: &MaskSequence,
        white_range: &str,
        black_range: &str,
    ) -> Result<MaskSequence> {
        let (white, black) = parse_white_black(masks.len(), white_range, black_range)?;
        Ok(paint_masks(masks, &white, &black))
    }
}

/// Parse, bounds-check and overlap-check a white/black range pair
///
/// Returns the expanded index sets, each guaranteed `< length`.
pub(crate) fn parse_white_black(
    length: usize,
    white_range: &str,
    black_range: &str,
) -> Result<(BTreeSet<usize>, BTreeSet<usize>)> {
    let white = RangeSpec::parse_field(white_range, "white_range")?;
    let black = RangeSpec::parse_field(black_range, "black_range")?;

    check_within(&white, "white_range", length)?;
    check_within(&black, "black_range", length)?;

    let white = white.to_set();
    let black = black.to_set();
    let overlap: Vec<usize> = white.intersection(&black).copied().collect();
    if !overlap.is_empty() {
        return Err(MaskError::Overlap { frames: overlap }.into());
    }

    Ok((white, black))
}

/// Fail on the first span (in token order) reaching past the sequence end
pub(crate) fn check_within(spec: &RangeSpec, field: &str, length: usize) -> Result<()> {
    if let Some(span) = spec.spans().iter().find(|span| span.end >= length) {
        return Err(MaskError::IndexOutOfRange {
            field: field.to_string(),
            index: span.end,
            length,
        }
        .into());
    }
    Ok(())
}

/// Build a new mask sequence with white and black frames overwritten
pub(crate) fn paint_masks(
    masks: &MaskSequence,
    white: &BTreeSet<usize>,
    black: &BTreeSet<usize>,
) -> MaskSequence {
    let resolution = masks.resolution();
    let painted = masks
        .masks()
        .par_iter()
        .enumerate()
        .map(|(index, mask)| {
            if white.contains(&index) {
                Mask::opaque(resolution)
            } else if black.contains(&index) {
                Mask::transparent(resolution)
            } else {
                mask.clone()
            }
        })
        .collect();
    MaskSequence::from_masks_unchecked(painted)
}
