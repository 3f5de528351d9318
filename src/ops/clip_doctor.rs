use rayon::prelude::*;

use crate::{
    config::DEFAULT_GREY_LEVEL,
    error::Result,
    ops::mask_range::{check_within, paint_masks, parse_white_black},
    range::RangeSpec,
    sequence::{check_paired, Frame, FrameSequence, MaskSequence, SequencePair},
};

/// Edits images and masks together by frame range
///
/// Frames in the grey range are replaced by a flat grey image; the white and
/// black ranges paint the masks exactly like [`MaskRangeEditor`]. Grey is
/// independent of the mask ranges, so a frame may be both grey and white.
///
/// ```text
/// 6 frames, grey "1,5", white "1,4-5", black "0"
/// images: [a0, grey, a2, a3, a4, grey]
/// masks:  [black, white, m2, m3, white, white]
/// ```
///
/// [`MaskRangeEditor`]: crate::ops::MaskRangeEditor
#[derive(Debug, Clone, Copy)]
pub struct ClipDoctor {
    grey_level: f32,
}

impl Default for ClipDoctor {
    fn default() -> Self {
        Self::new(DEFAULT_GREY_LEVEL)
    }
}

impl ClipDoctor {
    pub fn new(grey_level: f32) -> Self {
        Self { grey_level }
    }

    pub fn doctor(
        &self,
        images: &FrameSequence,
        masks: &MaskSequence,
        grey_range: &str,
        white_range: &str,
        black_range: &str,
    ) -> Result<SequencePair> {
        check_paired(images, masks, "masks")?;

        let grey = RangeSpec::parse_field(grey_range, "grey_range")?;
        check_within(&grey, "grey_range", images.len())?;
        let (white, black) = parse_white_black(masks.len(), white_range, black_range)?;

        let grey_frame = Frame::uniform(images.resolution(), self.grey_level);
        let frames = images
            .frames()
            .par_iter()
            .enumerate()
            .map(|(index, frame)| {
                if grey.contains(index) {
                    grey_frame.clone()
                } else {
                    frame.clone()
                }
            })
            .collect();

        Ok(SequencePair {
            images: FrameSequence::from_frames_unchecked(frames),
            masks: paint_masks(masks, &white, &black),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sequence::Resolution;

    const RES: Resolution = Resolution { width: 2, height: 2 };

    fn clip(len: usize) -> (FrameSequence, MaskSequence) {
        let frames = (0..len).map(|i| Frame::uniform(RES, i as f32 / 10.0)).collect();
        (
            FrameSequence::new(frames).unwrap(),
            MaskSequence::filled(len, RES, 0.5).unwrap(),
        )
    }

    #[test]
    fn test_grey_white_black() {
        let (images, masks) = clip(6);
        let out = ClipDoctor::default()
            .doctor(&images, &masks, "1,5", "1,4-5", "0")
            .unwrap();

        let grey = 127.0 / 255.0;
        assert!(out.images[1].is_uniform(grey));
        assert!(out.images[5].is_uniform(grey));
        assert_eq!(out.images[2], images[2]);

        let levels: Vec<f32> = out.masks.iter().map(|m| m.value_at(0, 0)).collect();
        assert_eq!(levels, vec![0.0, 1.0, 0.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_custom_grey_level() {
        let (images, masks) = clip(3);
        let out = ClipDoctor::new(0.25).doctor(&images, &masks, "0", "", "").unwrap();
        assert!(out.images[0].is_uniform(0.25));
    }

    #[test]
    fn test_count_mismatch_checked_first() {
        let (images, _) = clip(4);
        let masks = MaskSequence::filled(3, RES, 0.5).unwrap();
        let err = ClipDoctor::default().doctor(&images, &masks, "x", "", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionMismatch);
    }

    #[test]
    fn test_grey_spans_are_matched_without_expansion() {
        let (images, masks) = clip(8);
        let out = ClipDoctor::new(0.25)
            .doctor(&images, &masks, "0-2,6-7", "", "")
            .unwrap();
        let grey: Vec<bool> = out.images.iter().map(|f| f.is_uniform(0.25)).collect();
        assert_eq!(grey, vec![true, true, true, false, false, false, true, true]);
    }

    #[test]
    fn test_grey_out_of_range() {
        let (images, masks) = clip(4);
        let err = ClipDoctor::default().doctor(&images, &masks, "4", "", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        assert!(err.to_string().contains("grey_range"));
    }

    #[test]
    fn test_mask_overlap_rejected() {
        let (images, masks) = clip(4);
        let err = ClipDoctor::default().doctor(&images, &masks, "", "0-2", "2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overlap);
    }
}
