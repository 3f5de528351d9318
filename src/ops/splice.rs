use rayon::prelude::*;

use crate::{
    config::{SpliceConfig, DEFAULT_GREY_LEVEL},
    error::{Result, SpliceError},
    sequence::{
        check_paired, check_resolution, Frame, FrameSequence, Mask, MaskSequence, SequencePair,
    },
};

/// Where one output frame of a splice comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineSlot {
    /// Both sequences cover this index; sequence2 wins the image, masks merge
    Overlap { first: usize, second: usize },
    /// Only sequence1 covers this index
    First(usize),
    /// Only sequence2 covers this index
    Second(usize),
    /// Neither sequence covers this index
    Gap,
}

/// Lay out the output timeline of a splice
///
/// sequence2's frame 0 lands on absolute index `offset`. A negative offset
/// drops sequence2's leading frames; an offset that drops all of them, or
/// whose end index does not fit in an `i64`, is rejected.
pub fn plan_timeline(
    first_len: usize,
    second_len: usize,
    offset: i64,
) -> Result<Vec<TimelineSlot>> {
    let second_end = i64::try_from(second_len)
        .ok()
        .and_then(|len| offset.checked_add(len))
        .filter(|&end| end > 0)
        .ok_or(SpliceError::InvalidOffset { offset, length: second_len })?;

    let total = (first_len as i64).max(second_end) as usize;
    let slots = (0..total)
        .map(|index| {
            let first = (index < first_len).then_some(index);
            let relative = index as i64 - offset;
            let second = (0..second_len as i64)
                .contains(&relative)
                .then_some(relative as usize);

            match (first, second) {
                (Some(first), Some(second)) => TimelineSlot::Overlap { first, second },
                (Some(first), None) => TimelineSlot::First(first),
                (None, Some(second)) => TimelineSlot::Second(second),
                (None, None) => TimelineSlot::Gap,
            }
        })
        .collect();
    Ok(slots)
}

/// Overlays one frame/mask sequence onto another at a frame offset
///
/// ```text
/// seq1: [A0, A1, A2, A3, A4]      seq2: [B0, B1, B2]      offset: 4
/// out:  [A0, A1, A2, A3, B0, B1, B2]
///                        ^ overlap: image from B0, mask = max(mask A4, mask B0)
/// ```
///
/// Frames neither sequence covers (offset past the end of seq1) become flat
/// grey with a fully opaque mask.
#[derive(Debug, Clone)]
pub struct SequenceSplicer {
    config: SpliceConfig,
    grey_level: f32,
}

impl Default for SequenceSplicer {
    fn default() -> Self {
        Self::new(SpliceConfig::default(), DEFAULT_GREY_LEVEL)
    }
}

impl SequenceSplicer {
    pub fn new(config: SpliceConfig, grey_level: f32) -> Self {
        Self { config, grey_level }
    }

    pub fn splice(
        &self,
        images1: &FrameSequence,
        masks1: Option<&MaskSequence>,
        images2: &FrameSequence,
        masks2: Option<&MaskSequence>,
        offset: i64,
    ) -> Result<SequencePair> {
        let resolution = images1.resolution();
        check_resolution("imagesequence2", resolution, images2.resolution())?;
        if let Some(masks) = masks1 {
            check_paired(images1, masks, "mask1")?;
        }
        if let Some(masks) = masks2 {
            check_paired(images2, masks, "mask2")?;
        }

        if offset > i64::from(self.config.max_offset) {
            return Err(SpliceError::OffsetTooLarge { offset, max: self.config.max_offset }.into());
        }
        let timeline = plan_timeline(images1.len(), images2.len(), offset)?;

        let masks1 = MaskSequence::resolve_for(masks1, images1, "mask1")?;
        let masks2 = MaskSequence::resolve_for(masks2, images2, "mask2")?;
        let gap_frame = Frame::uniform(resolution, self.grey_level);
        let gap_mask = Mask::opaque(resolution);

        let slots = timeline
            .par_iter()
            .map(|slot| -> Result<(Frame, Mask)> {
                Ok(match *slot {
                    TimelineSlot::Overlap { first, second } => (
                        images2[second].clone(),
                        masks1[first].union_max(&masks2[second])?,
                    ),
                    TimelineSlot::First(first) => (images1[first].clone(), masks1[first].clone()),
                    TimelineSlot::Second(second) => {
                        (images2[second].clone(), masks2[second].clone())
                    }
                    TimelineSlot::Gap => (gap_frame.clone(), gap_mask.clone()),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let (frames, masks): (Vec<Frame>, Vec<Mask>) = slots.into_iter().unzip();

        Ok(SequencePair {
            images: FrameSequence::from_frames_unchecked(frames),
            masks: MaskSequence::from_masks_unchecked(masks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sequence::Resolution;

    const RES: Resolution = Resolution { width: 2, height: 2 };

    fn frames(len: usize, base: f32) -> FrameSequence {
        let frames = (0..len).map(|i| Frame::uniform(RES, base + i as f32 / 100.0)).collect();
        FrameSequence::new(frames).unwrap()
    }

    #[test]
    fn test_plan_overlap_tail() {
        let plan = plan_timeline(5, 3, 4).unwrap();
        assert_eq!(plan.len(), 7);
        assert_eq!(plan[3], TimelineSlot::First(3));
        assert_eq!(plan[4], TimelineSlot::Overlap { first: 4, second: 0 });
        assert_eq!(plan[5], TimelineSlot::Second(1));
        assert_eq!(plan[6], TimelineSlot::Second(2));
    }

    #[test]
    fn test_plan_gap() {
        let plan = plan_timeline(2, 2, 4).unwrap();
        assert_eq!(
            plan,
            vec![
                TimelineSlot::First(0),
                TimelineSlot::First(1),
                TimelineSlot::Gap,
                TimelineSlot::Gap,
                TimelineSlot::Second(0),
                TimelineSlot::Second(1),
            ]
        );
    }

    #[test]
    fn test_plan_inner_overlay_keeps_first_tail() {
        let plan = plan_timeline(6, 2, 1).unwrap();
        assert_eq!(plan.len(), 6);
        assert_eq!(plan[2], TimelineSlot::Overlap { first: 2, second: 1 });
        assert_eq!(plan[3], TimelineSlot::First(3));
    }

    #[test]
    fn test_plan_negative_offset() {
        let plan = plan_timeline(3, 4, -2).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0], TimelineSlot::Overlap { first: 0, second: 2 });
        assert_eq!(plan[1], TimelineSlot::Overlap { first: 1, second: 3 });
        assert_eq!(plan[2], TimelineSlot::First(2));

        let err = plan_timeline(3, 4, -4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);
    }

    #[test]
    fn test_plan_extreme_offsets_are_errors() {
        let err = plan_timeline(1, 2, i64::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);

        let err = plan_timeline(1, 2, i64::MIN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);
    }

    #[test]
    fn test_splice_overlap_merges_masks() {
        let images1 = frames(5, 0.1);
        let images2 = frames(3, 0.6);
        let masks1 = MaskSequence::filled(5, RES, 0.3).unwrap();
        let masks2 = MaskSequence::filled(3, RES, 0.2).unwrap();

        let out = SequenceSplicer::default()
            .splice(&images1, Some(&masks1), &images2, Some(&masks2), 4)
            .unwrap();

        assert_eq!(out.len(), 7);
        for i in 0..4 {
            assert_eq!(out.images[i], images1[i]);
            assert!(out.masks[i].is_uniform(0.3));
        }
        assert_eq!(out.images[4], images2[0]);
        assert!(out.masks[4].is_uniform(0.3));
        assert_eq!(out.images[6], images2[2]);
        assert!(out.masks[6].is_uniform(0.2));
    }

    #[test]
    fn test_missing_mask_is_opaque_where_present() {
        let images1 = frames(3, 0.1);
        let images2 = frames(3, 0.6);
        let masks2 = MaskSequence::filled(3, RES, 0.0).unwrap();

        let out = SequenceSplicer::default()
            .splice(&images1, None, &images2, Some(&masks2), 2)
            .unwrap();

        assert_eq!(out.len(), 5);
        assert!(out.masks[1].is_uniform(1.0));
        // overlap: absent mask1 counts as opaque
        assert!(out.masks[2].is_uniform(1.0));
        // sequence2 alone: its own mask, nothing from sequence1
        assert!(out.masks[3].is_uniform(0.0));
        assert!(out.masks[4].is_uniform(0.0));
    }

    #[test]
    fn test_gap_is_grey_and_opaque() {
        let images1 = frames(2, 0.1);
        let images2 = frames(2, 0.6);
        let masks2 = MaskSequence::filled(2, RES, 0.0).unwrap();

        let out = SequenceSplicer::new(SpliceConfig::default(), 0.5)
            .splice(&images1, None, &images2, Some(&masks2), 4)
            .unwrap();

        assert_eq!(out.len(), 6);
        for i in 2..4 {
            assert!(out.images[i].is_uniform(0.5));
            assert!(out.masks[i].is_uniform(1.0));
        }
        assert!(out.masks[4].is_uniform(0.0));
    }

    #[test]
    fn test_resolution_mismatch() {
        let images1 = frames(2, 0.1);
        let images2 = FrameSequence::repeat(Frame::uniform(Resolution::new(3, 2), 0.5), 2).unwrap();
        let err = SequenceSplicer::default()
            .splice(&images1, None, &images2, None, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionMismatch);
        assert!(err.to_string().contains("imagesequence2"));
    }

    #[test]
    fn test_mask_length_checked() {
        let images1 = frames(3, 0.1);
        let masks1 = MaskSequence::filled(2, RES, 1.0).unwrap();
        let err = SequenceSplicer::default()
            .splice(&images1, Some(&masks1), &frames(2, 0.6), None, 0)
            .unwrap_err();
        assert!(err.to_string().contains("mask1"));
    }

    #[test]
    fn test_offset_limits() {
        let splicer = SequenceSplicer::new(SpliceConfig { max_offset: 10 }, 0.5);
        let err = splicer
            .splice(&frames(2, 0.1), None, &frames(2, 0.6), None, 11)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);

        let err = splicer
            .splice(&frames(2, 0.1), None, &frames(2, 0.6), None, -2)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let images1 = frames(3, 0.1);
        let snapshot = images1.clone();
        let _ = SequenceSplicer::default()
            .splice(&images1, None, &frames(2, 0.6), None, 1)
            .unwrap();
        assert_eq!(images1, snapshot);
    }
}
