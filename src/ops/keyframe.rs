use std::collections::HashSet;

use crate::{
    config::KeyframeConfig,
    error::{KeyframeError, Result},
    range::parse_positions,
    sequence::{check_resolution, Frame, FrameSequence, Mask, MaskSequence, SequencePair},
};

/// Replaces frames at chosen positions with keyframe images
///
/// This is a positional overwrite: the output has exactly as many frames as
/// the input. The mask at every replaced position becomes a uniform
/// `mask_value` (0.0 by default), while every other mask frame is passed
/// through, or synthesized as fully opaque when no masks were supplied.
///
/// ```text
/// images:    [F0, F1, F2, F3, F4, F5, F6, F7]
/// positions: "3,7"   keyframes: K1, K2
/// result:    [F0, F1, F2, K1, F4, F5, F6, K2]
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyframeInserter {
    config: KeyframeConfig,
}

impl KeyframeInserter {
    pub fn new(config: KeyframeConfig) -> Self {
        Self { config }
    }

    /// Number of keyframe slots a single call accepts
    pub fn max_slots(&self) -> usize {
        self.config.max_slots
    }

    /// Insert keyframes
    ///
    /// # Arguments
    ///
    /// * `images` - Source sequence
    /// * `masks` - Optional masks for `images`
    /// * `positions` - Comma-separated target positions, e.g. `"3,7"`
    /// * `slots` - Keyframe slots; empty slots are skipped and the filled ones
    ///   are matched to positions in the order the positions were listed
    /// * `mask_value` - Mask value at keyframe positions, defaults to the
    ///   configured value
    pub fn insert(
        &self,
        images: &FrameSequence,
        masks: Option<&MaskSequence>,
        positions: &str,
        slots: &[Option<Frame>],
        mask_value: Option<f32>,
    ) -> Result<SequencePair> {
        let max = self.config.max_slots;
        let positions = parse_positions(positions)?;
        if positions.len() > max {
            return Err(KeyframeError::TooManyPositions { count: positions.len(), max }.into());
        }

        for &position in &positions {
            if position >= images.len() {
                return Err(KeyframeError::PositionOutOfRange {
                    position,
                    length: images.len(),
                }
                .into());
            }
        }

        let mut seen = HashSet::with_capacity(positions.len());
        if let Some(&position) = positions.iter().find(|&&p| !seen.insert(p)) {
            return Err(KeyframeError::DuplicatePosition { position }.into());
        }

        let keyframes: Vec<(usize, &Frame)> = slots
            .iter()
            .enumerate()
            .filter_map(|(slot, frame)| frame.as_ref().map(|frame| (slot, frame)))
            .collect();

        if keyframes.is_empty() {
            return Err(KeyframeError::NoKeyframes.into());
        }
        if keyframes.len() > max {
            return Err(KeyframeError::TooManyKeyframes { count: keyframes.len(), max }.into());
        }
        if keyframes.len() != positions.len() {
            return Err(KeyframeError::CountMismatch {
                keyframes: keyframes.len(),
                positions: positions.len(),
            }
            .into());
        }

        let resolution = images.resolution();
        for (slot, frame) in &keyframes {
            check_resolution(&format!("keyframe_{}", slot + 1), resolution, frame.resolution())?;
        }

        let mask_value = mask_value.unwrap_or(self.config.mask_value);
        if !(0.0..=1.0).contains(&mask_value) {
            return Err(KeyframeError::MaskValueOutOfRange { value: mask_value }.into());
        }

        let masks = MaskSequence::resolve_for(masks, images, "masks")?;

        let mut out_frames = images.frames().to_vec();
        let mut out_masks = masks.into_masks();
        let keyframe_mask = Mask::filled(resolution, mask_value);
        for (&position, (_, frame)) in positions.iter().zip(&keyframes) {
            out_frames[position] = Frame::clone(frame);
            out_masks[position] = keyframe_mask.clone();
        }

        Ok(SequencePair {
            images: FrameSequence::from_frames_unchecked(out_frames),
            masks: MaskSequence::from_masks_unchecked(out_masks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sequence::Resolution;

    const RES: Resolution = Resolution { width: 4, height: 2 };

    /// Frames whose level encodes their index
    fn source(len: usize) -> FrameSequence {
        let frames = (0..len).map(|i| Frame::uniform(RES, i as f32 / 10.0)).collect();
        FrameSequence::new(frames).unwrap()
    }

    fn keyframe(level: f32) -> Option<Frame> {
        Some(Frame::uniform(RES, level))
    }

    #[test]
    fn test_insert_two_keyframes() {
        let inserter = KeyframeInserter::default();
        let images = source(8);
        let slots = [keyframe(0.91), keyframe(0.92), None, None, None];

        let out = inserter.insert(&images, None, "3,7", &slots, None).unwrap();

        assert_eq!(out.len(), 8);
        for i in 0..8 {
            match i {
                3 => assert!(out.images[i].is_uniform(0.91)),
                7 => assert!(out.images[i].is_uniform(0.92)),
                _ => assert_eq!(out.images[i], images[i]),
            }
        }
        for (i, mask) in out.masks.iter().enumerate() {
            let expected = if i == 3 || i == 7 { 0.0 } else { 1.0 };
            assert!(mask.is_uniform(expected), "mask {} should be {}", i, expected);
        }
    }

    #[test]
    fn test_listed_order_not_numeric_order() {
        let inserter = KeyframeInserter::default();
        let slots = [keyframe(0.91), keyframe(0.92)];

        let out = inserter.insert(&source(8), None, "7,3", &slots, None).unwrap();

        assert!(out.images[7].is_uniform(0.91));
        assert!(out.images[3].is_uniform(0.92));
    }

    #[test]
    fn test_gapped_slots_are_compacted() {
        let inserter = KeyframeInserter::default();
        let slots = [None, keyframe(0.5), None, keyframe(0.6), None];

        let out = inserter.insert(&source(6), None, "0,5", &slots, None).unwrap();

        assert!(out.images[0].is_uniform(0.5));
        assert!(out.images[5].is_uniform(0.6));
    }

    #[test]
    fn test_supplied_masks_pass_through() {
        let inserter = KeyframeInserter::default();
        let masks = MaskSequence::filled(5, RES, 0.4).unwrap();

        let out = inserter
            .insert(&source(5), Some(&masks), "2", &[keyframe(0.9)], Some(0.25))
            .unwrap();

        assert!(out.masks[2].is_uniform(0.25));
        assert!(out.masks[0].is_uniform(0.4));
        assert!(out.masks[4].is_uniform(0.4));
        // caller's buffers are untouched
        assert!(masks[2].is_uniform(0.4));
    }

    #[test]
    fn test_roundtrip_reads_back_keyframes() {
        let inserter = KeyframeInserter::default();
        let slots = [keyframe(0.11), keyframe(0.22), keyframe(0.33)];
        let positions = [1usize, 4, 6];

        let out = inserter.insert(&source(8), None, "1, 4, 6", &slots, Some(0.1)).unwrap();

        for (slot, &position) in slots.iter().zip(&positions) {
            assert_eq!(Some(&out.images[position]), slot.as_ref());
            assert!(out.masks[position].is_uniform(0.1));
        }
    }

    #[test]
    fn test_position_out_of_range() {
        let inserter = KeyframeInserter::default();
        let err = inserter.insert(&source(8), None, "8", &[keyframe(0.9)], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PositionOutOfRange);
        assert!(err.to_string().contains("valid range: 0-7"));
    }

    #[test]
    fn test_duplicate_positions() {
        let inserter = KeyframeInserter::default();
        let slots = [keyframe(0.9), keyframe(0.8)];
        let err = inserter.insert(&source(8), None, "2,2", &slots, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicatePosition);
    }

    #[test]
    fn test_count_mismatch() {
        let inserter = KeyframeInserter::default();
        let err = inserter.insert(&source(8), None, "2,5", &[keyframe(0.9)], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CountMismatch);

        let err = inserter.insert(&source(8), None, "2", &[None, None], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CountMismatch);
    }

    #[test]
    fn test_too_many_positions() {
        let inserter = KeyframeInserter::default();
        let slots: Vec<Option<Frame>> = (0..6).map(|_| keyframe(0.5)).collect();
        let err = inserter.insert(&source(8), None, "0,1,2,3,4,5", &slots, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CountMismatch);
    }

    #[test]
    fn test_keyframe_resolution_mismatch() {
        let inserter = KeyframeInserter::default();
        let slots = [keyframe(0.9), Some(Frame::uniform(Resolution::new(8, 8), 0.5))];
        let err = inserter.insert(&source(8), None, "1,2", &slots, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionMismatch);
        assert!(err.to_string().contains("keyframe_2"));
    }

    #[test]
    fn test_mask_length_mismatch() {
        let inserter = KeyframeInserter::default();
        let masks = MaskSequence::filled(7, RES, 1.0).unwrap();
        let err = inserter
            .insert(&source(8), Some(&masks), "1", &[keyframe(0.9)], None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionMismatch);
    }

    #[test]
    fn test_mask_value_bounds() {
        let inserter = KeyframeInserter::default();
        let err = inserter
            .insert(&source(8), None, "1", &[keyframe(0.9)], Some(1.5))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_bad_position_syntax() {
        let inserter = KeyframeInserter::default();
        let err = inserter.insert(&source(8), None, "x", &[keyframe(0.9)], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
