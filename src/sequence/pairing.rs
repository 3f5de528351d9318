//! Shape checks between images and masks, and the default-mask rule.
//!
//! Every operation that accepts an optional mask input goes through
//! [`MaskSequence::resolve_for`]: a supplied mask is validated against its
//! images, a missing one becomes an all-opaque sequence of the same shape.

use crate::error::{Result, SequenceError};
use crate::sequence::types::{FrameSequence, MaskSequence, MASK_OPAQUE};
use crate::sequence::Resolution;

/// Fail unless `found` equals `expected`
pub fn check_resolution(context: &str, expected: Resolution, found: Resolution) -> Result<()> {
    if expected != found {
        return Err(SequenceError::ResolutionMismatch {
            context: context.to_string(),
            expected,
            found,
        }
        .into());
    }
    Ok(())
}

/// Fail unless `masks` has one frame per image at the images' resolution
pub fn check_paired(images: &FrameSequence, masks: &MaskSequence, label: &str) -> Result<()> {
    if masks.len() != images.len() {
        return Err(SequenceError::LengthMismatch {
            context: label.to_string(),
            expected: images.len(),
            found: masks.len(),
        }
        .into());
    }
    check_resolution(label, images.resolution(), masks.resolution())
}

impl MaskSequence {
    /// Resolve an optional mask input against the images it belongs to
    ///
    /// `label` names the mask input in error messages (e.g. `"mask1"`).
    pub fn resolve_for(
        masks: Option<&MaskSequence>,
        images: &FrameSequence,
        label: &str,
    ) -> Result<MaskSequence> {
        match masks {
            Some(masks) => {
                check_paired(images, masks, label)?;
                Ok(masks.clone())
            }
            None => MaskSequence::filled(images.len(), images.resolution(), MASK_OPAQUE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sequence::{Frame, Mask};

    fn images(len: usize, res: Resolution) -> FrameSequence {
        FrameSequence::repeat(Frame::uniform(res, 0.3), len).unwrap()
    }

    #[test]
    fn test_missing_mask_is_opaque() {
        let res = Resolution::new(3, 2);
        let masks = MaskSequence::resolve_for(None, &images(4, res), "masks").unwrap();
        assert_eq!(masks.len(), 4);
        assert_eq!(masks.resolution(), res);
        assert!(masks.iter().all(|m| m.is_uniform(1.0)));
    }

    #[test]
    fn test_supplied_mask_is_validated() {
        let res = Resolution::new(3, 2);
        let short = MaskSequence::filled(3, res, 0.5).unwrap();
        let err = MaskSequence::resolve_for(Some(&short), &images(4, res), "masks").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionMismatch);

        let wrong = MaskSequence::new(vec![Mask::opaque(Resolution::new(2, 2)); 4]).unwrap();
        let err = MaskSequence::resolve_for(Some(&wrong), &images(4, res), "masks").unwrap_err();
        assert!(err.to_string().contains("2x2"));
    }
}
