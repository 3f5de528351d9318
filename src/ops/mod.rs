//! # Sequence Operations
//!
//! The editing operations. Each one borrows its inputs, validates everything
//! up front and returns freshly built sequences; nothing here logs or touches
//! the filesystem.
//!
//! - [`KeyframeInserter`] - overwrite frames at listed positions with keyframes
//! - [`MaskRangeEditor`] - paint mask frames white or black by range
//! - [`ClipDoctor`] - grey out image frames and paint masks in one pass
//! - [`SequenceSplicer`] - overlay one sequence onto another at an offset
//!
//! ## Usage
//!
//! ```rust
//! use vace_sequence::ops::MaskRangeEditor;
//! use vace_sequence::sequence::{MaskSequence, Resolution};
//!
//! let masks = MaskSequence::filled(5, Resolution::new(8, 8), 0.5)?;
//! let edited = MaskRangeEditor::new().edit(&masks, "0-2", "3-4")?;
//! assert!(edited[0].is_uniform(1.0));
//! assert!(edited[4].is_uniform(0.0));
//! # Ok::<(), vace_sequence::VaceError>(())
//! ```

pub mod clip_doctor;
pub mod keyframe;
pub mod mask_range;
pub mod splice;

pub use clip_doctor::ClipDoctor;
pub use keyframe::KeyframeInserter;
pub use mask_range::MaskRangeEditor;
pub use splice::{plan_timeline, SequenceSplicer, TimelineSlot};
