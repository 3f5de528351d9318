//! # VACE Sequence
//!
//! Frame and mask sequence editing for video inpainting workflows.
//!
//! This library prepares the image/mask sequence pairs a video inpainting
//! model consumes: keyframes pinned at chosen positions, mask frames forced
//! to white or black by range, frames greyed out, and clips spliced together
//! at an offset.
//!
//! ## Quick Start
//!
//! ```rust
//! use vace_sequence::{
//!     ops::KeyframeInserter,
//!     sequence::{Frame, FrameSequence, Resolution},
//! };
//!
//! let res = Resolution::new(16, 16);
//! let clip = FrameSequence::repeat(Frame::uniform(res, 0.2), 10)?;
//! let keyframe = Some(Frame::uniform(res, 0.9));
//!
//! let pair = KeyframeInserter::default().insert(&clip, None, "4", &[keyframe], None)?;
//! assert!(pair.images[4].is_uniform(0.9));
//! assert!(pair.masks[4].is_uniform(0.0));
//! assert!(pair.masks[3].is_uniform(1.0));
//! # Ok::<(), vace_sequence::VaceError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`range`] - Frame range and position list parsing
//! - [`sequence`] - Frame, mask and sequence types plus directory I/O
//! - [`ops`] - The editing operations
//! - [`nodes`] - Node-graph adapters over the operations
//! - [`config`] - Configuration management
//!
//! ## Running Nodes by Name
//!
//! ```rust
//! use vace_sequence::nodes::{NodeInputs, NodeRegistry};
//! use vace_sequence::sequence::{MaskSequence, Resolution};
//!
//! let registry = NodeRegistry::new();
//! let masks = MaskSequence::filled(6, Resolution::new(4, 4), 0.5)?;
//! let inputs = NodeInputs::new()
//!     .set("masks", masks)
//!     .set("white_range", "0-2");
//!
//! let outputs = registry.invoke("MaskRangeDoctor", inputs)?;
//! assert!(outputs.masks("masks").is_some());
//! # Ok::<(), vace_sequence::VaceError>(())
//! ```

pub mod config;
pub mod error;
pub mod nodes;
pub mod ops;
pub mod range;
pub mod sequence;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{ErrorKind, Result, VaceError},
    nodes::{NodeRegistry, SequenceNode},
    ops::{ClipDoctor, KeyframeInserter, MaskRangeEditor, SequenceSplicer},
    sequence::{FrameSequence, MaskSequence, SequencePair},
};
