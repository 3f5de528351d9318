//! # Sequence Model
//!
//! Frame and mask sequences, the pairing rules between them, and directory I/O
//! used by the command-line front end.

pub mod io;
pub mod pairing;
pub mod types;

pub use pairing::{check_paired, check_resolution};
pub use types::{
    Frame, FrameSequence, Mask, MaskImage, MaskSequence, Resolution, SequencePair, MASK_OPAQUE,
    MASK_TRANSPARENT,
};
