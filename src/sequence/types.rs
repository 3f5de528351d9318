use std::fmt;
use std::ops::Index;

use image::{ImageBuffer, Luma, Rgb, Rgb32FImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};
use crate::sequence::pairing::check_resolution;

/// Single-channel floating point mask buffer
pub type MaskImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Mask value that tells the model to keep a region untouched
pub const MASK_OPAQUE: f32 = 1.0;

/// Mask value that marks a region as editable
pub const MASK_TRANSPARENT: f32 = 0.0;

/// Frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in one frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Represents a single RGB video frame
///
/// Pixel values are `f32` in the nominal range 0.0-1.0.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: Rgb32FImage,
}

impl Frame {
    /// Create a new frame from an RGB float buffer
    pub fn new(buffer: Rgb32FImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame filled with the specified color
    pub fn filled(resolution: Resolution, color: [f32; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(resolution.width, resolution.height, Rgb(color));
        Self { buffer }
    }

    /// Create a frame where every channel of every pixel has the same level
    pub fn uniform(resolution: Resolution, level: f32) -> Self {
        Self::filled(resolution, [level; 3])
    }

    /// Create a frame from interleaved RGB values
    pub fn from_raw(resolution: Resolution, data: Vec<f32>) -> Result<Self> {
        let len = data.len();
        ImageBuffer::from_raw(resolution.width, resolution.height, data)
            .map(|buffer| Self { buffer })
            .ok_or_else(|| {
                SequenceError::InvalidBuffer {
                    resolution,
                    channels: 3,
                    len,
                }
                .into()
            })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [f32; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &Rgb32FImage {
        &self.buffer
    }

    /// Check whether every channel of every pixel equals `level`
    pub fn is_uniform(&self, level: f32) -> bool {
        self.buffer.as_raw().iter().all(|&v| v == level)
    }
}

/// Represents a single-channel mask frame
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    buffer: MaskImage,
}

impl Mask {
    pub fn new(buffer: MaskImage) -> Self {
        Self { buffer }
    }

    /// Create a mask with every pixel set to `value`
    pub fn filled(resolution: Resolution, value: f32) -> Self {
        let buffer = ImageBuffer::from_pixel(resolution.width, resolution.height, Luma([value]));
        Self { buffer }
    }

    /// Fully preserved mask (1.0)
    pub fn opaque(resolution: Resolution) -> Self {
        Self::filled(resolution, MASK_OPAQUE)
    }

    /// Fully editable mask (0.0)
    pub fn transparent(resolution: Resolution) -> Self {
        Self::filled(resolution, MASK_TRANSPARENT)
    }

    pub fn from_raw(resolution: Resolution, data: Vec<f32>) -> Result<Self> {
        let len = data.len();
        ImageBuffer::from_raw(resolution.width, resolution.height, data)
            .map(|buffer| Self { buffer })
            .ok_or_else(|| {
                SequenceError::InvalidBuffer {
                    resolution,
                    channels: 1,
                    len,
                }
                .into()
            })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    pub fn value_at(&self, x: u32, y: u32) -> f32 {
        self.buffer.get_pixel(x, y).0[0]
    }

    pub fn as_image(&self) -> &MaskImage {
        &self.buffer
    }

    /// Check whether every pixel equals `value`
    pub fn is_uniform(&self, value: f32) -> bool {
        self.buffer.as_raw().iter().all(|&v| v == value)
    }

    /// Element-wise maximum of two masks of the same resolution
    ///
    /// A region opaque in either input stays opaque in the result.
    pub fn union_max(&self, other: &Mask) -> Result<Mask> {
        let resolution = self.resolution();
        check_resolution("mask union", resolution, other.resolution())?;
        let data = self
            .buffer
            .as_raw()
            .iter()
            .zip(other.buffer.as_raw())
            .map(|(&a, &b)| a.max(b))
            .collect();
        Self::from_raw(resolution, data)
    }
}

/// Ordered, non-empty run of frames sharing one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Build a sequence, checking that it is non-empty and uniformly sized
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| SequenceError::Empty { label: "image sequence".to_string() })?
            .resolution();

        for (index, frame) in frames.iter().enumerate().skip(1) {
            if frame.resolution() != first {
                return Err(SequenceError::ResolutionMismatch {
                    context: format!("image frame {}", index),
                    expected: first,
                    found: frame.resolution(),
                }
                .into());
            }
        }

        Ok(Self { frames })
    }

    /// Sequence of `len` identical frames
    pub fn repeat(frame: Frame, len: usize) -> Result<Self> {
        Self::new(vec![frame; len])
    }

    pub(crate) fn from_frames_unchecked(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a constructed sequence
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn resolution(&self) -> Resolution {
        self.frames[0].resolution()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl Index<usize> for FrameSequence {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        &self.frames[index]
    }
}

/// Ordered, non-empty run of masks sharing one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSequence {
    masks: Vec<Mask>,
}

impl MaskSequence {
    pub fn new(masks: Vec<Mask>) -> Result<Self> {
        let first = masks
            .first()
            .ok_or_else(|| SequenceError::Empty { label: "mask sequence".to_string() })?
            .resolution();

        for (index, mask) in masks.iter().enumerate().skip(1) {
            if mask.resolution() != first {
                return Err(SequenceError::ResolutionMismatch {
                    context: format!("mask frame {}", index),
                    expected: first,
                    found: mask.resolution(),
                }
                .into());
            }
        }

        Ok(Self { masks })
    }

    /// Sequence of `len` masks all set to `value`
    pub fn filled(len: usize, resolution: Resolution, value: f32) -> Result<Self> {
        Self::new(vec![Mask::filled(resolution, value); len])
    }

    pub(crate) fn from_masks_unchecked(masks: Vec<Mask>) -> Self {
        Self { masks }
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn resolution(&self) -> Resolution {
        self.masks[0].resolution()
    }

    pub fn get(&self, index: usize) -> Option<&Mask> {
        self.masks.get(index)
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mask> {
        self.masks.iter()
    }

    pub fn into_masks(self) -> Vec<Mask> {
        self.masks
    }
}

impl Index<usize> for MaskSequence {
    type Output = Mask;

    fn index(&self, index: usize) -> &Mask {
        &self.masks[index]
    }
}

/// Images plus their masks, the output of every sequence operation
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePair {
    pub images: FrameSequence,
    pub masks: MaskSequence,
}

impl SequencePair {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
