use thiserror::Error;

use crate::sequence::Resolution;

/// Main error type for the vace-sequence library
#[derive(Error, Debug)]
pub enum VaceError {
    #[error("Range syntax error: {0}")]
    Range(#[from] RangeError),

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Keyframe error: {0}")]
    Keyframe(#[from] KeyframeError),

    #[error("Mask edit error: {0}")]
    Mask(#[from] MaskError),

    #[error("Splice error: {0}")]
    Splice(#[from] SpliceError),

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Range-syntax parsing errors ("3,5,10-15,20")
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid number format in {field}: '{token}'. Frame indices must be non-negative integers")]
    InvalidNumber { field: String, token: String },

    #[error("invalid range in {field}: '{token}'. Start frame ({start}) must be <= end frame ({end})")]
    InvalidRange {
        field: String,
        token: String,
        start: usize,
        end: usize,
    },

    #[error("invalid range format in {field}: '{token}'. Use 'start-end' (e.g. '10-15')")]
    MalformedRange { field: String, token: String },

    #[error("negative frame index in {field}: '{token}'. Frames are 0-indexed")]
    NegativeIndex { field: String, token: String },

    #[error("frame {index} appears more than once in {field}")]
    Duplicate { field: String, index: usize },

    #[error("no positions given. Specify at least one position (e.g. '0' or '3,7,12')")]
    EmptyPositions,
}

/// Shape and pairing errors on frame/mask sequences
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("{label} contains no frames")]
    Empty { label: String },

    #[error("{context}: resolution {found} does not match {expected}")]
    ResolutionMismatch {
        context: String,
        expected: Resolution,
        found: Resolution,
    },

    #[error("{context}: frame count {found} does not match {expected}")]
    LengthMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to load frame file: {path} ({reason})")]
    LoadFailed { path: String, reason: String },

    #[error("pixel buffer of {len} values does not fit {resolution} with {channels} channel(s)")]
    InvalidBuffer {
        resolution: Resolution,
        channels: usize,
        len: usize,
    },
}

/// Keyframe insertion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyframeError {
    #[error("position {position} is out of range. Video has {length} frames (valid range: 0-{})", .length.saturating_sub(1))]
    PositionOutOfRange { position: usize, length: usize },

    #[error("duplicate position {position}. Each position must be unique")]
    DuplicatePosition { position: usize },

    #[error("keyframe count ({keyframes}) does not match position count ({positions})")]
    CountMismatch { keyframes: usize, positions: usize },

    #[error("{count} keyframes exceeds the maximum of {max} per call")]
    TooManyKeyframes { count: usize, max: usize },

    #[error("{count} positions exceeds the maximum of {max} per call")]
    TooManyPositions { count: usize, max: usize },

    #[error("no keyframes provided. Supply at least one keyframe image")]
    NoKeyframes,

    #[error("keyframe mask value {value} is outside 0.0-1.0")]
    MaskValueOutOfRange { value: f32 },
}

/// Mask range editing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("frame {index} in {field} is out of range. Sequence has {length} frames (valid range: 0-{})", .length.saturating_sub(1))]
    IndexOutOfRange {
        field: String,
        index: usize,
        length: usize,
    },

    #[error("overlapping frames between white_range and black_range: [{}]. Each frame can only be white OR black", format_frame_list(.frames))]
    Overlap { frames: Vec<usize> },
}

/// Sequence splicing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("offset {offset} places all {length} frames of sequence2 before the start of the timeline")]
    InvalidOffset { offset: i64, length: usize },

    #[error("offset {offset} exceeds the maximum of {max}")]
    OffsetTooLarge { offset: i64, max: u32 },
}

/// Node registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("Node not found: {name}")]
    NotFound { name: String },

    #[error("{node}: missing required input '{input}'")]
    MissingInput { node: String, input: String },

    #[error("{node}: input '{input}' expects {expected}, got {found}")]
    TypeMismatch {
        node: String,
        input: String,
        expected: String,
        found: String,
    },

    #[error("{node}: unknown input '{input}'")]
    UnknownInput { node: String, input: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using VaceError
pub type Result<T> = std::result::Result<T, VaceError>;

/// Flat classification of every failure the library can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Duplicate,
    DuplicatePosition,
    PositionOutOfRange,
    IndexOutOfRange,
    CountMismatch,
    ResolutionMismatch,
    Overlap,
    InvalidOffset,
    EmptySequence,
    InvalidParameter,
    Node,
    Config,
    Io,
    Other,
}

impl VaceError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Range(RangeError::Duplicate { .. }) => ErrorKind::Duplicate,
            Self::Range(_) => ErrorKind::Format,
            Self::Sequence(SequenceError::Empty { .. }) => ErrorKind::EmptySequence,
            Self::Sequence(SequenceError::InvalidBuffer { .. }) => ErrorKind::InvalidParameter,
            Self::Sequence(SequenceError::LoadFailed { .. }) => ErrorKind::Io,
            Self::Sequence(_) => ErrorKind::ResolutionMismatch,
            Self::Keyframe(err) => match err {
                KeyframeError::PositionOutOfRange { .. } => ErrorKind::PositionOutOfRange,
                KeyframeError::DuplicatePosition { .. } => ErrorKind::DuplicatePosition,
                KeyframeError::MaskValueOutOfRange { .. } => ErrorKind::InvalidParameter,
                KeyframeError::CountMismatch { .. }
                | KeyframeError::TooManyKeyframes { .. }
                | KeyframeError::TooManyPositions { .. }
                | KeyframeError::NoKeyframes => ErrorKind::CountMismatch,
            },
            Self::Mask(MaskError::IndexOutOfRange { .. }) => ErrorKind::IndexOutOfRange,
            Self::Mask(MaskError::Overlap { .. }) => ErrorKind::Overlap,
            Self::Splice(_) => ErrorKind::InvalidOffset,
            Self::Node(_) => ErrorKind::Node,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) | Self::Image(_) => ErrorKind::Io,
            Self::Generic(_) => ErrorKind::Other,
        }
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Sequence(SequenceError::LoadFailed { .. })
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Sequence(SequenceError::ResolutionMismatch { .. }) => {
                format!("{}. Resize the inputs to a common resolution first.", self)
            }
            Self::Keyframe(KeyframeError::CountMismatch { .. }) => {
                format!("{}. Provide exactly one keyframe per position.", self)
            }
            Self::Keyframe(KeyframeError::TooManyKeyframes { .. }) => {
                format!("{}. Chain several keyframe inserts for more keyframes.", self)
            }
            Self::Mask(MaskError::Overlap { .. }) => {
                format!("{}. Adjust the ranges to remove the overlap.", self)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

/// Render at most ten frame indices, then the total
fn format_frame_list(frames: &[usize]) -> String {
    let shown: Vec<String> = frames.iter().take(10).map(|f| f.to_string()).collect();
    if frames.len() > 10 {
        format!("{}... ({} total)", shown.join(", "), frames.len())
    } else {
        shown.join(", ")
    }
}
