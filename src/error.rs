/// Crate-level error type for the descant separation library.
///
/// Every pipeline failure reflects malformed input, not a transient
/// condition: the stage that detects a broken invariant reports it
/// immediately and nothing downstream runs on corrupted data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Contour length does not line up with the spectrogram frame count.
    #[error("contour length {got} does not match frame count {expected}")]
    LengthMismatch { expected: usize, got: usize },

    /// The novelty curve is flat, so there is no maximum to normalize by.
    /// Callers enhancing a mask should skip the enhancement instead.
    #[error("spectral novelty curve is flat (no onsets to normalize by)")]
    DegenerateNovelty,

    /// A structuring element does not fit inside the mask it is applied to.
    #[error("structuring element {rows}x{cols} does not fit mask {mask_rows}x{mask_cols}")]
    InvalidStructuringElement {
        rows: usize,
        cols: usize,
        mask_rows: usize,
        mask_cols: usize,
    },

    /// A separation mask holds a value other than 0 or 1.
    #[error("mask value {value} at bin {bin}, frame {frame} is not binary")]
    InvalidMask { value: f32, bin: usize, frame: usize },

    /// Input array has incorrect shape for the operation.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A required dimension is zero or invalid.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Audio data is empty when a non-empty signal was required.
    #[error("audio data is empty")]
    EmptyAudio,

    /// Audio data contains non-finite values (NaN or Inf).
    #[error("audio data contains non-finite values")]
    NonFiniteAudio,

    /// Audio I/O errors.
    #[error(transparent)]
    Audio(#[from] crate::io::AudioError),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for descant operations.
pub type Result<T> = std::result::Result<T, Error>;
