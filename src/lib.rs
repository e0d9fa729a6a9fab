//! Melody/accompaniment separation for polyphonic recordings.
//!
//! Descant splits a mixture into the dominant pitched line and
//! everything else by building a binary time-frequency mask around the
//! harmonics of an f0 contour, sharpening it with onset-aware dilation
//! and morphological refinement, and applying it to the complex
//! spectrogram before inverting both halves back to audio.
//!
//! # Quick Start
//!
//! ```rust
//! use descant::io;
//! use descant::pipeline::{separate, SeparatorConfig};
//!
//! // A 440 Hz line over silence separates into itself and (near) nothing.
//! let signal = io::tone(440.0, 44100, 1.0);
//! let result = separate(&signal, &SeparatorConfig::default()).unwrap();
//! assert_eq!(result.melody.len(), signal.len());
//! assert_eq!(result.accompaniment.len(), signal.len());
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`spectrum`] | STFT/ISTFT pair and the bin-frequency grid |
//! | [`pitch`] | Bundled YIN f0 tracker (half-hop contract) |
//! | [`contour`] | Alignment of raw f0 tracks to the frame grid |
//! | [`mask`] | Harmonic melodic mask construction |
//! | [`novelty`] | Spectral novelty and onset-scaled dilation |
//! | [`morphology`] | Hit-or-miss refinement and binary dilation |
//! | [`separate`] | Mask application to the complex spectrogram |
//! | [`pipeline`] | End-to-end separation driver |
//! | [`io`] | Audio load/save, resampling, tone generator |
//! | [`window`] | Analysis window functions |
//! | [`fft`] | Cached FFT plans |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Each pipeline stage checks its own
//! invariants at the boundary (contour/frame alignment, novelty
//! degeneracy, structuring-element fit, mask binariness) and reports
//! the violated invariant with the offending numbers. Nothing proceeds
//! on corrupted data and nothing substitutes silent defaults.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` | Parallelize STFT frame computation with rayon |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod contour;
pub mod fft;
pub mod io;
pub mod mask;
pub mod morphology;
pub mod novelty;
pub mod pipeline;
pub mod pitch;
pub mod separate;
pub mod spectrum;
pub mod utils;
pub mod window;
