//! Construction of the melodic time-frequency mask.
//!
//! For every voiced frame the fundamental and its harmonics are marked
//! as a short vertical band of bins; unvoiced frames leave their column
//! untouched. The result is a binary `Array2<f32>` the shape of the
//! spectrogram it will multiply.

use crate::contour::FrequencyContour;
use ndarray::Array2;

/// Lowest bin the mask may touch. Bins below this are dominated by
/// near-DC, non-pitched energy and are never marked.
pub const MIN_BIN: usize = 6;

/// How much of the harmonic series the mask covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskPreset {
    /// The fundamental alone, one-bin band.
    Fundamental,
    /// Fundamental plus harmonics, one-bin band.
    Harmonics,
    /// Fundamental plus harmonics with a widened band.
    WideHarmonics,
}

impl MaskPreset {
    /// Resolve the preset to concrete parameters, once, before the mask
    /// loop runs.
    pub fn resolve(self) -> MaskConfig {
        match self {
            MaskPreset::Fundamental => MaskConfig {
                harmonic_count: 2,
                width: 1,
            },
            MaskPreset::Harmonics => MaskConfig {
                harmonic_count: 20,
                width: 1,
            },
            MaskPreset::WideHarmonics => MaskConfig::default(),
        }
    }

    /// Parse the numeric selector used by the command line (1/2/3).
    pub fn from_selector(kind: u8) -> Option<Self> {
        match kind {
            1 => Some(MaskPreset::Fundamental),
            2 => Some(MaskPreset::Harmonics),
            3 => Some(MaskPreset::WideHarmonics),
            _ => None,
        }
    }
}

/// Parameters of the harmonic mask.
#[derive(Debug, Clone, Copy)]
pub struct MaskConfig {
    /// Harmonic multiples considered per voiced frame: k = 1..harmonic_count.
    pub harmonic_count: usize,
    /// Half-width in bins of the band marked around each harmonic
    /// (offsets -(width-1)..=width, a symmetric window of 2*width bins).
    pub width: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            harmonic_count: 20,
            width: 2,
        }
    }
}

/// True when `bin` lies in the maskable band `[MIN_BIN, n_bins)`.
#[inline]
fn in_band(bin: isize, n_bins: usize) -> bool {
    bin >= MIN_BIN as isize && bin < n_bins as isize
}

/// Build the binary melodic mask for a spectrogram of `shape`
/// (bins, frames) from a frame-aligned contour.
///
/// For each voiced frame `i` with fundamental `f`, each harmonic `k`
/// lands at `round(k * f / bin_hz)` and the band of offsets
/// `-(width-1)..=width` around it is set to one, clamped to the
/// maskable bin range. Unvoiced frames contribute nothing.
///
/// # Errors
/// * [`crate::Error::LengthMismatch`] when the contour is not one entry
///   per frame.
/// * [`crate::Error::InvalidParameter`] when `bin_hz` is not positive.
pub fn melodic_mask(
    shape: (usize, usize),
    contour: &FrequencyContour,
    bin_hz: f32,
    config: &MaskConfig,
) -> crate::Result<Array2<f32>> {
    let (n_bins, n_frames) = shape;
    if contour.len() != n_frames {
        return Err(crate::Error::LengthMismatch {
            expected: n_frames,
            got: contour.len(),
        });
    }
    if bin_hz <= 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "bin_hz",
            value: bin_hz.to_string(),
            reason: "must be > 0".to_string(),
        });
    }

    let mut mask = Array2::<f32>::zeros(shape);
    let lo = 1 - config.width as isize;
    let hi = config.width as isize;

    for (i, f0) in contour.iter().enumerate() {
        let f = match f0 {
            Some(f) => *f,
            None => continue,
        };
        for k in 1..config.harmonic_count {
            let center = (k as f32 * f / bin_hz).round() as isize;
            for l in lo..=hi {
                let bin = center + l;
                if in_band(bin, n_bins) {
                    mask[(bin as usize, i)] = 1.0;
                }
            }
        }
    }

    Ok(mask)
}
