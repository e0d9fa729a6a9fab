//! Onset-aware adaptive dilation of the melodic mask.
//!
//! Note attacks spread energy across many bins at once, and a mask cut
//! tightly around the harmonic series misses that splash. This stage
//! scores each frame with a spectral novelty function (how much spectral
//! energy appeared since the previous frame) and dilates the mask
//! vertically, more aggressively where the novelty is high.

use ndarray::Array2;
use num_complex::Complex32;

/// Default ceiling, in bins, of the per-frame dilation kernel.
pub const DEFAULT_MAX_DILATION: usize = 50;

/// Per-frame kernel height never drops below this.
const MIN_KERNEL: usize = 3;

/// Compute the normalized spectral novelty of a spectrogram.
///
/// Per frame: sum the positive entries of the forward difference of
/// `ln(1 + |D|)` across bins (energy increase only; decay is ignored),
/// subtract `mean + std` of the resulting sequence and clip at zero so
/// only clear onset peaks survive, smooth with a length-3 moving sum,
/// and rescale by the maximum into [0, 1].
///
/// # Errors
/// [`crate::Error::DegenerateNovelty`] when the curve is flat (maximum
/// zero) and there is nothing to normalize by. Callers enhancing a mask
/// should skip the enhancement rather than divide by zero.
pub fn spectral_novelty(spectrogram: &Array2<Complex32>) -> crate::Result<Vec<f32>> {
    let n_bins = spectrogram.shape()[0];
    let n_frames = spectrogram.shape()[1];
    if n_frames == 0 {
        return Err(crate::Error::DegenerateNovelty);
    }

    // Positive spectral flux of the log-compressed magnitude. The last
    // frame has no successor and scores zero.
    let mut raw = vec![0.0f32; n_frames];
    for t in 0..n_frames.saturating_sub(1) {
        let mut sum = 0.0f32;
        for b in 0..n_bins {
            let cur = (1.0 + spectrogram[(b, t)].norm()).ln();
            let next = (1.0 + spectrogram[(b, t + 1)].norm()).ln();
            let diff = next - cur;
            if diff >= 0.0 {
                sum += diff;
            }
        }
        raw[t] = sum;
    }

    // Keep only peaks that clear mean + std.
    let mean = raw.iter().sum::<f32>() / n_frames as f32;
    let var = raw.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n_frames as f32;
    let floor = mean + var.sqrt();
    let clipped: Vec<f32> = raw.iter().map(|&v| (v - floor).max(0.0)).collect();

    // Length-3 moving sum, same-length output.
    let mut smoothed = vec![0.0f32; n_frames];
    for t in 0..n_frames {
        let lo = t.saturating_sub(1);
        let hi = (t + 1).min(n_frames - 1);
        smoothed[t] = clipped[lo..=hi].iter().sum();
    }

    let max = smoothed.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Err(crate::Error::DegenerateNovelty);
    }
    for v in smoothed.iter_mut() {
        *v /= max;
    }
    Ok(smoothed)
}

/// Dilate a melodic mask vertically, frame by frame, scaled by novelty.
///
/// Each frame `t` gets a 1-frame-wide kernel of height
/// `max(3, round(max_dilation * novelty[t]))`; every marked bin in the
/// column spreads over that many neighboring bins, centered. Columns are
/// independent, so boundary frames need no special casing beyond their
/// own width-1 window.
///
/// # Errors
/// * [`crate::Error::ShapeMismatch`] when the mask and spectrogram
///   dimensions differ.
/// * [`crate::Error::DegenerateNovelty`] propagated from
///   [`spectral_novelty`]; the pipeline treats it by skipping this stage.
pub fn dilate_by_novelty(
    spectrogram: &Array2<Complex32>,
    mask: &Array2<f32>,
    max_dilation: usize,
) -> crate::Result<Array2<f32>> {
    if spectrogram.shape() != mask.shape() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{}x{}", spectrogram.shape()[0], spectrogram.shape()[1]),
            got: format!("{}x{}", mask.shape()[0], mask.shape()[1]),
        });
    }

    let novelty = spectral_novelty(spectrogram)?;
    let n_bins = mask.shape()[0];
    let n_frames = mask.shape()[1];
    let mut out = mask.clone();

    for (t, &score) in novelty.iter().enumerate() {
        let height = ((max_dilation as f32 * score).round() as usize).max(MIN_KERNEL);
        // Centered vertical kernel: a bin at b covers
        // b - height/2 ..= b + (height - 1 - height/2).
        let up = height / 2;
        let down = height - 1 - up;

        for b in 0..n_bins {
            if mask[(b, t)] == 0.0 {
                continue;
            }
            let lo = b.saturating_sub(up);
            let hi = (b + down).min(n_bins - 1);
            for r in lo..=hi {
                out[(r, t)] = 1.0;
            }
        }
    }

    Ok(out)
}
