//! Fundamental-frequency tracking for the separation pipeline.
//!
//! The mask builder only consumes a per-frame f0 contour; where that
//! contour comes from is a pluggable concern. This module bundles a YIN
//! tracker as the default source, emitting estimates on a half-hop grid
//! (two per spectrogram frame) so [`crate::contour::align_to_frames`]
//! can decimate it onto the frame rate. Callers with their own tracker
//! can skip this module entirely and feed a raw track to
//! [`crate::pipeline::separate_with_contour`].

use crate::utils::valid_audio;

/// Pitch bounds and voicing threshold handed to the tracker untouched.
///
/// Defaults match the melodic range the separator was tuned for:
/// 100-800 Hz, the band a lead voice or instrument occupies.
#[derive(Debug, Clone, Copy)]
pub struct PitchConfig {
    /// Minimum admissible fundamental in Hz.
    pub fmin: f32,
    /// Maximum admissible fundamental in Hz.
    pub fmax: f32,
    /// CMNDF aperiodicity threshold; frames with no trough below it are
    /// reported unvoiced.
    pub threshold: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: 100.0,
            fmax: 800.0,
            threshold: 0.1,
        }
    }
}

/// Track the fundamental frequency with YIN.
///
/// Frames are centered (the signal is zero-padded by half a frame on
/// each side, mirroring the forward transform), taken every `hop`
/// samples. Unvoiced frames are reported as `0.0`; downstream contour
/// alignment turns non-positive estimates into the explicit unvoiced
/// marker.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `sr` - Sample rate
/// * `frame_length` - Analysis frame length in samples
/// * `hop` - Samples between estimates (half the spectrogram hop for the
///   two-estimates-per-frame contract)
/// * `config` - Pitch bounds and voicing threshold
pub fn track(
    y: &[f32],
    sr: u32,
    frame_length: usize,
    hop: usize,
    config: &PitchConfig,
) -> crate::Result<Vec<f32>> {
    valid_audio(y)?;
    if frame_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "frame_length",
            value: 0,
            reason: "must be > 0",
        });
    }
    if hop == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop",
            value: 0,
            reason: "must be > 0",
        });
    }
    if config.fmin <= 0.0 || config.fmax <= config.fmin {
        return Err(crate::Error::InvalidParameter {
            name: "pitch bounds",
            value: format!("fmin={}, fmax={}", config.fmin, config.fmax),
            reason: "need 0 < fmin < fmax".to_string(),
        });
    }

    let pad = frame_length / 2;
    let mut padded = vec![0.0f32; y.len() + 2 * pad];
    padded[pad..pad + y.len()].copy_from_slice(y);

    let n_frames = (padded.len() - frame_length) / hop + 1;
    let mut f0 = vec![0.0f32; n_frames];

    let tau_min = ((sr as f32 / config.fmax).max(1.0)) as usize;
    let tau_max = ((sr as f32 / config.fmin).min(frame_length as f32 / 2.0)) as usize;
    if tau_min >= tau_max {
        return Err(crate::Error::InvalidParameter {
            name: "pitch bounds",
            value: format!("fmin={}, fmax={}", config.fmin, config.fmax),
            reason: format!(
                "lag range collapses for frame_length {frame_length} at {sr} Hz"
            ),
        });
    }

    for (frame_idx, f0_val) in f0.iter_mut().enumerate() {
        let start = frame_idx * hop;
        let frame = &padded[start..start + frame_length];

        // Difference function.
        let mut diff = vec![0.0f32; tau_max];
        for tau in 1..tau_max {
            let mut sum = 0.0f32;
            for j in 0..(frame_length - tau) {
                let delta = frame[j] - frame[j + tau];
                sum += delta * delta;
            }
            diff[tau] = sum;
        }

        // Cumulative mean normalized difference (CMNDF).
        let mut cmndf = vec![1.0f32; tau_max];
        let mut running_sum = 0.0f32;
        for tau in 1..tau_max {
            running_sum += diff[tau];
            if running_sum > 0.0 {
                cmndf[tau] = diff[tau] * (tau as f32) / running_sum;
            } else {
                cmndf[tau] = 1.0;
            }
        }

        // First trough under the threshold inside the admissible lag range.
        let mut tau_estimate = 0;
        for tau in tau_min..tau_max {
            if cmndf[tau] < config.threshold {
                if tau + 1 < tau_max && cmndf[tau] < cmndf[tau + 1] {
                    tau_estimate = tau;
                    break;
                }
            }
        }

        if tau_estimate > 0 {
            // Parabolic interpolation for sub-sample lag accuracy.
            let estimate = if tau_estimate < tau_max - 1 {
                let s0 = cmndf[tau_estimate - 1];
                let s1 = cmndf[tau_estimate];
                let s2 = cmndf[tau_estimate + 1];
                let denom = s0 - 2.0 * s1 + s2;
                let adjustment = if denom.abs() > 1e-12 {
                    0.5 * (s0 - s2) / denom
                } else {
                    0.0
                };
                let tau_refined = tau_estimate as f32 + adjustment;
                if tau_refined > 0.0 {
                    sr as f32 / tau_refined
                } else {
                    0.0
                }
            } else {
                sr as f32 / tau_estimate as f32
            };

            if estimate >= config.fmin && estimate <= config.fmax {
                *f0_val = estimate;
            }
        }
    }

    Ok(f0)
}
