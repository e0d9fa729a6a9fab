//! End-to-end separation: signal in, melody and accompaniment out.
//!
//! Stage order follows the mask data flow: forward transform, pitch
//! tracking, contour alignment, harmonic mask, optional novelty
//! dilation, optional hit-or-miss refinement, mask application, inverse
//! transform. Every stage is a pure function over its own matrices;
//! nothing is shared between pipeline runs.

use crate::contour::align_to_frames;
use crate::mask::{melodic_mask, MaskConfig, MaskPreset};
use crate::morphology::{hit_miss_refine, StructuringElement};
use crate::novelty::{dilate_by_novelty, DEFAULT_MAX_DILATION};
use crate::pitch::{self, PitchConfig};
use crate::separate::separate_spectrogram;
use crate::spectrum::{bin_hz, istft, stft, StftConfig};
use crate::window::{get_window, WindowType};
use log::{debug, warn};
use ndarray::Array2;
use num_complex::Complex32;

/// Which refinement output drives the final separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefinedMask {
    /// The raw hit-or-miss onsets.
    Hits,
    /// The dilated onsets alone.
    Dilated,
    /// The union of dilated onsets and the harmonic mask.
    #[default]
    Combined,
}

/// Full configuration of one separation run.
#[derive(Debug, Clone)]
pub struct SeparatorConfig {
    pub sample_rate: u32,
    pub n_fft: usize,
    pub hop_length: usize,
    pub window: WindowType,
    /// Bounds and voicing threshold handed to the pitch tracker untouched.
    pub pitch: PitchConfig,
    /// Harmonic count and band width of the melodic mask. Set directly
    /// or through [`SeparatorConfig::with_preset`].
    pub mask: MaskConfig,
    /// Ceiling of the novelty-scaled dilation kernel, in bins.
    pub max_dilation: usize,
    /// Run the onset-aware novelty dilation stage.
    pub novelty_dilation: bool,
    /// Run the hit-or-miss refinement stage.
    pub hit_miss: bool,
    pub refined: RefinedMask,
    pub hit_pattern: StructuringElement,
    pub dilate_pattern: StructuringElement,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        let n_fft = 2048;
        Self {
            sample_rate: 44100,
            n_fft,
            hop_length: n_fft / 4,
            window: WindowType::Cosine,
            pitch: PitchConfig::default(),
            mask: MaskPreset::WideHarmonics.resolve(),
            max_dilation: DEFAULT_MAX_DILATION,
            novelty_dilation: false,
            hit_miss: true,
            refined: RefinedMask::Combined,
            hit_pattern: StructuringElement::onset_find(),
            dilate_pattern: StructuringElement::trailing_dilate(),
        }
    }
}

impl SeparatorConfig {
    /// Apply one of the three mask presets.
    pub fn with_preset(mut self, preset: MaskPreset) -> Self {
        self.mask = preset.resolve();
        self
    }

    fn stft_config(&self) -> StftConfig {
        StftConfig {
            n_fft: self.n_fft,
            hop_length: self.hop_length,
            win_length: self.n_fft,
            center: true,
            window: get_window(self.window, self.n_fft),
            pad_mode: crate::spectrum::PadMode::Constant,
        }
    }
}

/// The two reconstructed streams of one separation run.
#[derive(Debug, Clone)]
pub struct Separation {
    pub melody: Vec<f32>,
    pub accompaniment: Vec<f32>,
}

/// Separate a signal using the bundled pitch tracker.
///
/// Tracks f0 on the half-hop grid, aligns it to the spectrogram frames,
/// and runs the mask pipeline. See [`separate_with_contour`] for
/// callers bringing their own tracker output.
pub fn separate(y: &[f32], config: &SeparatorConfig) -> crate::Result<Separation> {
    let stft_cfg = config.stft_config();
    let spectrogram = stft(y, &stft_cfg)?;
    let n_frames = spectrogram.shape()[1];

    debug!(
        "spectrogram {}x{}, tracking f0 in [{}, {}] Hz",
        spectrogram.shape()[0],
        n_frames,
        config.pitch.fmin,
        config.pitch.fmax
    );

    let mut raw = pitch::track(
        y,
        config.sample_rate,
        config.n_fft,
        config.hop_length / 2,
        &config.pitch,
    )?;
    // The tracker grid is half-hop centered, which lands one estimate
    // past what alignment consumes; trim so decimation plus the trailing
    // unvoiced entry meets the frame count exactly.
    raw.truncate(2 * n_frames.saturating_sub(1));

    separate_masked(y.len(), &spectrogram, &raw, config)
}

/// Separate a signal with an externally produced f0 track.
///
/// `raw_contour` follows the tracker contract: one estimate per half
/// frame, non-positive meaning unvoiced. Misaligned tracks fail with
/// [`crate::Error::LengthMismatch`] naming both lengths.
pub fn separate_with_contour(
    y: &[f32],
    raw_contour: &[f32],
    config: &SeparatorConfig,
) -> crate::Result<Separation> {
    let stft_cfg = config.stft_config();
    let spectrogram = stft(y, &stft_cfg)?;
    separate_masked(y.len(), &spectrogram, raw_contour, config)
}

/// Build the final mask for a spectrogram from a raw contour.
///
/// Exposed so callers can inspect or post-process the mask before
/// applying it themselves.
pub fn build_mask(
    spectrogram: &Array2<Complex32>,
    raw_contour: &[f32],
    config: &SeparatorConfig,
) -> crate::Result<Array2<f32>> {
    let n_bins = spectrogram.shape()[0];
    let n_frames = spectrogram.shape()[1];

    let contour = align_to_frames(raw_contour, n_frames)?;
    let grid = bin_hz(config.sample_rate, config.n_fft);
    let mut mask = melodic_mask((n_bins, n_frames), &contour, grid, &config.mask)?;
    debug!("harmonic mask covers {} cells", mask.sum() as usize);

    if config.novelty_dilation {
        match dilate_by_novelty(spectrogram, &mask, config.max_dilation) {
            Ok(dilated) => mask = dilated,
            Err(crate::Error::DegenerateNovelty) => {
                warn!("spectral novelty curve is flat; skipping onset dilation");
            }
            Err(e) => return Err(e),
        }
    }

    if config.hit_miss {
        let refined = hit_miss_refine(&mask, &config.hit_pattern, &config.dilate_pattern)?;
        mask = match config.refined {
            RefinedMask::Hits => refined.hits,
            RefinedMask::Dilated => refined.dilated,
            RefinedMask::Combined => refined.combined,
        };
    }

    Ok(mask)
}

fn separate_masked(
    signal_len: usize,
    spectrogram: &Array2<Complex32>,
    raw_contour: &[f32],
    config: &SeparatorConfig,
) -> crate::Result<Separation> {
    let mask = build_mask(spectrogram, raw_contour, config)?;
    let (melody_spec, accomp_spec) = separate_spectrogram(spectrogram, &mask)?;

    let stft_cfg = config.stft_config();
    let melody = istft(&melody_spec, &stft_cfg, Some(signal_len))?;
    let accompaniment = istft(&accomp_spec, &stft_cfg, Some(signal_len))?;

    Ok(Separation {
        melody,
        accompaniment,
    })
}
