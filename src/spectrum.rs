use crate::fft::FftPlan;
use crate::window;
use ndarray::Array2;
use num_complex::Complex32;

/// Configuration for the forward/inverse short-time Fourier transform.
///
/// Defaults follow the separation pipeline: 2048-sample windows with a
/// quarter-window hop at 44100 Hz.
#[derive(Debug, Clone)]
pub struct StftConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub win_length: usize,
    pub center: bool,
    pub window: Vec<f32>,
    pub pad_mode: PadMode,
}

#[derive(Debug, Clone, Copy)]
pub enum PadMode {
    Constant,
    Reflect,
}

impl Default for StftConfig {
    fn default() -> Self {
        let n_fft = 2048;
        let win_length = 2048;
        Self {
            n_fft,
            hop_length: n_fft / 4,
            win_length,
            center: true,
            window: window::hann(win_length),
            pad_mode: PadMode::Constant,
        }
    }
}

/// Physical width of one frequency bin in Hz: `sample_rate / n_fft`.
///
/// Harmonic `k` of a fundamental `f` lands at bin `round(k * f / bin_hz)`.
pub fn bin_hz(sample_rate: u32, n_fft: usize) -> f32 {
    sample_rate as f32 / n_fft as f32
}

fn pad_window(window: &[f32], n_fft: usize) -> Vec<f32> {
    if window.len() == n_fft {
        return window.to_vec();
    }
    let mut padded = vec![0.0f32; n_fft];
    let start = (n_fft - window.len()) / 2;
    padded[start..start + window.len()].copy_from_slice(window);
    padded
}

fn reflect_index(mut idx: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = len as isize - 1;
    while idx < 0 || idx > last {
        if idx < 0 {
            idx = -idx;
        }
        if idx > last {
            idx = 2 * last - idx;
        }
    }
    idx as usize
}

fn pad_center(y: &[f32], n_fft: usize, center: bool, pad_mode: PadMode) -> Vec<f32> {
    if !center {
        return y.to_vec();
    }
    let pad = n_fft / 2;
    let mut out = vec![0.0f32; y.len() + 2 * pad];
    if y.is_empty() {
        return out;
    }
    match pad_mode {
        PadMode::Constant => {
            out[pad..pad + y.len()].copy_from_slice(y);
        }
        PadMode::Reflect => {
            for (i, out_val) in out.iter_mut().enumerate() {
                let src_idx = i as isize - pad as isize;
                *out_val = y[reflect_index(src_idx, y.len())];
            }
        }
    }
    out
}

#[inline]
fn compute_frame(
    frame: usize,
    padded: &[f32],
    window: &[f32],
    fft: &FftPlan,
    hop_length: usize,
    n_fft: usize,
    n_freq: usize,
) -> Vec<Complex32> {
    let start = frame * hop_length;
    let mut buffer = vec![Complex32::new(0.0, 0.0); n_fft];
    for i in 0..n_fft {
        let sample = padded.get(start + i).copied().unwrap_or(0.0);
        buffer[i].re = sample * window[i];
    }
    fft.forward(&mut buffer);
    buffer.truncate(n_freq);
    buffer
}

/// Compute the Short-Time Fourier Transform (STFT).
///
/// # Arguments
/// * `y` - Input audio signal
/// * `config` - STFT configuration (FFT size, hop length, window, etc.)
///
/// # Returns
/// Complex spectrogram of shape (n_freq, n_frames) where n_freq = n_fft/2 + 1
///
/// # Errors
/// Returns an error if the audio is invalid or if n_fft/hop_length is zero.
pub fn stft(y: &[f32], config: &StftConfig) -> crate::Result<Array2<Complex32>> {
    crate::utils::valid_audio(y)?;
    if config.n_fft == 0 {
        return Err(crate::Error::InvalidSize {
            name: "n_fft",
            value: 0,
            reason: "must be > 0",
        });
    }
    if config.hop_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop_length",
            value: 0,
            reason: "must be > 0",
        });
    }

    let window = pad_window(&config.window, config.n_fft);
    let padded = pad_center(y, config.n_fft, config.center, config.pad_mode);
    let n_frames = if padded.len() < config.n_fft {
        0
    } else {
        (padded.len() - config.n_fft) / config.hop_length + 1
    };

    let n_freq = config.n_fft / 2 + 1;
    let fft = FftPlan::new(config.n_fft);

    let frame_results: Vec<Vec<Complex32>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..n_frames)
                .into_par_iter()
                .map(|frame| {
                    compute_frame(
                        frame,
                        &padded,
                        &window,
                        &fft,
                        config.hop_length,
                        config.n_fft,
                        n_freq,
                    )
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..n_frames)
                .map(|frame| {
                    compute_frame(
                        frame,
                        &padded,
                        &window,
                        &fft,
                        config.hop_length,
                        config.n_fft,
                        n_freq,
                    )
                })
                .collect()
        }
    };

    let mut stft_matrix = Array2::<Complex32>::zeros((n_freq, n_frames));
    for (frame, result) in frame_results.iter().enumerate() {
        for (f, &val) in result.iter().enumerate() {
            stft_matrix[(f, frame)] = val;
        }
    }

    Ok(stft_matrix)
}

/// Compute the Inverse Short-Time Fourier Transform (ISTFT).
///
/// Reconstructs a time-domain signal from a (possibly masked) complex
/// spectrogram using overlap-add synthesis. Amplitude is not renormalized
/// beyond the window-sum compensation: a masked spectrum comes back at
/// exactly the energy the mask left in it.
///
/// # Arguments
/// * `stft_matrix` - Complex spectrogram (n_freq x n_frames)
/// * `config` - STFT configuration (must match the forward STFT)
/// * `length` - Optional output signal length (truncates if provided)
///
/// # Errors
/// Returns an error if the spectrogram is empty.
pub fn istft(
    stft_matrix: &Array2<Complex32>,
    config: &StftConfig,
    length: Option<usize>,
) -> crate::Result<Vec<f32>> {
    let n_freq = stft_matrix.shape().first().copied().unwrap_or(0);
    let n_frames = stft_matrix.shape().get(1).copied().unwrap_or(0);
    if n_freq == 0 || n_frames == 0 {
        return Err(crate::Error::InvalidSize {
            name: "stft_matrix",
            value: 0,
            reason: "spectrogram must be non-empty",
        });
    }

    let n_fft = (n_freq - 1) * 2;
    let window = pad_window(&config.window, n_fft);

    let mut y = vec![0.0f32; n_frames * config.hop_length + n_fft];
    let mut window_sums = vec![0.0f32; y.len()];
    let fft = FftPlan::new(n_fft);

    for frame in 0..n_frames {
        let start = frame * config.hop_length;
        let mut buffer = vec![Complex32::new(0.0, 0.0); n_fft];

        for f in 0..n_freq {
            buffer[f] = stft_matrix[(f, frame)];
        }
        for f in 1..(n_freq - 1) {
            buffer[n_fft - f] = stft_matrix[(f, frame)].conj();
        }

        fft.inverse(&mut buffer);

        for i in 0..n_fft {
            let w = window[i];
            let sample = buffer[i].re * w;
            let idx = start + i;
            y[idx] += sample;
            window_sums[idx] += w * w;
        }
    }

    for i in 0..y.len() {
        if window_sums[i] > 1e-8 {
            y[i] /= window_sums[i];
        }
    }

    let mut out = if config.center {
        let pad = n_fft / 2;
        if y.len() > 2 * pad {
            y[pad..y.len() - pad].to_vec()
        } else {
            y
        }
    } else {
        y
    };

    if let Some(len) = length {
        out.truncate(len);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io;
    use approx::assert_relative_eq;

    #[test]
    fn test_bin_hz_default_grid() {
        // 44100 / 2048: the grid the melodic mask is built on.
        assert_relative_eq!(bin_hz(44100, 2048), 21.533203, epsilon = 1e-3);
    }

    #[test]
    fn test_stft_shape() {
        let y = io::tone(440.0, 44100, 0.5);
        let cfg = StftConfig::default();
        let s = stft(&y, &cfg).unwrap();
        assert_eq!(s.shape()[0], cfg.n_fft / 2 + 1);
        assert_eq!(s.shape()[1], y.len() / cfg.hop_length + 1);
    }

    #[test]
    fn test_stft_peak_at_tone_bin() {
        let sr = 44100;
        let y = io::tone(440.0, sr, 0.5);
        let cfg = StftConfig::default();
        let s = stft(&y, &cfg).unwrap();

        let mid = s.shape()[1] / 2;
        let mut peak_bin = 0;
        let mut peak = 0.0f32;
        for f in 0..s.shape()[0] {
            let m = s[(f, mid)].norm();
            if m > peak {
                peak = m;
                peak_bin = f;
            }
        }
        let expected = (440.0 / bin_hz(sr, cfg.n_fft)).round() as usize;
        assert!(
            peak_bin.abs_diff(expected) <= 1,
            "peak at bin {peak_bin}, expected near {expected}"
        );
    }

    #[test]
    fn test_stft_istft_roundtrip_cosine_window() {
        let sr = 44100;
        let y = io::tone(220.0, sr, 0.25);
        let mut cfg = StftConfig::default();
        cfg.window = crate::window::cosine(cfg.win_length);

        let s = stft(&y, &cfg).unwrap();
        let rec = istft(&s, &cfg, Some(y.len())).unwrap();
        assert_eq!(rec.len(), y.len());

        let mut mse = 0.0f32;
        for i in 0..y.len() {
            let d = y[i] - rec[i];
            mse += d * d;
        }
        mse /= y.len() as f32;
        assert!(mse < 1e-4, "roundtrip mse {mse}");
    }

    #[test]
    fn test_stft_rejects_zero_hop() {
        let y = vec![0.1f32; 4096];
        let mut cfg = StftConfig::default();
        cfg.hop_length = 0;
        assert!(stft(&y, &cfg).is_err());
    }

    #[test]
    fn test_istft_rejects_empty() {
        let s = Array2::<Complex32>::zeros((0, 0));
        assert!(istft(&s, &StftConfig::default(), None).is_err());
    }
}
