//! Alignment of a raw f0 track onto the spectrogram frame grid.
//!
//! Pitch trackers honoring the half-hop contract emit two estimates per
//! spectrogram frame, with non-positive values standing in for "no
//! reliable pitch". This module decimates such a track to one value per
//! frame and converts the sentinel into the one explicit unvoiced marker
//! the rest of the crate understands: `None`.

/// Per-frame fundamental estimates; `None` marks an unvoiced frame.
pub type FrequencyContour = Vec<Option<f32>>;

/// Align a raw half-hop f0 track with the spectrogram frames.
///
/// Keeps the even-offset samples (down-sample by two), appends one
/// trailing unvoiced entry for the final synthesis frame, and maps
/// non-positive estimates to `None` so a zero can never be mistaken for
/// a frequency downstream.
///
/// # Errors
/// [`crate::Error::LengthMismatch`] when the aligned contour does not
/// come out at exactly `n_frames` entries. The message carries both
/// numbers; there is no silent truncation or padding beyond the single
/// trailing entry.
pub fn align_to_frames(raw: &[f32], n_frames: usize) -> crate::Result<FrequencyContour> {
    let mut contour: FrequencyContour = raw
        .iter()
        .step_by(2)
        .map(|&f| if f > 0.0 { Some(f) } else { None })
        .collect();
    contour.push(None);

    if contour.len() != n_frames {
        return Err(crate::Error::LengthMismatch {
            expected: n_frames,
            got: contour.len(),
        });
    }
    Ok(contour)
}
