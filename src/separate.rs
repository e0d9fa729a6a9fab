//! Application of the final mask to the complex spectrogram.
//!
//! The melody spectrum takes the cells the mask selects; the
//! accompaniment takes the exact complement. Because
//! `mask + (1 - mask) == 1` everywhere, the two spectra sum back to the
//! input spectrogram cell for cell, so separation loses nothing.

use ndarray::Array2;
use num_complex::Complex32;

/// Split a spectrogram into melody and accompaniment spectra.
///
/// # Errors
/// * [`crate::Error::ShapeMismatch`] when mask and spectrogram
///   dimensions differ.
/// * [`crate::Error::InvalidMask`] when any mask cell is not exactly 0
///   or 1. A soft mask here would silently change the energy split, so
///   it is rejected at the boundary instead.
pub fn separate_spectrogram(
    spectrogram: &Array2<Complex32>,
    mask: &Array2<f32>,
) -> crate::Result<(Array2<Complex32>, Array2<Complex32>)> {
    if spectrogram.shape() != mask.shape() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{}x{}", spectrogram.shape()[0], spectrogram.shape()[1]),
            got: format!("{}x{}", mask.shape()[0], mask.shape()[1]),
        });
    }
    for ((bin, frame), &v) in mask.indexed_iter() {
        if v != 0.0 && v != 1.0 {
            return Err(crate::Error::InvalidMask {
                value: v,
                bin,
                frame,
            });
        }
    }

    let shape = (spectrogram.shape()[0], spectrogram.shape()[1]);
    let mut melody = Array2::<Complex32>::zeros(shape);
    let mut accompaniment = Array2::<Complex32>::zeros(shape);
    for (idx, &v) in spectrogram.indexed_iter() {
        let m = mask[idx];
        melody[idx] = v * m;
        accompaniment[idx] = v * (1.0 - m);
    }

    Ok((melody, accompaniment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spectrogram(rows: usize, cols: usize) -> Array2<Complex32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            Complex32::new((r as f32 * 0.3).sin(), (c as f32 * 0.7).cos())
        })
    }

    #[test]
    fn test_masks_partition_the_spectrogram() {
        let d = test_spectrogram(16, 12);
        let mask = Array2::from_shape_fn((16, 12), |(r, c)| ((r + c) % 3 == 0) as u8 as f32);
        let (melody, accomp) = separate_spectrogram(&d, &mask).unwrap();

        for (idx, &v) in d.indexed_iter() {
            let sum = melody[idx] + accomp[idx];
            assert_eq!(sum, v, "cells must sum back exactly at {idx:?}");
            // Each cell goes to exactly one stream.
            assert!(melody[idx] == v || melody[idx] == Complex32::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_zero_mask_routes_everything_to_accompaniment() {
        let d = test_spectrogram(8, 8);
        let mask = Array2::<f32>::zeros((8, 8));
        let (melody, accomp) = separate_spectrogram(&d, &mask).unwrap();
        assert!(melody.iter().all(|&v| v == Complex32::new(0.0, 0.0)));
        assert_eq!(accomp, d);
    }

    #[test]
    fn test_non_binary_mask_rejected() {
        let d = test_spectrogram(4, 4);
        let mut mask = Array2::<f32>::zeros((4, 4));
        mask[(2, 1)] = 0.5;
        let err = separate_spectrogram(&d, &mask).unwrap_err();
        match err {
            crate::Error::InvalidMask { value, bin, frame } => {
                assert_eq!(value, 0.5);
                assert_eq!((bin, frame), (2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let d = test_spectrogram(4, 4);
        let mask = Array2::<f32>::zeros((4, 5));
        assert!(matches!(
            separate_spectrogram(&d, &mask),
            Err(crate::Error::ShapeMismatch { .. })
        ));
    }
}
