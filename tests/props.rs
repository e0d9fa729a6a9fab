//! Property tests for the mask pipeline invariants.

use descant::morphology::{hit_miss_refine, StructuringElement};
use descant::novelty::spectral_novelty;
use descant::separate::separate_spectrogram;
use ndarray::Array2;
use num_complex::Complex32;
use proptest::prelude::*;

/// Deterministic pseudo-random binary mask from a seed.
fn seeded_mask(rows: usize, cols: usize, seed: u64) -> Array2<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    Array2::from_shape_fn((rows, cols), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) & 1) as f32
    })
}

fn seeded_spectrogram(rows: usize, cols: usize, seed: u64) -> Array2<Complex32> {
    let mut state = seed.wrapping_add(0x9e3779b97f4a7c15);
    Array2::from_shape_fn((rows, cols), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let re = ((state >> 40) & 0xFF_FFFF) as f32 / 8388608.0 - 1.0;
        let im = ((state >> 16) & 0xFF_FFFF) as f32 / 8388608.0 - 1.0;
        Complex32::new(re, im)
    })
}

proptest! {
    #[test]
    fn combined_never_loses_coverage(
        rows in 18usize..40,
        cols in 10usize..40,
        seed in any::<u64>(),
    ) {
        let mask = seeded_mask(rows, cols, seed);
        let refined = hit_miss_refine(
            &mask,
            &StructuringElement::onset_find(),
            &StructuringElement::trailing_dilate(),
        )
        .unwrap();

        for (idx, &v) in mask.indexed_iter() {
            prop_assert!(refined.combined[idx] >= v);
        }
        // Everything stays binary through the whole pass.
        for m in [&refined.hits, &refined.dilated, &refined.combined] {
            prop_assert!(m.iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }

    #[test]
    fn separation_is_an_exact_partition(
        rows in 8usize..32,
        cols in 8usize..32,
        seed in any::<u64>(),
    ) {
        let d = seeded_spectrogram(rows, cols, seed);
        let mask = seeded_mask(rows, cols, seed ^ 0xdead_beef);
        let (melody, accomp) = separate_spectrogram(&d, &mask).unwrap();

        for (idx, &v) in d.indexed_iter() {
            // mask + (1 - mask) == 1 makes this exact, not approximate.
            prop_assert_eq!(melody[idx] + accomp[idx], v);
        }
    }

    #[test]
    fn novelty_stays_in_unit_range(
        rows in 4usize..24,
        cols in 4usize..24,
        seed in any::<u64>(),
    ) {
        let d = seeded_spectrogram(rows, cols, seed);
        match spectral_novelty(&d) {
            Ok(novelty) => {
                prop_assert_eq!(novelty.len(), cols);
                let max = novelty.iter().copied().fold(0.0f32, f32::max);
                prop_assert!((max - 1.0).abs() < 1e-5);
                prop_assert!(novelty.iter().all(|&v| (0.0..=1.0).contains(&v)));
            }
            // A flat draw is legitimately degenerate.
            Err(descant::Error::DegenerateNovelty) => {}
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }
}
