//! Morphological refinement of the melodic mask.
//!
//! A hit-or-miss transform locates the leading edge of each horizontal
//! mask run (a note onset in mask space), a binary dilation grows every
//! detected onset into a broader confirmed region, and the union with
//! the original mask guarantees refinement only ever adds coverage.

use ndarray::{array, Array2};

/// Small binary kernel for hit-or-miss matching and dilation.
///
/// Two built-in kernels cover the default refinement; both are
/// empirically tuned constants, and callers may substitute any kernel
/// that fits inside the mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    pub kernel: Array2<u8>,
}

impl StructuringElement {
    pub fn new(kernel: Array2<u8>) -> Self {
        Self { kernel }
    }

    /// Rows and columns of the kernel.
    pub fn shape(&self) -> (usize, usize) {
        (self.kernel.shape()[0], self.kernel.shape()[1])
    }

    /// The onset-find pattern: matches the first marked cell of a
    /// horizontal run at least three frames long, preceded by two
    /// unmarked frames.
    pub fn onset_find() -> Self {
        Self::new(array![[0u8, 0, 1, 1, 1]])
    }

    /// The trailing-dilate pattern: a full-height bar trailing the
    /// onset with an hourglass taper, dense around the onset row. Grows
    /// each detected onset into the region a note attack occupies.
    pub fn trailing_dilate() -> Self {
        Self::new(array![
            [1u8, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
            [1, 1, 1, 1, 0, 0, 0, 0, 0, 0],
            [1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
            [1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
            [1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ])
    }
}

/// All three stages of one refinement pass. Downstream callers pick the
/// mask they want; the default full pipeline uses [`combined`].
///
/// [`combined`]: HitMissMasks::combined
#[derive(Debug, Clone)]
pub struct HitMissMasks {
    /// Exact hit-or-miss matches of the onset pattern.
    pub hits: Array2<f32>,
    /// The hits grown by the dilate pattern.
    pub dilated: Array2<f32>,
    /// `max(dilated, mask)`, a superset of the input mask.
    pub combined: Array2<f32>,
}

fn check_fit(elem: &StructuringElement, mask: &Array2<f32>) -> crate::Result<(usize, usize)> {
    let (rows, cols) = elem.shape();
    let (mask_rows, mask_cols) = (mask.shape()[0], mask.shape()[1]);
    if rows == 0 || cols == 0 || rows > mask_rows || cols > mask_cols {
        return Err(crate::Error::InvalidStructuringElement {
            rows,
            cols,
            mask_rows,
            mask_cols,
        });
    }
    Ok((rows, cols))
}

/// Hit-or-miss transform: mark every cell where the pattern matches the
/// mask exactly, centered on the cell: pattern 1s on foreground,
/// pattern 0s on background. Neighborhoods extending past an edge never
/// match.
///
/// # Errors
/// [`crate::Error::InvalidStructuringElement`] when the pattern is empty
/// or larger than the mask.
pub fn hit_or_miss(mask: &Array2<f32>, pattern: &StructuringElement) -> crate::Result<Array2<f32>> {
    let (kr, kc) = check_fit(pattern, mask)?;
    let (rows, cols) = (mask.shape()[0], mask.shape()[1]);
    let (cr, cc) = (kr / 2, kc / 2);

    let mut hits = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        // Neighborhood row span must stay inside the mask.
        if r < cr || r + (kr - 1 - cr) >= rows {
            continue;
        }
        for c in 0..cols {
            if c < cc || c + (kc - 1 - cc) >= cols {
                continue;
            }
            let mut matched = true;
            'scan: for i in 0..kr {
                for j in 0..kc {
                    let cell = mask[(r + i - cr, c + j - cc)] > 0.5;
                    if cell != (pattern.kernel[(i, j)] != 0) {
                        matched = false;
                        break 'scan;
                    }
                }
            }
            if matched {
                hits[(r, c)] = 1.0;
            }
        }
    }
    Ok(hits)
}

/// Binary dilation: every foreground cell stamps the structuring
/// element, mirrored about its center (the standard dilation
/// convention, which is what makes the trailing-dilate bar land after
/// the onset rather than before it). Stamps are clipped at the edges.
///
/// # Errors
/// [`crate::Error::InvalidStructuringElement`] when the element is empty
/// or larger than the mask.
pub fn dilate(mask: &Array2<f32>, element: &StructuringElement) -> crate::Result<Array2<f32>> {
    let (kr, kc) = check_fit(element, mask)?;
    let (rows, cols) = (mask.shape()[0], mask.shape()[1]);
    let (cr, cc) = (kr / 2, kc / 2);

    let offsets: Vec<(isize, isize)> = (0..kr)
        .flat_map(|i| (0..kc).map(move |j| (i, j)))
        .filter(|&(i, j)| element.kernel[(i, j)] != 0)
        .map(|(i, j)| (cr as isize - i as isize, cc as isize - j as isize))
        .collect();

    let mut out = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            if mask[(r, c)] <= 0.5 {
                continue;
            }
            for &(dr, dc) in &offsets {
                let tr = r as isize + dr;
                let tc = c as isize + dc;
                if tr >= 0 && tr < rows as isize && tc >= 0 && tc < cols as isize {
                    out[(tr as usize, tc as usize)] = 1.0;
                }
            }
        }
    }
    Ok(out)
}

/// One full refinement pass: find onsets, dilate them, and merge back.
///
/// All three intermediate masks are returned so callers can separate on
/// `hits`, `dilated`, or `combined`. `combined` never removes original
/// coverage; it is `max(dilated, mask)` cell for cell.
pub fn hit_miss_refine(
    mask: &Array2<f32>,
    hit_pattern: &StructuringElement,
    dilate_pattern: &StructuringElement,
) -> crate::Result<HitMissMasks> {
    let hits = hit_or_miss(mask, hit_pattern)?;
    let dilated = dilate(&hits, dilate_pattern)?;

    let mut combined = dilated.clone();
    for (idx, v) in mask.indexed_iter() {
        if *v > combined[idx] {
            combined[idx] = *v;
        }
    }

    Ok(HitMissMasks {
        hits,
        dilated,
        combined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mask with a single horizontal run on one row.
    fn run_mask(rows: usize, cols: usize, row: usize, start: usize, len: usize) -> Array2<f32> {
        let mut mask = Array2::<f32>::zeros((rows, cols));
        for c in start..(start + len).min(cols) {
            mask[(row, c)] = 1.0;
        }
        mask
    }

    #[test]
    fn test_hit_marks_run_leading_edge() {
        let mask = run_mask(20, 30, 10, 8, 12);
        let hits = hit_or_miss(&mask, &StructuringElement::onset_find()).unwrap();
        for r in 0..20 {
            for c in 0..30 {
                let expected = if (r, c) == (10, 8) { 1.0 } else { 0.0 };
                assert_eq!(hits[(r, c)], expected, "at ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_hit_requires_two_leading_zeros() {
        // A run starting at column 1 has only one zero before it: the
        // pattern extends past the edge and must not match.
        let mask = run_mask(4, 16, 2, 1, 6);
        let hits = hit_or_miss(&mask, &StructuringElement::onset_find()).unwrap();
        assert!(hits.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_hit_ignores_short_runs() {
        let mask = run_mask(4, 16, 2, 6, 2);
        let hits = hit_or_miss(&mask, &StructuringElement::onset_find()).unwrap();
        assert!(hits.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dilate_trails_the_onset() {
        let mut hits = Array2::<f32>::zeros((40, 30));
        hits[(20, 10)] = 1.0;
        let out = dilate(&hits, &StructuringElement::trailing_dilate()).unwrap();

        // The all-ones kernel column lands five frames after the onset,
        // spanning the full kernel height.
        for r in 12..=29 {
            assert_eq!(out[(r, 15)], 1.0, "bar missing at row {r}");
        }
        // The onset row is covered through the full taper width.
        for c in 6..=15 {
            assert_eq!(out[(20, c)], 1.0, "onset row missing at col {c}");
        }
        // Nothing six frames ahead of the onset.
        for r in 0..40 {
            assert_eq!(out[(r, 4)], 0.0);
        }
    }

    #[test]
    fn test_combined_is_superset() {
        let mask = run_mask(40, 40, 16, 10, 15);
        let refined = hit_miss_refine(
            &mask,
            &StructuringElement::onset_find(),
            &StructuringElement::trailing_dilate(),
        )
        .unwrap();
        for (idx, &v) in mask.indexed_iter() {
            assert!(
                refined.combined[idx] >= v,
                "combined lost coverage at {idx:?}"
            );
        }
        // And the refinement actually added something.
        let before: f32 = mask.sum();
        let after: f32 = refined.combined.sum();
        assert!(after > before);
    }

    #[test]
    fn test_saturated_mask_is_fixed_point() {
        // A maximal mask has no onset pattern occurrences, so a second
        // refinement pass changes nothing.
        let mask = Array2::<f32>::from_elem((24, 20), 1.0);
        let refined = hit_miss_refine(
            &mask,
            &StructuringElement::onset_find(),
            &StructuringElement::trailing_dilate(),
        )
        .unwrap();
        assert!(refined.hits.iter().all(|&v| v == 0.0));
        assert_eq!(refined.combined, mask);

        let again = hit_miss_refine(
            &refined.combined,
            &StructuringElement::onset_find(),
            &StructuringElement::trailing_dilate(),
        )
        .unwrap();
        assert_eq!(again.combined, refined.combined);
    }

    #[test]
    fn test_element_larger_than_mask() {
        let mask = Array2::<f32>::zeros((10, 10));
        let err = dilate(&mask, &StructuringElement::trailing_dilate()).unwrap_err();
        match err {
            crate::Error::InvalidStructuringElement {
                rows,
                cols,
                mask_rows,
                mask_cols,
            } => {
                assert_eq!((rows, cols), (18, 10));
                assert_eq!((mask_rows, mask_cols), (10, 10));
            }
            other => panic!("unexpected error: {other}"),
        }

        let hit_err = hit_or_miss(
            &Array2::<f32>::zeros((1, 3)),
            &StructuringElement::onset_find(),
        );
        assert!(hit_err.is_err());
    }

    #[test]
    fn test_empty_element_rejected() {
        let mask = Array2::<f32>::zeros((10, 10));
        let elem = StructuringElement::new(Array2::<u8>::zeros((0, 3)));
        assert!(matches!(
            dilate(&mask, &elem),
            Err(crate::Error::InvalidStructuringElement { .. })
        ));
    }

    #[test]
    fn test_custom_symmetric_kernel() {
        // A plus-shaped kernel grows a point into a plus.
        let elem = StructuringElement::new(array![[0u8, 1, 0], [1, 1, 1], [0, 1, 0]]);
        let mut mask = Array2::<f32>::zeros((7, 7));
        mask[(3, 3)] = 1.0;
        let out = dilate(&mask, &elem).unwrap();
        let expected = [(2, 3), (3, 2), (3, 3), (3, 4), (4, 3)];
        for r in 0..7 {
            for c in 0..7 {
                let want = if expected.contains(&(r, c)) { 1.0 } else { 0.0 };
                assert_eq!(out[(r, c)], want, "at ({r}, {c})");
            }
        }
    }
}
