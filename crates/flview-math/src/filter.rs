// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Image Filters
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Box (uniform) smoothing with edge truncation.

use ndarray::{Array2, Axis};

/// Uniform `size × size` box filter.
///
/// Samples past the border take the value of the nearest edge pixel
/// (edge truncation), so no wrap-around occurs and a constant image is
/// left unchanged. Even sizes lean one sample towards lower indices.
pub fn uniform_filter(image: &Array2<f64>, size: usize) -> Array2<f64> {
    assert!(size >= 1, "filter size must be >= 1");
    if size == 1 {
        return image.clone();
    }
    let rows = box_1d(image, size, Axis(0));
    box_1d(&rows, size, Axis(1))
}

fn box_1d(image: &Array2<f64>, size: usize, axis: Axis) -> Array2<f64> {
    let (nr, nc) = image.dim();
    let n = image.len_of(axis) as isize;
    let back = (size / 2) as isize;
    let norm = 1.0 / size as f64;
    let mut out = Array2::zeros((nr, nc));

    for r in 0..nr {
        for c in 0..nc {
            let centre = (if axis == Axis(0) { r } else { c }) as isize;
            let mut acc = 0.0;
            for k in 0..size as isize {
                let idx = (centre - back + k).clamp(0, n - 1) as usize;
                acc += if axis == Axis(0) {
                    image[[idx, c]]
                } else {
                    image[[r, idx]]
                };
            }
            out[[r, c]] = acc * norm;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_image_unchanged() {
        let img = Array2::from_elem((16, 16), 3.5);
        let out = uniform_filter(&img, 7);
        for &v in out.iter() {
            assert!((v - 3.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_impulse_spreads_to_window() {
        let mut img = Array2::zeros((21, 21));
        img[[10, 10]] = 49.0;
        let out = uniform_filter(&img, 7);
        assert!((out[[10, 10]] - 1.0).abs() < 1e-12);
        assert!((out[[7, 13]] - 1.0).abs() < 1e-12);
        assert_eq!(out[[6, 10]], 0.0);
        let total: f64 = out.iter().sum();
        assert!((total - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_is_replicated_not_wrapped() {
        let mut img = Array2::zeros((10, 10));
        img[[0, 0]] = 9.0;
        let out = uniform_filter(&img, 3);
        // Corner sample appears 4 times in its own clamped 3×3 window
        assert!((out[[0, 0]] - 4.0).abs() < 1e-12);
        // Opposite corner stays dark without wrap-around
        assert_eq!(out[[9, 9]], 0.0);
    }

    #[test]
    fn test_size_one_is_identity() {
        let img = Array2::from_shape_fn((5, 4), |(r, c)| (r * 4 + c) as f64);
        assert_eq!(uniform_filter(&img, 1), img);
    }
}
