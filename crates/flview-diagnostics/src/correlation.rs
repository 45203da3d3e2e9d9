// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Frame Correlation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Match camera frames against synthetic field-line images.

use flview_types::error::{ViewError, ViewResult};
use ndarray::{ArrayView2, ArrayView3, Axis};

/// Normalised (Pearson) correlation of two equally shaped images.
///
/// Zero when either image has no variance.
pub fn cross_correlation(a: ArrayView2<f64>, b: ArrayView2<f64>) -> ViewResult<f64> {
    if a.dim() != b.dim() {
        return Err(ViewError::ConfigError(format!(
            "correlation shape mismatch: {:?} vs {:?}",
            a.dim(),
            b.dim()
        )));
    }
    let n = a.len();
    if n == 0 {
        return Ok(0.0);
    }
    let mean_a = a.sum() / n as f64;
    let mean_b = b.sum() / n as f64;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a <= 0.0 || var_b <= 0.0 {
        return Ok(0.0);
    }
    Ok(cov / (var_a * var_b).sqrt())
}

/// Score every image of a (rows, cols, N) volume against `frame`.
///
/// Sorted by descending score; equal scores keep image order.
pub fn rank_by_correlation(
    frame: ArrayView2<f64>,
    volume: ArrayView3<f64>,
) -> ViewResult<Vec<(usize, f64)>> {
    let mut scores = volume
        .axis_iter(Axis(2))
        .enumerate()
        .map(|(k, image)| cross_correlation(frame, image).map(|c| (k, c)))
        .collect::<ViewResult<Vec<_>>>()?;
    scores.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    fn ramp(scale: f64, offset: f64) -> Array2<f64> {
        Array2::from_shape_fn((8, 8), |(r, c)| scale * (r * 8 + c) as f64 + offset)
    }

    #[test]
    fn test_self_correlation_is_one() {
        let a = ramp(1.0, 0.0);
        let c = cross_correlation(a.view(), a.view()).unwrap();
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_affine_invariance() {
        let a = ramp(1.0, 0.0);
        let pos = cross_correlation(a.view(), ramp(3.0, 7.0).view()).unwrap();
        let neg = cross_correlation(a.view(), ramp(-2.0, 1.0).view()).unwrap();
        assert!((pos - 1.0).abs() < 1e-12);
        assert!((neg + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_image_scores_zero() {
        let a = ramp(1.0, 0.0);
        let flat = Array2::from_elem((8, 8), 4.0);
        assert_eq!(cross_correlation(a.view(), flat.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<f64>::zeros((8, 8));
        let b = Array2::<f64>::zeros((4, 8));
        assert!(cross_correlation(a.view(), b.view()).is_err());
    }

    #[test]
    fn test_ranking_order() {
        let frame = ramp(1.0, 0.0);
        let mut volume = Array3::zeros((8, 8, 3));
        volume.index_axis_mut(Axis(2), 0).assign(&ramp(-1.0, 0.0));
        volume.index_axis_mut(Axis(2), 1).assign(&ramp(2.0, 1.0));
        // Image 2 stays flat
        let ranked = rank_by_correlation(frame.view(), volume.view()).unwrap();
        let order: Vec<usize> = ranked.iter().map(|&(k, _)| k).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!((ranked[0].1 - 1.0).abs() < 1e-12);
    }
}
