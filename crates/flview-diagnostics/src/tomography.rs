// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Emissivity Reconstruction
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Camera-frame inversion onto field-line emissivities.
//!
//! Column k of the geometry matrix A is the flattened image of field
//! line k. A frame b is fitted by
//! min ||A x − b||² + s² ||x||² subject to x ≥ 0,
//! solved by accelerated projected gradient on the normal equations.

use flview_types::error::{ViewError, ViewResult};
use log::debug;
use ndarray::{Array1, Array2, ArrayView2, ArrayView3, Axis};

/// Projected gradient iteration cap.
const NNLS_ITERS: usize = 5000;

/// Stop when the update falls below this fraction of the iterate norm.
const NNLS_TOL: f64 = 1e-12;

/// Result of fitting one frame.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Non-negative weight per field line.
    pub emissivity: Array1<f64>,
    /// A x reshaped to the frame shape.
    pub image: Array2<f64>,
    /// ||A x − b||.
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Reconstruction engine for one field-line image set.
#[derive(Debug, Clone)]
pub struct EmissivityReconstruction {
    /// Frame shape (rows, cols).
    pub shape: (usize, usize),
    /// Geometry matrix A: (rows·cols, n_lines).
    pub geometry: Array2<f64>,
    /// AᵀA + s²I, reused across frames.
    normal: Array2<f64>,
    step: f64,
    pub smoothing: f64,
}

impl EmissivityReconstruction {
    /// Build from a (rows, cols, N) image volume.
    pub fn new(volume: ArrayView3<f64>, smoothing: f64) -> ViewResult<Self> {
        let (rows, cols, n_lines) = volume.dim();
        if n_lines == 0 || rows * cols == 0 {
            return Err(ViewError::ConfigError(
                "reconstruction needs at least one non-empty field-line image".to_string(),
            ));
        }
        if !(smoothing.is_finite() && smoothing >= 0.0) {
            return Err(ViewError::ConfigError(format!(
                "smoothing must be finite and >= 0, got {smoothing}"
            )));
        }

        let n_pixels = rows * cols;
        let mut geometry = Array2::zeros((n_pixels, n_lines));
        for (k, image) in volume.axis_iter(Axis(2)).enumerate() {
            for (p, &v) in geometry.column_mut(k).iter_mut().zip(image.iter()) {
                *p = v;
            }
        }

        let mut normal = geometry.t().dot(&geometry);
        let lambda = smoothing * smoothing;
        for i in 0..n_lines {
            normal[[i, i]] += lambda;
        }

        // ||AᵀA + λI||_F bounds the spectral norm from above
        let lipschitz = normal.iter().map(|v| v * v).sum::<f64>().sqrt();
        let step = 1.0 / (lipschitz + 1e-10);
        debug!(
            "Reconstruction geometry {}x{}, Lipschitz bound {lipschitz:.3e}",
            n_pixels, n_lines
        );

        Ok(EmissivityReconstruction {
            shape: (rows, cols),
            geometry,
            normal,
            step,
            smoothing,
        })
    }

    pub fn n_lines(&self) -> usize {
        self.geometry.ncols()
    }

    /// Fit one camera frame.
    pub fn reconstruct(&self, frame: ArrayView2<f64>) -> ViewResult<Reconstruction> {
        if frame.dim() != self.shape {
            return Err(ViewError::ConfigError(format!(
                "frame shape {:?} does not match image shape {:?}",
                frame.dim(),
                self.shape
            )));
        }
        let b: Array1<f64> = frame.iter().copied().collect();
        let atb = self.geometry.t().dot(&b);

        let mut x = Array1::zeros(self.n_lines());
        let mut x_prev = x.clone();
        let mut iterations = NNLS_ITERS;

        for k in 0..NNLS_ITERS {
            let momentum = k as f64 / (k as f64 + 3.0);
            let y = &x + &(&(&x - &x_prev) * momentum);
            let grad = self.normal.dot(&y) - &atb;
            x_prev = x;
            x = (&y - &(&grad * self.step)).mapv(|v| v.max(0.0));

            let delta = (&x - &x_prev).mapv(|v| v * v).sum().sqrt();
            let scale = x.mapv(|v| v * v).sum().sqrt().max(1e-300);
            if delta <= NNLS_TOL * scale {
                iterations = k + 1;
                break;
            }
        }

        let fitted = self.geometry.dot(&x);
        let residual_norm = (&fitted - &b).mapv(|v| v * v).sum().sqrt();
        let image = fitted
            .into_shape_with_order(self.shape)
            .map_err(|e| ViewError::ConfigError(format!("reshape failed: {e}")))?;

        Ok(Reconstruction {
            emissivity: x,
            image,
            residual_norm,
            iterations,
        })
    }

    /// Fit a sequence of frames with the same geometry.
    pub fn reconstruct_series<'a, I>(&self, frames: I) -> ViewResult<Vec<Reconstruction>>
    where
        I: IntoIterator<Item = ArrayView2<'a, f64>>,
    {
        frames.into_iter().map(|f| self.reconstruct(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array3};

    /// Three field-line images: two disjoint bars and one overlapping blob.
    fn volume() -> Array3<f64> {
        let mut v = Array3::zeros((16, 16, 3));
        v.slice_mut(s![2..4, 1..15, 0]).fill(1.0);
        v.slice_mut(s![10..12, 1..15, 1]).fill(1.0);
        v.slice_mut(s![1..13, 6..9, 2]).fill(0.5);
        v
    }

    fn forward(v: &Array3<f64>, weights: &[f64]) -> Array2<f64> {
        let mut out = Array2::zeros((16, 16));
        for (k, &w) in weights.iter().enumerate() {
            out.scaled_add(w, &v.index_axis(Axis(2), k));
        }
        out
    }

    #[test]
    fn test_geometry_layout() {
        let v = volume();
        let rec = EmissivityReconstruction::new(v.view(), 0.0).unwrap();
        assert_eq!(rec.geometry.dim(), (256, 3));
        // Pixel (2, 1) → flat index 33
        assert_eq!(rec.geometry[[2 * 16 + 1, 0]], 1.0);
        assert_eq!(rec.geometry[[2 * 16 + 1, 1]], 0.0);
    }

    #[test]
    fn test_recovers_known_weights() {
        let v = volume();
        let truth = [2.0, 0.5, 3.0];
        let frame = forward(&v, &truth);
        let rec = EmissivityReconstruction::new(v.view(), 0.0).unwrap();
        let out = rec.reconstruct(frame.view()).unwrap();
        for (k, &w) in truth.iter().enumerate() {
            assert!(
                (out.emissivity[k] - w).abs() < 1e-6,
                "line {k}: {} vs {w}",
                out.emissivity[k]
            );
        }
        assert!(out.residual_norm < 1e-5);
        assert_eq!(out.image.dim(), (16, 16));
    }

    #[test]
    fn test_non_negative_under_negative_target() {
        let v = volume();
        let frame = forward(&v, &[-1.0, 2.0, 0.0]);
        let rec = EmissivityReconstruction::new(v.view(), 0.0).unwrap();
        let out = rec.reconstruct(frame.view()).unwrap();
        assert!(out.emissivity.iter().all(|&x| x >= 0.0));
        assert!(out.emissivity[0].abs() < 1e-9);
    }

    #[test]
    fn test_smoothing_shrinks_solution() {
        let v = volume();
        let frame = forward(&v, &[2.0, 0.5, 3.0]);
        let plain = EmissivityReconstruction::new(v.view(), 0.0).unwrap();
        let smooth = EmissivityReconstruction::new(v.view(), 5.0).unwrap();
        let a = plain.reconstruct(frame.view()).unwrap().emissivity;
        let b = smooth.reconstruct(frame.view()).unwrap().emissivity;
        assert!(b.sum() < a.sum());
    }

    #[test]
    fn test_zero_frame_zero_emissivity() {
        let v = volume();
        let rec = EmissivityReconstruction::new(v.view(), 1.0).unwrap();
        let out = rec.reconstruct(Array2::zeros((16, 16)).view()).unwrap();
        assert!(out.emissivity.sum().abs() < 1e-12);
    }

    #[test]
    fn test_series_and_shape_checks() {
        let v = volume();
        let rec = EmissivityReconstruction::new(v.view(), 0.0).unwrap();
        let frames = [forward(&v, &[1.0, 0.0, 0.0]), forward(&v, &[0.0, 1.0, 0.0])];
        let out = rec.reconstruct_series(frames.iter().map(|f| f.view())).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[1].emissivity[1] > out[1].emissivity[0]);

        assert!(rec.reconstruct(Array2::zeros((8, 8)).view()).is_err());
        let empty = Array3::<f64>::zeros((16, 16, 0));
        assert!(EmissivityReconstruction::new(empty.view(), 0.0).is_err());
    }
}
