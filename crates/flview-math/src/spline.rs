// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Spline Resampling
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Natural cubic splines and parametric curve resampling.
//!
//! Curves are parameterised by cumulative chord length, so sampling the
//! parameter at a fixed interval gives roughly uniform arclength spacing.

/// Consecutive points closer than this are merged before fitting.
const DUPLICATE_TOL: f64 = 1e-12;

/// Natural cubic spline y(t) through strictly increasing knots.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    t: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots; zero at both ends.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit through `(t[i], y[i])`. `t` must be strictly increasing and
    /// non-empty, and `y` the same length.
    pub fn new(t: &[f64], y: &[f64]) -> Self {
        assert_eq!(t.len(), y.len(), "knot/value length mismatch");
        assert!(!t.is_empty(), "spline needs at least one knot");
        let n = t.len();
        let mut m = vec![0.0; n];

        if n > 2 {
            // Interior system for M_1..M_{n-2}
            let k = n - 2;
            let mut sub = vec![0.0; k];
            let mut diag = vec![0.0; k];
            let mut sup = vec![0.0; k];
            let mut rhs = vec![0.0; k];
            for j in 0..k {
                let i = j + 1;
                let h0 = t[i] - t[i - 1];
                let h1 = t[i + 1] - t[i];
                sub[j] = h0;
                diag[j] = 2.0 * (h0 + h1);
                sup[j] = h1;
                rhs[j] = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
            }
            let interior = solve_tridiagonal(&sub, &diag, &sup, &rhs);
            m[1..n - 1].copy_from_slice(&interior);
        }

        CubicSpline {
            t: t.to_vec(),
            y: y.to_vec(),
            m,
        }
    }

    /// Evaluate at `s`; values outside the knot range use the end cubic.
    pub fn eval(&self, s: f64) -> f64 {
        let n = self.t.len();
        if n == 1 {
            return self.y[0];
        }
        let i = self.t.partition_point(|&tk| tk <= s).clamp(1, n - 1) - 1;
        let h = self.t[i + 1] - self.t[i];
        let a = (self.t[i + 1] - s) / h;
        let b = (s - self.t[i]) / h;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }
}

/// Diagonally dominant tridiagonal solve (Thomas sweep).
/// `sub[0]` and `sup[k-1]` are ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let k = rhs.len();
    let mut c = vec![0.0; k];
    let mut d = vec![0.0; k];
    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..k {
        let den = diag[i] - sub[i] * c[i - 1];
        c[i] = sup[i] / den;
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / den;
    }
    let mut x = vec![0.0; k];
    x[k - 1] = d[k - 1];
    for i in (0..k - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    x
}

/// Resample a planar polyline on a parametric natural spline.
///
/// Knots sit at cumulative chord length; samples are taken every
/// `interval` along that parameter, plus the final endpoint.
pub fn resample_curve(points: &[(f64, f64)], interval: f64) -> Vec<(f64, f64)> {
    assert!(interval > 0.0, "resampling interval must be > 0");

    let mut pts: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &p in points {
        match pts.last() {
            Some(&q) if ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt() < DUPLICATE_TOL => {}
            _ => pts.push(p),
        }
    }
    if pts.len() < 2 {
        return pts;
    }

    let mut t = Vec::with_capacity(pts.len());
    t.push(0.0);
    for w in pts.windows(2) {
        let seg = ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt();
        t.push(t[t.len() - 1] + seg);
    }
    let xs: Vec<f64> = pts.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pts.iter().map(|p| p.1).collect();
    let sx = CubicSpline::new(&t, &xs);
    let sy = CubicSpline::new(&t, &ys);

    let total = t[t.len() - 1];
    let n_steps = (total / interval).floor() as usize;
    let mut out = Vec::with_capacity(n_steps + 2);
    for k in 0..=n_steps {
        let s = k as f64 * interval;
        if s < total {
            out.push((sx.eval(s), sy.eval(s)));
        }
    }
    out.push((sx.eval(total), sy.eval(total)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spline_interpolates_knots() {
        let t = [0.0, 1.0, 2.5, 3.0, 4.2];
        let y = [1.0, -2.0, 0.5, 3.0, 2.0];
        let s = CubicSpline::new(&t, &y);
        for (ti, yi) in t.iter().zip(y.iter()) {
            assert!((s.eval(*ti) - yi).abs() < 1e-12, "knot {ti}");
        }
    }

    #[test]
    fn test_spline_reproduces_line() {
        let t: Vec<f64> = (0..8).map(|i| i as f64 * 0.7).collect();
        let y: Vec<f64> = t.iter().map(|v| 3.0 * v - 1.0).collect();
        let s = CubicSpline::new(&t, &y);
        for k in 0..50 {
            let x = k as f64 * 0.1;
            assert!((s.eval(x) - (3.0 * x - 1.0)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_resample_straight_segment() {
        let out = resample_curve(&[(0.0, 0.0), (5.5, 0.0)], 1.0);
        // 0,1,2,3,4,5 plus the endpoint 5.5
        assert_eq!(out.len(), 7);
        assert!((out[3].0 - 3.0).abs() < 1e-12);
        assert!((out[6].0 - 5.5).abs() < 1e-12);
        assert!(out.iter().all(|p| p.1.abs() < 1e-12));
    }

    #[test]
    fn test_resample_drops_duplicates() {
        let out = resample_curve(&[(1.0, 1.0), (1.0, 1.0), (1.0, 3.0), (1.0, 3.0)], 1.0);
        assert_eq!(out.len(), 3);
        assert!((out[1].1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_resample_degenerate_inputs() {
        assert!(resample_curve(&[], 1.0).is_empty());
        assert_eq!(resample_curve(&[(2.0, 3.0)], 1.0), vec![(2.0, 3.0)]);
        assert_eq!(resample_curve(&[(2.0, 3.0), (2.0, 3.0)], 1.0), vec![(2.0, 3.0)]);
    }

    #[test]
    fn test_resample_endpoints_preserved() {
        let pts = [(10.0, 10.0), (14.0, 12.0), (20.0, 11.0), (25.0, 18.0)];
        let out = resample_curve(&pts, 1.0);
        let first = out[0];
        let last = out[out.len() - 1];
        assert!((first.0 - 10.0).abs() < 1e-12 && (first.1 - 10.0).abs() < 1e-12);
        assert!((last.0 - 25.0).abs() < 1e-9 && (last.1 - 18.0).abs() < 1e-9);
        assert!(out.len() > 15);
    }
}
