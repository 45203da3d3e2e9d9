// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Property-Based Tests (proptest) for flview-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for flview-math using proptest.
//!
//! Covers: cylindrical/Cartesian round trip, frame orthonormality,
//! spline resampling spacing, box filter invariants.

use flview_math::coords::{cart_to_cyl, cyl_to_cart, normalize_deg};
use flview_math::filter::uniform_filter;
use flview_math::frame::{rotate_about_z, OrthoFrame};
use flview_math::spline::resample_curve;
use flview_types::state::{Point3, PointCyl};
use ndarray::Array2;
use proptest::prelude::*;

fn angle_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

// ── Coordinate Transform Properties ──────────────────────────────────

proptest! {
    /// cart_to_cyl(cyl_to_cart(R, Z, phi)) == (R, Z, phi mod 360).
    #[test]
    fn cyl_cart_roundtrip(
        r in 1e-3f64..10.0,
        z in -5.0f64..5.0,
        phi in -1000.0f64..1000.0,
    ) {
        let back = cart_to_cyl(cyl_to_cart(PointCyl::new(r, z, phi)));
        prop_assert!((back.r - r).abs() < 1e-9 * r.max(1.0));
        prop_assert!((back.z - z).abs() < 1e-12);
        prop_assert!((0.0..360.0).contains(&back.phi_deg));
        prop_assert!(angle_gap(back.phi_deg, normalize_deg(phi)) < 1e-7,
            "phi {} -> {}", phi, back.phi_deg);
    }

    /// Conversion preserves distance from the Z axis.
    #[test]
    fn cyl_to_cart_preserves_radius(r in 0.0f64..10.0, phi in 0.0f64..360.0) {
        let p = cyl_to_cart(PointCyl::new(r, 0.0, phi));
        prop_assert!((p.norm_xy() - r).abs() < 1e-12);
    }
}

// ── Frame Properties ─────────────────────────────────────────────────

proptest! {
    /// Gram–Schmidt frames are orthonormal and right-handed.
    #[test]
    fn frame_is_orthonormal(
        zx in -1.0f64..1.0, zy in -1.0f64..1.0, zz in -1.0f64..1.0,
        hx in -1.0f64..1.0, hy in -1.0f64..1.0,
    ) {
        let z = Point3::new(zx, zy, zz);
        let hint = Point3::new(hx, hy, 0.0);
        prop_assume!(z.norm() > 1e-3 && hint.norm() > 1e-3);
        prop_assume!(z.normalized().unwrap().cross(hint.normalized().unwrap()).norm() > 1e-3);

        let f = OrthoFrame::from_z_and_x_hint(Point3::default(), z, hint).unwrap();
        prop_assert!(f.orthonormality_error() < 1e-10);
        prop_assert!((f.x.cross(f.y) - f.z).norm() < 1e-10);
        prop_assert!((f.z - z.normalized().unwrap()).norm() < 1e-12);
        // X keeps the sense of the hint
        prop_assert!(f.x.dot(hint) > 0.0);
    }

    /// Rotation about Z preserves in-plane length.
    #[test]
    fn rotation_preserves_length(x in -5.0f64..5.0, y in -5.0f64..5.0, a in -360.0f64..360.0) {
        let p = Point3::new(x, y, 0.0);
        let r = rotate_about_z(p, a);
        prop_assert!((r.norm() - p.norm()).abs() < 1e-10);
    }
}

// ── Spline Resampling Properties ─────────────────────────────────────

proptest! {
    /// Resampling a straight polyline yields points on the line at unit spacing.
    #[test]
    fn resample_straight_line_spacing(
        x0 in 0.0f64..60.0, y0 in 0.0f64..60.0,
        dx in -20.0f64..20.0, dy in -20.0f64..20.0,
        n in 2usize..10,
    ) {
        prop_assume!((dx * dx + dy * dy).sqrt() > 2.0);
        let pts: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                (x0 + t * dx, y0 + t * dy)
            })
            .collect();
        let out = resample_curve(&pts, 1.0);
        for w in out.windows(2) {
            let d = ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt();
            prop_assert!(d <= 1.0 + 1e-9, "spacing {}", d);
        }
        for p in &out {
            // Distance from the infinite line
            let cross = (p.0 - x0) * dy - (p.1 - y0) * dx;
            prop_assert!(cross.abs() / (dx * dx + dy * dy).sqrt() < 1e-8);
        }
    }
}

// ── Box Filter Properties ────────────────────────────────────────────

proptest! {
    /// Smoothing never leaves the input value range.
    #[test]
    fn filter_within_bounds(seed in 0u64..1000, size in 1usize..9) {
        let img = Array2::from_shape_fn((16, 16), |(r, c)| {
            (((r * 31 + c * 17) as u64 + seed) % 97) as f64
        });
        let lo = img.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = img.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let out = uniform_filter(&img, size);
        prop_assert_eq!(out.dim(), img.dim());
        for &v in out.iter() {
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
