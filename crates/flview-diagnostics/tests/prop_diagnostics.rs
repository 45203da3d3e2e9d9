// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Property-Based Tests (proptest) for flview-diagnostics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for flview-diagnostics using proptest.
//!
//! Covers: splat bounds, correlation range, pixel calibration corners,
//! toroidal arc sense.

use flview_diagnostics::correlation::cross_correlation;
use flview_diagnostics::fieldlines::{net_phi_advance, toroidal_arc, PixelCalibration};
use flview_diagnostics::raster::splat_curve;
use ndarray::Array2;
use proptest::prelude::*;

fn pixel_curve() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-10.0f64..74.0, -10.0f64..74.0), 2..12)
}

// ── Rasterizer Properties ────────────────────────────────────────────

proptest! {
    /// Splatted intensities lie in [0, 1000].
    #[test]
    fn splat_bounded(curve in pixel_curve()) {
        let img = splat_curve(&curve);
        prop_assert_eq!(img.dim(), (64, 64));
        for &v in img.iter() {
            prop_assert!((0.0..=1000.0).contains(&v), "value {}", v);
        }
    }
}

// ── Correlation Properties ───────────────────────────────────────────

proptest! {
    /// Pearson correlation lies in [-1, 1] and is symmetric.
    #[test]
    fn correlation_range(
        a in prop::collection::vec(-5.0f64..5.0, 36),
        b in prop::collection::vec(-5.0f64..5.0, 36),
    ) {
        let a = Array2::from_shape_vec((6, 6), a).unwrap();
        let b = Array2::from_shape_vec((6, 6), b).unwrap();
        let ab = cross_correlation(a.view(), b.view()).unwrap();
        let ba = cross_correlation(b.view(), a.view()).unwrap();
        prop_assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&ab));
        prop_assert!((ab - ba).abs() < 1e-12);
    }
}

// ── Field-Line Mapping Properties ────────────────────────────────────

proptest! {
    /// Calibration corners land on (0, 0) and (63, 63).
    #[test]
    fn calibration_corners(
        x0 in -0.1f64..0.0, y0 in -0.1f64..0.0,
        w in 0.01f64..0.2, h in 0.01f64..0.2,
    ) {
        let cal = PixelCalibration::new((x0, y0), (x0 + w, y0 + h)).unwrap();
        let (px, py) = cal.to_pixel(x0, y0);
        prop_assert!(px.abs() < 1e-9 && py.abs() < 1e-9);
        let (px, py) = cal.to_pixel(x0 + w, y0 + h);
        prop_assert!((px - 63.0).abs() < 1e-9 && (py - 63.0).abs() < 1e-9);
    }

    /// Toroidal arcs advance by their span, whatever the start angle.
    #[test]
    fn arc_advance_matches_span(phi0 in -720.0f64..720.0, span in -300.0f64..300.0) {
        let arc = toroidal_arc(0.55, -0.4, phi0, span, 100);
        prop_assert!((net_phi_advance(&arc) - span).abs() < 1e-6);
    }
}
