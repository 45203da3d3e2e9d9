// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field-Line Rasterizer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Synthetic camera images of individual field lines.
//!
//! Each record is resampled along a smooth spline, splatted onto a
//! 64 × 64 grid with a 1/d profile and box-smoothed. Images are indexed
//! `[row = y, col = x]` and stacked along the last axis.

use flview_math::filter::uniform_filter;
use flview_math::spline::resample_curve;
use flview_types::constants::{IMAGE_SIZE, RASTER_PEAK, RASTER_RADIUS, RESAMPLE_INTERVAL};
use flview_types::record::FieldLineRecord;
use ndarray::{s, Array2, Array3};

/// Unsmoothed image of one pixel-space curve.
///
/// Pixels within [`RASTER_RADIUS`] of a resampled point take
/// `min(1000, 1000 / max(d, 1))`; later samples overwrite earlier ones.
pub fn splat_curve(points: &[(f64, f64)]) -> Array2<f64> {
    let n = IMAGE_SIZE;
    let mut image = Array2::zeros((n, n));
    let hi = (n - 1) as f64;

    for (sx, sy) in resample_curve(points, RESAMPLE_INTERVAL) {
        if !(sx.is_finite() && sy.is_finite()) {
            continue;
        }
        let c0 = (sx - RASTER_RADIUS).ceil().clamp(0.0, hi) as usize;
        let c1 = (sx + RASTER_RADIUS).floor().clamp(0.0, hi) as usize;
        let r0 = (sy - RASTER_RADIUS).ceil().clamp(0.0, hi) as usize;
        let r1 = (sy + RASTER_RADIUS).floor().clamp(0.0, hi) as usize;
        for row in r0..=r1 {
            for col in c0..=c1 {
                let d = ((col as f64 - sx).powi(2) + (row as f64 - sy).powi(2)).sqrt();
                if d <= RASTER_RADIUS {
                    image[[row, col]] = RASTER_PEAK.min(RASTER_PEAK / d.max(1.0));
                }
            }
        }
    }
    image
}

/// Smoothed image of one record, from its unpadded points.
pub fn rasterize_record(record: &FieldLineRecord, smoothing_window: usize) -> Array2<f64> {
    let points: Vec<(f64, f64)> = record.points().collect();
    uniform_filter(&splat_curve(&points), smoothing_window.max(1))
}

/// Image volume of shape (64, 64, N), in record order.
pub fn rasterize(records: &[FieldLineRecord], smoothing_window: usize) -> Array3<f64> {
    let mut volume = Array3::zeros((IMAGE_SIZE, IMAGE_SIZE, records.len()));
    for (k, record) in records.iter().enumerate() {
        volume
            .slice_mut(s![.., .., k])
            .assign(&rasterize_record(record, smoothing_window));
    }
    volume
}
