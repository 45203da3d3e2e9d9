// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field-Line Pixel Mapper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Field lines from divertor seeds to calibrated pixel coordinates.
//!
//! With a non-zero shot and time each seed is traced by an external
//! [`FieldLineTracer`]; otherwise a toroidal arc at the seed (R, Z)
//! stands in for the field line. Every line is added to the view,
//! culled, projected and mapped into the 64 × 64 camera frame using the
//! projected calibration corners.

use flview_core::view::SyntheticView;
use flview_math::coords::cyl_to_cart;
use flview_types::config::CORNER_LABELS;
use flview_types::constants::{
    FRAME_CENTER, FRAME_HALF_WINDOW, MIN_IN_FRAME_POINTS, PIXEL_MAX, TOROIDAL_ARC_POINTS,
    TRACE_STEP,
};
use flview_types::error::{ViewError, ViewResult};
use flview_types::record::{FieldLineRecord, FieldLineRecordBuilder, PendingRecord};
use flview_types::state::{NewSegment, Point3, PointCyl, SegmentKind};
use log::{debug, info, warn};
use std::f64::consts::PI;

/// Corner edge tilt above which the pixel mapping is reported as skewed [deg].
const MAX_CORNER_SKEW_DEG: f64 = 2.0;

/// One request to the external field-line tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRequest {
    pub shot: i64,
    pub time: f64,
    pub seed_r: f64,
    pub seed_z: f64,
    /// Starting azimuth relative to the radial direction [rad].
    pub start_azimuth: f64,
    pub step: f64,
    /// Toroidal angle of the seed [deg].
    pub phi_offset_deg: f64,
}

/// External magnetic field-line tracer.
///
/// Returns the curve in (R, Z, phi) ordered by trace parameter, or an
/// error that makes the caller skip the seed.
pub trait FieldLineTracer {
    fn trace(&self, request: &TraceRequest) -> ViewResult<Vec<PointCyl>>;
}

/// Purely toroidal arc at fixed (R, Z), `n` points from `phi_start_deg`
/// over `span_deg` (signed).
pub fn toroidal_arc(r: f64, z: f64, phi_start_deg: f64, span_deg: f64, n: usize) -> Vec<PointCyl> {
    if n < 2 {
        return vec![PointCyl::new(r, z, phi_start_deg); n];
    }
    (0..n)
        .map(|i| PointCyl::new(r, z, phi_start_deg + span_deg * i as f64 / (n - 1) as f64))
        .collect()
}

/// Net toroidal advance of a curve [deg], unwrapping steps across 0/360.
pub fn net_phi_advance(curve: &[PointCyl]) -> f64 {
    curve
        .windows(2)
        .map(|w| (w[1].phi_deg - w[0].phi_deg + 180.0).rem_euclid(360.0) - 180.0)
        .sum()
}

/// Expected sign of the toroidal advance for a view angle: alpha = 0 counts as +.
pub fn expected_phi_sense(alpha_deg: f64) -> f64 {
    if alpha_deg < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Affine map from local image-plane coordinates to camera pixels.
///
/// Bottom-left corner → (0, 0), top-right → (63, 63).
#[derive(Debug, Clone, Copy)]
pub struct PixelCalibration {
    pub bottom_left: (f64, f64),
    pub top_right: (f64, f64),
}

impl PixelCalibration {
    pub fn new(bottom_left: (f64, f64), top_right: (f64, f64)) -> ViewResult<Self> {
        let dx = top_right.0 - bottom_left.0;
        let dy = top_right.1 - bottom_left.1;
        if !(dx.is_finite() && dy.is_finite()) || dx == 0.0 || dy == 0.0 {
            return Err(ViewError::CalibrationUnavailable(format!(
                "corners {bottom_left:?} and {top_right:?} span no area"
            )));
        }
        Ok(PixelCalibration {
            bottom_left,
            top_right,
        })
    }

    /// Calibration from the projected corner markers of a built view.
    pub fn from_view(view: &SyntheticView) -> ViewResult<Self> {
        let corner = |label: &str| -> ViewResult<Point3> {
            view.projected_by_label(label)
                .and_then(|seg| seg.points.first().copied())
                .filter(|p| p.is_finite())
                .ok_or_else(|| {
                    ViewError::CalibrationUnavailable(format!(
                        "corner '{label}' is not visible in view '{}'",
                        view.config.view_kind
                    ))
                })
        };
        let bl = corner(CORNER_LABELS[0])?;
        let br = corner(CORNER_LABELS[1])?;
        let tr = corner(CORNER_LABELS[2])?;

        let skew = (br.y - bl.y).atan2(br.x - bl.x).to_degrees();
        if skew.abs() > MAX_CORNER_SKEW_DEG {
            warn!(
                "Calibration corners tilted by {skew:.2}° in view '{}'; \
                 tune rotation_deg for an axis-aligned frame",
                view.config.view_kind
            );
        }
        Self::new((bl.x, bl.y), (tr.x, tr.y))
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            PIXEL_MAX * (x - self.bottom_left.0) / (self.top_right.0 - self.bottom_left.0),
            PIXEL_MAX * (y - self.bottom_left.1) / (self.top_right.1 - self.bottom_left.1),
        )
    }

    /// Inside the ±36 pixel window around the frame centre; NaN is never in frame.
    pub fn in_frame(px: f64, py: f64) -> bool {
        (px - FRAME_CENTER).abs() <= FRAME_HALF_WINDOW
            && (py - FRAME_CENTER).abs() <= FRAME_HALF_WINDOW
    }
}

/// Where a field line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    /// Tracer result with the expected toroidal sense.
    Traced,
    /// Tracer failed the sense check twice; toroidal arc substituted.
    Fallback,
    /// No tracing requested; toroidal arc.
    Toroidal,
}

/// Records plus per-run bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct MappingReport {
    pub records: Vec<FieldLineRecord>,
    pub attempted: usize,
    pub traced: usize,
    pub fallback: usize,
    pub tracer_failures: usize,
    pub empty_frames: usize,
}

impl MappingReport {
    pub fn accepted(&self) -> usize {
        self.records.len()
    }
}

/// Trace (or synthesise) the curve for one seed.
fn seed_curve(
    view: &SyntheticView,
    tracer: Option<&dyn FieldLineTracer>,
    seed: (f64, f64),
    label: &str,
) -> ViewResult<(Vec<PointCyl>, LineOrigin)> {
    let config = &view.config;
    let phi0 = config.aperture.phi_deg;
    let sense = expected_phi_sense(config.alpha_deg);
    let arc = || {
        toroidal_arc(
            seed.0,
            seed.1,
            phi0,
            config.toroidal_span_deg * sense,
            TOROIDAL_ARC_POINTS,
        )
    };

    let Some(tracer) = tracer.filter(|_| config.tracing_enabled()) else {
        return Ok((arc(), LineOrigin::Toroidal));
    };

    let mut request = TraceRequest {
        shot: config.shot,
        time: config.time,
        seed_r: seed.0,
        seed_z: seed.1,
        start_azimuth: PI,
        step: TRACE_STEP,
        phi_offset_deg: phi0,
    };
    for start_azimuth in [PI, 0.0] {
        request.start_azimuth = start_azimuth;
        let curve = tracer.trace(&request).map_err(|e| ViewError::TracerFailure {
            seed: label.to_string(),
            message: e.to_string(),
        })?;
        let advance = net_phi_advance(&curve);
        if advance * sense > 0.0 {
            return Ok((curve, LineOrigin::Traced));
        }
        debug!("{label}: start azimuth {start_azimuth:.3} advances phi by {advance:.2}°");
    }

    warn!("{label}: tracer runs against the expected toroidal sense; using a toroidal arc");
    Ok((arc(), LineOrigin::Fallback))
}

/// Map every seed of the configured grid into pixel records.
///
/// Fails only when the pixel calibration is unavailable, or when tracing
/// is requested without a tracer. Per-seed tracer errors and lines with
/// fewer than four in-frame points are skipped and counted.
pub fn map_field_lines(
    view: &mut SyntheticView,
    tracer: Option<&dyn FieldLineTracer>,
) -> ViewResult<MappingReport> {
    let calibration = PixelCalibration::from_view(view)?;
    if view.config.tracing_enabled() && tracer.is_none() {
        return Err(ViewError::ConfigError(format!(
            "shot {} at t={} requests tracing but no tracer was supplied",
            view.config.shot, view.config.time
        )));
    }

    let grid = view.config.seed_grid();
    let (shot, time) = (view.config.shot, view.config.time);
    let mut report = MappingReport::default();
    let mut builder = FieldLineRecordBuilder::new();

    for (k, seed) in grid.seeds().into_iter().enumerate() {
        report.attempted += 1;
        let label = format!("fieldline{k}");

        let (curve, origin) = match seed_curve(view, tracer, seed, &label) {
            Ok(found) => found,
            Err(e) if e.is_recoverable() => {
                debug!("Skipping seed ({:.3}, {:.3}): {e}", seed.0, seed.1);
                report.tracer_failures += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        match origin {
            LineOrigin::Traced => report.traced += 1,
            LineOrigin::Fallback => report.fallback += 1,
            LineOrigin::Toroidal => {}
        }

        let traced_points = curve.len();
        let points = curve.into_iter().map(cyl_to_cart).collect();
        let projected =
            view.add_field_line(NewSegment::new(label.clone(), SegmentKind::FieldLine, points));

        let pixels: Vec<(f64, f64)> = projected
            .iter()
            .map(|p| calibration.to_pixel(p.x, p.y))
            .filter(|&(px, py)| PixelCalibration::in_frame(px, py))
            .collect();

        if pixels.len() < MIN_IN_FRAME_POINTS {
            let err = ViewError::EmptyFrame {
                label,
                in_frame: pixels.len(),
            };
            debug!("Dropping line: {err}");
            report.empty_frames += 1;
            continue;
        }

        debug!(
            "{label}: seed ({:.3}, {:.3}), {traced_points} points, {} in frame",
            seed.0,
            seed.1,
            pixels.len()
        );
        builder.push(PendingRecord {
            label,
            seed_index: k,
            shot,
            time,
            seed_r: seed.0,
            seed_z: seed.1,
            traced_points,
            pixels,
        });
    }

    report.records = builder.finish();
    info!(
        "Field-line mapping: {}/{} accepted ({} traced, {} fallback, {} tracer failures, {} empty)",
        report.accepted(),
        report.attempted,
        report.traced,
        report.fallback,
        report.tracer_failures,
        report.empty_frames
    );
    Ok(report)
}
