// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Synthetic image side length [px]. Camera frames are binned to 64×64.
pub const IMAGE_SIZE: usize = 64;

/// Largest pixel index along either image axis.
pub const PIXEL_MAX: f64 = (IMAGE_SIZE - 1) as f64;

/// Image centre used by the in-frame window [px].
pub const FRAME_CENTER: f64 = 32.0;

/// Half width of the in-frame window around the image centre [px].
pub const FRAME_HALF_WINDOW: f64 = 36.0;

/// Field lines with fewer in-frame points are dropped.
pub const MIN_IN_FRAME_POINTS: usize = 4;

/// Angular spacing of the horizontal ports [deg].
pub const PORT_SPACING_DEG: f64 = 36.0;

/// Sightline search tolerance on alpha [deg].
pub const ALPHA_TOLERANCE_DEG: f64 = 1.0;

/// Sightline search tolerance on beta [deg].
pub const BETA_TOLERANCE_DEG: f64 = 0.3;

/// Candidates farther than this multiple of |eye.y| are rejected.
pub const SIGHTLINE_REACH_FACTOR: f64 = 1.5;

/// Lengths below this are treated as zero when normalising.
pub const EPS_LENGTH: f64 = 1e-12;

/// Half width of the image-plane rectangle at unit magnification.
pub const PLANE_HALF_WIDTH: f64 = 0.05;

/// Field-line tracer step length [m].
pub const TRACE_STEP: f64 = 0.002;

/// Points in a synthetic toroidal arc.
pub const TOROIDAL_ARC_POINTS: usize = 100;

/// Rasterizer footprint radius [px].
pub const RASTER_RADIUS: f64 = 2.0;

/// Peak rasterizer intensity.
pub const RASTER_PEAK: f64 = 1000.0;

/// Spline resampling interval along the chord-length parameter [px].
pub const RESAMPLE_INTERVAL: f64 = 1.0;
