// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};
use crate::state::PointCyl;

/// Camera view configuration. One static view per run.
///
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Hardware view identity, part of the geometry cache key.
    pub view_kind: String,
    /// Pinhole position (R [m], Z [m], phi [deg]).
    pub aperture: PointCyl,
    /// Target in-plane azimuth relative to the inward radial direction [deg].
    pub alpha_deg: f64,
    /// Target elevation above horizontal [deg].
    pub beta_deg: f64,
    pub half_fov_deg: f64,
    /// Shadow threshold applied when the direct azimuth difference is the smaller one.
    pub shadow_angle_direct_deg: f64,
    /// Shadow threshold applied when the wrapped (360° complement) difference is smaller.
    pub shadow_angle_wrapped_deg: f64,
    /// Eye to image-plane distance [m].
    pub focal_distance: f64,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub magnification: f64,
    /// In-plane shift of the image rectangle, in units of the half width.
    pub pixel_shift: [f64; 2],
    /// In-plane rotation aligning image axes with pixel axes [deg].
    pub rotation_deg: f64,
    pub calibration_corners: CalibrationCorners,
    /// Device shot number; 0 together with `time == 0` selects the toroidal fallback.
    pub shot: i64,
    /// Equilibrium time [s].
    pub time: f64,
    /// Seed rectangle override; `None` uses the mode default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_grid: Option<SeedGrid>,
    /// Toroidal span of fallback arcs [deg].
    pub toroidal_span_deg: f64,
    /// Box smoothing width of the rasterizer [px].
    pub smoothing_window: usize,
    pub continuous_divertor: bool,
    pub ramp_version: u32,
}

/// Scene positions of the four camera-frame corners, picked on a real frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationCorners {
    pub bottom_left: PointCyl,
    pub bottom_right: PointCyl,
    pub top_right: PointCyl,
    pub top_left: PointCyl,
}

impl Default for CalibrationCorners {
    fn default() -> Self {
        CalibrationCorners {
            bottom_left: PointCyl::new(0.3888, -0.5424, 324.67),
            bottom_right: PointCyl::new(0.6517, -0.6033, 321.68),
            top_right: PointCyl::new(0.709, -0.347, 315.99),
            top_left: PointCyl::new(0.4449, -0.2861, 315.23),
        }
    }
}

impl CalibrationCorners {
    /// Corners paired with their segment labels, in generation order.
    pub fn labelled(&self) -> [(&'static str, PointCyl); 4] {
        [
            (CORNER_LABELS[0], self.bottom_left),
            (CORNER_LABELS[1], self.bottom_right),
            (CORNER_LABELS[2], self.top_right),
            (CORNER_LABELS[3], self.top_left),
        ]
    }
}

/// Calibration segment labels: bottom-left, bottom-right, top-right, top-left.
pub const CORNER_LABELS: [&str; 4] = ["calib_bl", "calib_br", "calib_tr", "calib_tl"];

/// Rectangular grid of field-line seeds on the divertor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedGrid {
    #[serde(rename = "R_min")]
    pub r_min: f64,
    #[serde(rename = "R_max")]
    pub r_max: f64,
    #[serde(rename = "Z_min")]
    pub z_min: f64,
    #[serde(rename = "Z_max")]
    pub z_max: f64,
    pub nr: usize,
    pub nz: usize,
}

const DIVERTOR_R: (f64, f64) = (0.49, 0.62);
const DIVERTOR_Z: (f64, f64) = (-0.50, -0.33);

impl SeedGrid {
    /// Default grid when the field-line tracer is used.
    pub fn tracing() -> Self {
        Self::divertor(20, 20)
    }

    /// Default grid for the pure toroidal fallback.
    pub fn toroidal() -> Self {
        Self::divertor(11, 2)
    }

    fn divertor(nr: usize, nz: usize) -> Self {
        SeedGrid {
            r_min: DIVERTOR_R.0,
            r_max: DIVERTOR_R.1,
            z_min: DIVERTOR_Z.0,
            z_max: DIVERTOR_Z.1,
            nr,
            nz,
        }
    }

    pub fn len(&self) -> usize {
        self.nr * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seeds in grid order; index `k = iz * nr + ir`.
    pub fn seeds(&self) -> Vec<(f64, f64)> {
        let step = |lo: f64, hi: f64, n: usize, i: usize| {
            if n > 1 {
                lo + (hi - lo) * i as f64 / (n - 1) as f64
            } else {
                0.5 * (lo + hi)
            }
        };
        let mut out = Vec::with_capacity(self.len());
        for iz in 0..self.nz {
            let z = step(self.z_min, self.z_max, self.nz, iz);
            for ir in 0..self.nr {
                out.push((step(self.r_min, self.r_max, self.nr, ir), z));
            }
        }
        out
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            view_kind: "divertor".to_string(),
            aperture: PointCyl::new(1.00, -0.252, 11.0),
            alpha_deg: -34.0,
            beta_deg: -14.0,
            half_fov_deg: 15.0,
            shadow_angle_direct_deg: 180.0,
            shadow_angle_wrapped_deg: 180.0,
            focal_distance: 0.3,
            pixel_width: 64,
            pixel_height: 64,
            magnification: 1.0,
            pixel_shift: [0.0, 0.0],
            rotation_deg: 0.0,
            calibration_corners: CalibrationCorners::default(),
            shot: 0,
            time: 0.0,
            seed_grid: None,
            toroidal_span_deg: 120.0,
            smoothing_window: 7,
            continuous_divertor: false,
            ramp_version: 0,
        }
    }
}

impl ViewConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> ViewResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Real tracer mode requires both shot and time to be non-zero.
    pub fn tracing_enabled(&self) -> bool {
        self.shot != 0 && self.time != 0.0
    }

    pub fn seed_grid(&self) -> SeedGrid {
        self.seed_grid.unwrap_or_else(|| {
            if self.tracing_enabled() {
                SeedGrid::tracing()
            } else {
                SeedGrid::toroidal()
            }
        })
    }

    /// Sensor aspect ratio, width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.pixel_width as f64 / self.pixel_height as f64
    }

    pub fn validate(&self) -> ViewResult<()> {
        let finite = [
            self.aperture.r,
            self.aperture.z,
            self.aperture.phi_deg,
            self.alpha_deg,
            self.beta_deg,
            self.rotation_deg,
            self.pixel_shift[0],
            self.pixel_shift[1],
            self.time,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ViewError::ConfigError(
                "aperture, angles, shift and time must be finite".to_string(),
            ));
        }
        if !(0.0..90.0).contains(&self.half_fov_deg) {
            return Err(ViewError::ConfigError(format!(
                "half_fov_deg must lie in [0, 90), got {}",
                self.half_fov_deg
            )));
        }
        for (name, v) in [
            ("shadow_angle_direct_deg", self.shadow_angle_direct_deg),
            ("shadow_angle_wrapped_deg", self.shadow_angle_wrapped_deg),
        ] {
            if !(0.0..=180.0).contains(&v) {
                return Err(ViewError::ConfigError(format!(
                    "{name} must lie in [0, 180], got {v}"
                )));
            }
        }
        if !(self.focal_distance > 0.0) || !(self.magnification > 0.0) {
            return Err(ViewError::ConfigError(
                "focal_distance and magnification must be > 0".to_string(),
            ));
        }
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(ViewError::ConfigError(
                "pixel_width and pixel_height must be >= 1".to_string(),
            ));
        }
        if self.smoothing_window == 0 {
            return Err(ViewError::ConfigError(
                "smoothing_window must be >= 1".to_string(),
            ));
        }
        if !(self.toroidal_span_deg > 0.0) {
            return Err(ViewError::ConfigError(
                "toroidal_span_deg must be > 0".to_string(),
            ));
        }
        let grid = self.seed_grid();
        if grid.is_empty() || !(grid.r_min <= grid.r_max) || !(grid.z_min <= grid.z_max) {
            return Err(ViewError::ConfigError(format!(
                "invalid seed grid {grid:?}"
            )));
        }
        Ok(())
    }
}
