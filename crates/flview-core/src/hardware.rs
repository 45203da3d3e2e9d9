// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Hardware Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Hardware geometry sources, the geometry cache and calibration markers.
//!
//! Tile geometry comes from an external loader behind [`HardwareSource`].
//! Loads are memoised by [`GeometryCache`], an explicit object owned by
//! the caller and keyed by device features and camera view.

use std::collections::HashMap;

use flview_math::coords::cyl_to_cart;
use flview_types::config::{CalibrationCorners, ViewConfig};
use flview_types::error::ViewResult;
use flview_types::state::{NewSegment, PointCyl, SegmentKind};
use log::debug;

/// External supplier of wall-tile polylines.
pub trait HardwareSource {
    /// Wall tiles visible from a camera view.
    fn load_hardware_geometry(
        &self,
        view_kind: &str,
        continuous_divertor: bool,
    ) -> ViewResult<Vec<NewSegment>>;

    /// Ramped divertor tiles of the given design version (0 = none).
    fn load_ramped_tile_geometry(&self, version: u32) -> ViewResult<Vec<NewSegment>>;
}

/// Cache key: everything the hardware geometry depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    pub view_kind: String,
    pub continuous_divertor: bool,
    pub ramp_version: u32,
}

impl GeometryKey {
    pub fn from_config(config: &ViewConfig) -> Self {
        GeometryKey {
            view_kind: config.view_kind.clone(),
            continuous_divertor: config.continuous_divertor,
            ramp_version: config.ramp_version,
        }
    }
}

/// Memoised hardware geometry, constructed and invalidated by its owner.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: HashMap<GeometryKey, Vec<NewSegment>>,
    hits: usize,
    misses: usize,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached geometry for `key`, loading hardware then ramped tiles on a miss.
    pub fn get_or_load(
        &mut self,
        source: &dyn HardwareSource,
        key: &GeometryKey,
    ) -> ViewResult<&[NewSegment]> {
        if self.entries.contains_key(key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let mut segments =
                source.load_hardware_geometry(&key.view_kind, key.continuous_divertor)?;
            if key.ramp_version > 0 {
                segments.extend(source.load_ramped_tile_geometry(key.ramp_version)?);
            }
            debug!(
                "Geometry cache miss for {:?}: loaded {} segments",
                key,
                segments.len()
            );
            self.entries.insert(key.clone(), segments);
        }
        Ok(self.entries.get(key).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, key: &GeometryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since construction.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

/// One single-point marker segment per calibration corner,
/// labelled `calib_bl`, `calib_br`, `calib_tr`, `calib_tl`.
pub fn calibration_segments(corners: &CalibrationCorners) -> Vec<NewSegment> {
    corners
        .labelled()
        .iter()
        .map(|&(label, p)| NewSegment::new(label, SegmentKind::Calibration, vec![cyl_to_cart(p)]))
        .collect()
}

/// Axisymmetric wall built from a poloidal (R, Z) contour.
///
/// Produces one toroidal ring per contour vertex and one poloidal
/// contour per port angle. Without a continuous divertor the rings are
/// broken into one tile per port sector.
#[derive(Debug, Clone)]
pub struct AxisymmetricWall {
    pub profile: Vec<(f64, f64)>,
    pub phi_step_deg: f64,
    pub port_spacing_deg: f64,
}

impl AxisymmetricWall {
    pub fn new(profile: Vec<(f64, f64)>, phi_step_deg: f64) -> Self {
        AxisymmetricWall {
            profile,
            phi_step_deg,
            port_spacing_deg: flview_types::constants::PORT_SPACING_DEG,
        }
    }

    /// Flat divertor floor at height `z` from `r_min` to `r_max`.
    pub fn flat_floor(z: f64, r_min: f64, r_max: f64, dr: f64, phi_step_deg: f64) -> Self {
        let n = ((r_max - r_min) / dr).round() as usize + 1;
        let profile = (0..n).map(|i| (r_min + i as f64 * dr, z)).collect();
        Self::new(profile, phi_step_deg)
    }

    fn ring(&self, r: f64, z: f64, phi_lo: f64, phi_hi: f64) -> Vec<PointCyl> {
        let n = ((phi_hi - phi_lo) / self.phi_step_deg).round().max(1.0) as usize;
        (0..=n)
            .map(|i| PointCyl::new(r, z, phi_lo + (phi_hi - phi_lo) * i as f64 / n as f64))
            .collect()
    }
}

impl HardwareSource for AxisymmetricWall {
    fn load_hardware_geometry(
        &self,
        view_kind: &str,
        continuous_divertor: bool,
    ) -> ViewResult<Vec<NewSegment>> {
        let mut out = Vec::new();
        let n_ports = (360.0 / self.port_spacing_deg).round() as usize;

        for (iv, &(r, z)) in self.profile.iter().enumerate() {
            let pieces: Vec<Vec<PointCyl>> = if continuous_divertor {
                // Stop one step short of 360 so the ring does not repeat phi = 0
                vec![self.ring(r, z, 0.0, 360.0 - self.phi_step_deg)]
            } else {
                (0..n_ports)
                    .map(|k| {
                        let lo = k as f64 * self.port_spacing_deg;
                        self.ring(r, z, lo, lo + self.port_spacing_deg)
                    })
                    .collect()
            };
            for (ip, piece) in pieces.into_iter().enumerate() {
                let pts = piece.into_iter().map(cyl_to_cart).collect();
                out.push(NewSegment::new(
                    format!("{view_kind}_ring{iv}_{ip}"),
                    SegmentKind::Hardware,
                    pts,
                ));
            }
        }

        for k in 0..n_ports {
            let phi = k as f64 * self.port_spacing_deg;
            let pts = self
                .profile
                .iter()
                .map(|&(r, z)| cyl_to_cart(PointCyl::new(r, z, phi)))
                .collect();
            out.push(NewSegment::new(
                format!("{view_kind}_port{k}"),
                SegmentKind::Hardware,
                pts,
            ));
        }
        Ok(out)
    }

    fn load_ramped_tile_geometry(&self, _version: u32) -> ViewResult<Vec<NewSegment>> {
        Ok(Vec::new())
    }
}
