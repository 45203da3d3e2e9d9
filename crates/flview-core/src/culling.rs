// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field-of-View Culling
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Field-of-view cone and azimuthal shadow culling.
//!
//! A point survives when its line of sight lies within the half field of
//! view of the optical axis and its toroidal distance from the spot does
//! not exceed the shadow threshold selected for it. The toroidal distance
//! is the smaller of the direct difference `d` and its complement
//! `360 − d`; whichever wins picks the direct or the wrapped threshold.
//! This approximates self-occlusion of the torus and is tuned against
//! calibration images for one camera geometry.

use flview_math::coords::{azimuth_deg, cart_to_cyl};
use flview_types::config::ViewConfig;
use flview_types::constants::{EPS_LENGTH, PORT_SPACING_DEG};
use flview_types::state::{Point3, Segment, SegmentId, SegmentStore};
use log::debug;

use crate::aperture::Sightline;

/// Port tagging tolerance on phi [deg].
const PORT_PHI_TOL: f64 = 1e-9;

/// Everything the culler needs; copied from the sightline and config.
#[derive(Debug, Clone, Copy)]
pub struct CullParams {
    pub eye: Point3,
    pub sight: Point3,
    pub sight_length: f64,
    pub half_fov_deg: f64,
    pub shadow_direct_deg: f64,
    pub shadow_wrapped_deg: f64,
    pub spot_phi_deg: f64,
}

impl CullParams {
    pub fn new(sightline: &Sightline, config: &ViewConfig) -> Self {
        CullParams {
            eye: sightline.eye,
            sight: sightline.sight,
            sight_length: sightline.length,
            half_fov_deg: config.half_fov_deg,
            shadow_direct_deg: config.shadow_angle_direct_deg,
            shadow_wrapped_deg: config.shadow_angle_wrapped_deg,
            spot_phi_deg: azimuth_deg(sightline.spot),
        }
    }

    /// Angle between the line of sight to `p` and the optical axis [deg].
    pub fn off_axis_deg(&self, p: Point3) -> Option<f64> {
        let v = p - self.eye;
        let v_len = v.norm();
        if v_len < EPS_LENGTH || self.sight_length < EPS_LENGTH {
            return None;
        }
        let cos = (v.dot(self.sight) / (v_len * self.sight_length)).clamp(-1.0, 1.0);
        Some(cos.acos().to_degrees())
    }

    /// Toroidal distance from the spot and the threshold that applies to it.
    pub fn shadow_distance(&self, p: Point3) -> (f64, f64) {
        let direct = (azimuth_deg(p) - self.spot_phi_deg).abs();
        let wrapped = 360.0 - direct;
        if direct <= wrapped {
            (direct, self.shadow_direct_deg)
        } else {
            (wrapped, self.shadow_wrapped_deg)
        }
    }

    pub fn is_visible(&self, p: Point3) -> bool {
        match self.off_axis_deg(p) {
            Some(angle) if angle <= self.half_fov_deg => {
                let (dist, threshold) = self.shadow_distance(p);
                dist <= threshold
            }
            _ => false,
        }
    }
}

/// Port colour index (1-based) when the first two points both sit on a
/// port plane, i.e. at a multiple of the port spacing.
pub fn port_index(seg: &Segment) -> Option<usize> {
    if seg.points.len() < 2 {
        return None;
    }
    let on_port = |p: Point3| {
        let phi = cart_to_cyl(p).phi_deg;
        let k = (phi / PORT_SPACING_DEG).round();
        ((phi - k * PORT_SPACING_DEG).abs() < PORT_PHI_TOL).then_some(k)
    };
    match (on_port(seg.points[0]), on_port(seg.points[1])) {
        (Some(k0), Some(k1)) if k0 == k1 => Some((k0 as usize) % 10 + 1),
        _ => None,
    }
}

/// Visible points of one segment, with their original indices.
pub fn cull_segment(params: &CullParams, seg: &Segment) -> Option<(Segment, Vec<usize>)> {
    let kept: Vec<usize> = seg
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| params.is_visible(**p))
        .map(|(i, _)| i)
        .collect();
    if kept.is_empty() {
        return None;
    }
    let mut out = seg.subset(&kept);
    out.port = port_index(seg);
    Some((out, kept))
}

/// Culled scene: trimmed store plus the bookkeeping back to the original.
#[derive(Debug, Clone)]
pub struct CulledScene {
    /// Surviving segments, original ids kept.
    pub store: SegmentStore,
    /// Original point indices kept per surviving segment, dense order.
    pub kept: Vec<Vec<usize>>,
    /// Spot location in the trimmed store: (dense segment, point).
    pub spot: Option<(usize, usize)>,
}

impl CulledScene {
    pub fn point_count(&self) -> usize {
        self.store.point_count()
    }

    /// Append an already culled segment (e.g. a new field line).
    pub fn adopt(&mut self, seg: Segment, kept: Vec<usize>) {
        self.store.adopt(seg);
        self.kept.push(kept);
    }
}

/// Cull every segment of `store`; `spot` is the located sightline point.
pub fn cull_store(
    params: &CullParams,
    store: &SegmentStore,
    spot: Option<(SegmentId, usize)>,
) -> CulledScene {
    let mut segments = Vec::new();
    let mut kept_all = Vec::new();
    let mut spot_reduced = None;

    for seg in store.iter() {
        if let Some((trimmed, kept)) = cull_segment(params, seg) {
            if let Some((spot_id, spot_point)) = spot {
                if seg.id == spot_id {
                    spot_reduced = kept
                        .iter()
                        .position(|&i| i == spot_point)
                        .map(|ip| (segments.len(), ip));
                }
            }
            segments.push(trimmed);
            kept_all.push(kept);
        }
    }

    let culled = CulledScene {
        store: SegmentStore::from_segments(segments, store.next_id()),
        kept: kept_all,
        spot: spot_reduced,
    };
    debug!(
        "Culled {} → {} segments, {} → {} points",
        store.len(),
        culled.store.len(),
        store.point_count(),
        culled.point_count()
    );
    culled
}
