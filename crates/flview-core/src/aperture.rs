// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Aperture & Sightline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sightline search: find the hardware point seen at the requested
//! (alpha, beta) from the aperture.
//!
//! alpha is the in-plane angle between the horizontal line of sight and
//! the inward radial direction at the eye, signed by the candidate's X
//! coordinate; beta is the elevation of the line of sight.
//!
//! The scan is first-match, not best-match: hardware segments are
//! visited in store order and points in polyline order, and the first
//! point inside the tolerance window wins.

use flview_types::constants::{
    ALPHA_TOLERANCE_DEG, BETA_TOLERANCE_DEG, EPS_LENGTH, SIGHTLINE_REACH_FACTOR,
};
use flview_types::error::{ViewError, ViewResult};
use flview_types::state::{Point3, SegmentId, SegmentKind, SegmentStore};
use log::debug;

/// Optical axis of the camera: eye → spot.
#[derive(Debug, Clone, Copy)]
pub struct Sightline {
    pub eye: Point3,
    pub spot: Point3,
    /// Segment holding the spot.
    pub spot_id: SegmentId,
    /// Index of the spot inside its segment.
    pub spot_point: usize,
    /// spot − eye.
    pub sight: Point3,
    pub length: f64,
}

/// Viewing angles (alpha, beta) [deg] of `p` seen from `eye`.
///
/// `None` for degenerate or out-of-reach candidates.
pub fn viewing_angles(eye: Point3, p: Point3) -> Option<(f64, f64)> {
    let v = p - eye;
    let v_xy = v.norm_xy();
    let v_len = v.norm();
    let eye_xy = eye.norm_xy();
    if v_xy < EPS_LENGTH || v_len < EPS_LENGTH || eye_xy < EPS_LENGTH {
        return None;
    }
    if v_len > SIGHTLINE_REACH_FACTOR * eye.y.abs() {
        return None;
    }

    let cos_alpha = (-(eye.x * v.x + eye.y * v.y) / (v_xy * eye_xy)).clamp(-1.0, 1.0);
    let alpha = p.x.signum() * cos_alpha.acos().to_degrees();
    let beta = (v.z / v_len).clamp(-1.0, 1.0).asin().to_degrees();
    Some((alpha, beta))
}

/// First hardware point matching (alpha, beta) within tolerance.
pub fn locate_sightline(
    eye: Point3,
    alpha_deg: f64,
    beta_deg: f64,
    store: &SegmentStore,
) -> ViewResult<Sightline> {
    let mut searched = 0usize;

    for seg in store.iter().filter(|s| s.kind == SegmentKind::Hardware) {
        for (ip, &p) in seg.points.iter().enumerate() {
            searched += 1;
            let Some((alpha, beta)) = viewing_angles(eye, p) else {
                continue;
            };
            if (alpha_deg - alpha).abs() < ALPHA_TOLERANCE_DEG
                && (beta_deg - beta).abs() < BETA_TOLERANCE_DEG
            {
                let sight = p - eye;
                debug!(
                    "Sightline found on {} point {ip}: alpha={alpha:.3}°, beta={beta:.3}° \
                     after {searched} candidates",
                    seg.label
                );
                return Ok(Sightline {
                    eye,
                    spot: p,
                    spot_id: seg.id,
                    spot_point: ip,
                    sight,
                    length: sight.norm(),
                });
            }
        }
    }

    Err(ViewError::AlignmentNotFound {
        alpha_deg,
        beta_deg,
        searched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flview_math::coords::cyl_to_cart;
    use flview_types::state::{NewSegment, PointCyl};

    fn eye() -> Point3 {
        cyl_to_cart(PointCyl::new(1.0, -0.252, 11.0))
    }

    /// Point at horizontal distance `s` along (alpha, beta) from the eye.
    fn along(eye: Point3, alpha_deg: f64, beta_deg: f64, s: f64) -> Point3 {
        let inward = Point3::new(-eye.x, -eye.y, 0.0).normalized().unwrap();
        // Negative alpha turns clockwise seen from above
        let (sa, ca) = alpha_deg.to_radians().sin_cos();
        let dir = Point3::new(
            ca * inward.x - sa * inward.y,
            sa * inward.x + ca * inward.y,
            0.0,
        );
        eye + dir * s + Point3::new(0.0, 0.0, s * beta_deg.to_radians().tan())
    }

    #[test]
    fn test_viewing_angles_of_constructed_point() {
        let e = eye();
        let p = along(e, -34.0, -14.0, 0.8);
        assert!(p.x < 0.0, "alpha < 0 requires a candidate with x < 0");
        let (alpha, beta) = viewing_angles(e, p).unwrap();
        assert!((alpha + 34.0).abs() < 1e-9, "alpha = {alpha}");
        assert!((beta + 14.0).abs() < 1e-9, "beta = {beta}");
    }

    #[test]
    fn test_out_of_reach_is_rejected() {
        let e = eye();
        let far = along(e, -34.0, -14.0, 1.6);
        assert!(viewing_angles(e, far).is_none());
        assert!(viewing_angles(e, e).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let e = eye();
        let near = along(e, -34.2, -14.1, 0.7);
        let exact = along(e, -34.0, -14.0, 0.8);
        let mut store = SegmentStore::new();
        store.extend(vec![
            NewSegment::new("miss", SegmentKind::Hardware, vec![along(e, 10.0, -5.0, 0.5)]),
            NewSegment::new("tile", SegmentKind::Hardware, vec![near, exact]),
        ]);
        let sl = locate_sightline(e, -34.0, -14.0, &store).unwrap();
        assert_eq!(sl.spot_id, SegmentId(1));
        assert_eq!(sl.spot_point, 0);
        assert!((sl.spot - near).norm() < 1e-12);
        assert!((sl.length - sl.sight.norm()).abs() < 1e-15);
    }

    #[test]
    fn test_calibration_segments_are_not_searched() {
        let e = eye();
        let mut store = SegmentStore::new();
        store.extend(vec![NewSegment::new(
            "calib_bl",
            SegmentKind::Calibration,
            vec![along(e, -34.0, -14.0, 0.8)],
        )]);
        let err = locate_sightline(e, -34.0, -14.0, &store).unwrap_err();
        assert!(matches!(err, ViewError::AlignmentNotFound { searched: 0, .. }));
    }

    #[test]
    fn test_no_match_reports_search_size() {
        let e = eye();
        let mut store = SegmentStore::new();
        store.extend(vec![NewSegment::new(
            "tile",
            SegmentKind::Hardware,
            vec![along(e, 20.0, -14.0, 0.8), along(e, -34.0, -5.0, 0.8)],
        )]);
        match locate_sightline(e, -34.0, -14.0, &store) {
            Err(ViewError::AlignmentNotFound { searched, .. }) => assert_eq!(searched, 2),
            other => panic!("expected AlignmentNotFound, got {other:?}"),
        }
    }
}
