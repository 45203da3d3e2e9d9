// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Projection
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pinhole projection of scene points onto the image plane.
//!
//! Each point is joined to the eye and the line is intersected with the
//! plane. The line parameter may be negative: the plane lies between the
//! spot and the eye, not necessarily between the point and the eye.

use flview_math::frame::rotate_about_z;
use flview_types::constants::EPS_LENGTH;
use flview_types::state::{Point3, SegmentId, SegmentKind, SegmentStore};

use crate::image_plane::ImagePlane;

/// Intersection of the line through `p` and `eye` with the plane, in scene coordinates.
pub fn intersect_plane(p: Point3, eye: Point3, plane: &ImagePlane) -> Option<Point3> {
    let dir = eye - p;
    let n = plane.normal();
    let denom = dir.dot(n);
    if denom.abs() < EPS_LENGTH {
        return None;
    }
    let t = (plane.origin() - p).dot(n) / denom;
    Some(p + dir * t)
}

/// Local image-plane coordinates of `p`, rotated by `rotation_deg`.
///
/// Local Z is reported as 0. A line parallel to the plane gives NaN
/// coordinates so outputs stay index-aligned with their inputs.
pub fn project_point(p: Point3, eye: Point3, plane: &ImagePlane, rotation_deg: f64) -> Point3 {
    match intersect_plane(p, eye, plane) {
        Some(hit) => {
            let local = plane.to_local(hit);
            rotate_about_z(Point3::new(local.x, local.y, 0.0), rotation_deg)
        }
        None => Point3::new(f64::NAN, f64::NAN, 0.0),
    }
}

/// Projected counterpart of one culled segment.
#[derive(Debug, Clone)]
pub struct ProjectedSegment {
    pub id: SegmentId,
    pub label: String,
    pub kind: SegmentKind,
    pub points: Vec<Point3>,
}

pub fn project_points(
    points: &[Point3],
    eye: Point3,
    plane: &ImagePlane,
    rotation_deg: f64,
) -> Vec<Point3> {
    points
        .iter()
        .map(|&p| project_point(p, eye, plane, rotation_deg))
        .collect()
}

/// Project every segment of a culled store, index-aligned with it.
pub fn project_store(
    store: &SegmentStore,
    eye: Point3,
    plane: &ImagePlane,
    rotation_deg: f64,
) -> Vec<ProjectedSegment> {
    store
        .iter()
        .map(|seg| ProjectedSegment {
            id: seg.id,
            label: seg.label.clone(),
            kind: seg.kind,
            points: project_points(&seg.points, eye, plane, rotation_deg),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Point3, Point3, ImagePlane) {
        let eye = Point3::new(0.19, 0.98, -0.25);
        let spot = Point3::new(-0.37, 0.42, -0.45);
        let plane = ImagePlane::build(eye, spot, 0.3, 1.0, 1.0, [0.0, 0.0]).unwrap();
        (eye, spot, plane)
    }

    #[test]
    fn test_spot_projects_to_origin() {
        let (eye, spot, plane) = setup();
        let p = project_point(spot, eye, &plane, 0.0);
        assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn test_point_on_plane_is_fixed() {
        let (eye, _, plane) = setup();
        let local = Point3::new(0.013, -0.021, 0.0);
        let p = project_point(plane.to_world(local), eye, &plane, 0.0);
        assert!((p - local).norm() < 1e-12);
    }

    #[test]
    fn test_points_on_one_ray_coincide() {
        let (eye, spot, plane) = setup();
        let target = spot + Point3::new(0.02, -0.03, 0.01);
        let nearer = eye + (target - eye) * 0.5;
        let a = project_point(target, eye, &plane, 0.0);
        let b = project_point(nearer, eye, &plane, 0.0);
        assert!((a - b).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_applied_in_plane() {
        let (eye, _, plane) = setup();
        let local = Point3::new(0.02, 0.0, 0.0);
        let p = project_point(plane.to_world(local), eye, &plane, 90.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_ray_gives_nan() {
        let (eye, _, plane) = setup();
        // Displaced from the eye within a plane parallel to the sensor
        let p = eye + plane.frame.x * 0.1;
        let out = project_point(p, eye, &plane, 0.0);
        assert!(out.x.is_nan() && out.y.is_nan());
    }
}
