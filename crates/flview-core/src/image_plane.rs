// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Image Plane
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Virtual sensor rectangle placed on the optical axis in front of the eye.
//!
//! The plane sits `focal_distance` from the eye towards the spot, so the
//! projected image is upright. Its frame takes Z exactly along spot → eye
//! and X from the radial direction through the plane origin, made
//! orthogonal to Z.

use flview_math::frame::OrthoFrame;
use flview_types::config::ViewConfig;
use flview_types::constants::PLANE_HALF_WIDTH;
use flview_types::error::{ViewError, ViewResult};
use flview_types::state::Point3;

use crate::aperture::Sightline;

#[derive(Debug, Clone, Copy)]
pub struct ImagePlane {
    pub frame: OrthoFrame,
    pub half_width: f64,
    pub half_height: f64,
    /// Rectangle centre offset in local coordinates.
    pub shift: (f64, f64),
    /// Local corners: bottom-left, bottom-right, top-right, top-left.
    pub corners_local: [Point3; 4],
    /// Same corners in scene coordinates.
    pub corners: [Point3; 4],
}

impl ImagePlane {
    /// Build the plane for an eye/spot pair.
    ///
    /// - `aspect`: sensor width / height
    /// - `pixel_shift`: rectangle offset in units of the half width
    pub fn build(
        eye: Point3,
        spot: Point3,
        focal_distance: f64,
        aspect: f64,
        magnification: f64,
        pixel_shift: [f64; 2],
    ) -> ViewResult<Self> {
        if !(focal_distance > 0.0 && aspect > 0.0 && magnification > 0.0) {
            return Err(ViewError::ConfigError(
                "image plane needs focal_distance, aspect and magnification > 0".to_string(),
            ));
        }
        let to_eye = (eye - spot).normalized().ok_or_else(|| {
            ViewError::ConfigError("eye and spot coincide; no optical axis".to_string())
        })?;
        let origin = eye - to_eye * focal_distance;
        let radial = Point3::new(origin.x, origin.y, 0.0);
        let frame = OrthoFrame::from_z_and_x_hint(origin, to_eye, radial).ok_or_else(|| {
            ViewError::ConfigError(
                "optical axis is parallel to the radial direction hint".to_string(),
            )
        })?;

        let half_width = PLANE_HALF_WIDTH / magnification;
        let half_height = half_width / aspect;
        let shift = (pixel_shift[0] * half_width, pixel_shift[1] * half_width);
        let corners_local = [
            Point3::new(shift.0 - half_width, shift.1 - half_height, 0.0),
            Point3::new(shift.0 + half_width, shift.1 - half_height, 0.0),
            Point3::new(shift.0 + half_width, shift.1 + half_height, 0.0),
            Point3::new(shift.0 - half_width, shift.1 + half_height, 0.0),
        ];
        let corners = corners_local.map(|c| frame.to_world(c));

        Ok(ImagePlane {
            frame,
            half_width,
            half_height,
            shift,
            corners_local,
            corners,
        })
    }

    pub fn from_config(sightline: &Sightline, config: &ViewConfig) -> ViewResult<Self> {
        Self::build(
            sightline.eye,
            sightline.spot,
            config.focal_distance,
            config.aspect_ratio(),
            config.magnification,
            config.pixel_shift,
        )
    }

    pub fn origin(&self) -> Point3 {
        self.frame.origin
    }

    /// Plane normal, pointing from the spot towards the eye.
    pub fn normal(&self) -> Point3 {
        self.frame.z
    }

    pub fn to_local(&self, p: Point3) -> Point3 {
        self.frame.to_local(p)
    }

    pub fn to_world(&self, local: Point3) -> Point3 {
        self.frame.to_world(local)
    }

    /// Scene point at distance `depth` from `eye` on the ray through the
    /// local plane position `(x, y)`.
    pub fn back_project(&self, eye: Point3, x: f64, y: f64, depth: f64) -> Option<Point3> {
        let on_plane = self.to_world(Point3::new(x, y, 0.0));
        let dir = (on_plane - eye).normalized()?;
        Some(eye + dir * depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> (Point3, Point3, ImagePlane) {
        let eye = Point3::new(0.19, 0.98, -0.25);
        let spot = Point3::new(-0.37, 0.42, -0.45);
        let plane = ImagePlane::build(eye, spot, 0.3, 1.0, 1.0, [0.0, 0.0]).unwrap();
        (eye, spot, plane)
    }

    #[test]
    fn test_origin_between_eye_and_spot() {
        let (eye, spot, plane) = plane();
        assert!(((plane.origin() - eye).norm() - 0.3).abs() < 1e-12);
        assert!((plane.origin() - spot).norm() < (eye - spot).norm());
        // Normal points back at the eye
        assert!((eye - plane.origin()).dot(plane.normal()) > 0.0);
    }

    #[test]
    fn test_frame_orthonormal() {
        let (_, _, plane) = plane();
        assert!(plane.frame.orthonormality_error() < 1e-12);
    }

    #[test]
    fn test_corners_lie_on_plane() {
        let (_, _, plane) = plane();
        for c in plane.corners {
            assert!(plane.to_local(c).z.abs() < 1e-12);
        }
        let diag = plane.corners[2] - plane.corners[0];
        assert!((diag.norm() - (2.0f64 * 0.05 * 0.05 * 4.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_aspect_and_shift() {
        let eye = Point3::new(0.19, 0.98, -0.25);
        let spot = Point3::new(-0.37, 0.42, -0.45);
        let plane = ImagePlane::build(eye, spot, 0.3, 2.0, 2.0, [1.0, -0.5]).unwrap();
        assert!((plane.half_width - 0.025).abs() < 1e-15);
        assert!((plane.half_height - 0.0125).abs() < 1e-15);
        assert!((plane.corners_local[0].x - 0.0).abs() < 1e-15);
        assert!((plane.corners_local[2].y - 0.0).abs() < 1e-15);
    }

    #[test]
    fn test_degenerate_axes_rejected() {
        let eye = Point3::new(0.0, 0.0, 1.0);
        // Spot straight below: the radial hint at the origin vanishes
        assert!(ImagePlane::build(eye, Point3::new(0.0, 0.0, 0.0), 0.3, 1.0, 1.0, [0.0; 2])
            .is_err());
        assert!(ImagePlane::build(eye, eye, 0.3, 1.0, 1.0, [0.0; 2]).is_err());
    }

    #[test]
    fn test_back_project_hits_requested_depth() {
        let (eye, _, plane) = plane();
        let p = plane.back_project(eye, 0.02, -0.01, 0.9).unwrap();
        assert!(((p - eye).norm() - 0.9).abs() < 1e-12);
    }
}
