// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Orthonormal Frames
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Right-handed orthonormal frames anchored at a scene point.

use flview_types::state::Point3;

/// Local frame: `world = origin + lx·x + ly·y + lz·z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoFrame {
    pub origin: Point3,
    pub x: Point3,
    pub y: Point3,
    pub z: Point3,
}

impl OrthoFrame {
    /// Frame whose Z axis is exactly `z_dir` and whose X axis is the
    /// component of `x_hint` orthogonal to it (Gram–Schmidt):
    /// `y = ẑ × hint / |ẑ × hint|`, `x = y × ẑ`.
    ///
    /// Returns `None` when `z_dir` vanishes or `x_hint` is parallel to it.
    pub fn from_z_and_x_hint(origin: Point3, z_dir: Point3, x_hint: Point3) -> Option<Self> {
        let z = z_dir.normalized()?;
        let y = z.cross(x_hint).normalized()?;
        let x = y.cross(z);
        Some(OrthoFrame { origin, x, y, z })
    }

    /// Scene → local coordinates.
    pub fn to_local(&self, p: Point3) -> Point3 {
        let d = p - self.origin;
        Point3::new(d.dot(self.x), d.dot(self.y), d.dot(self.z))
    }

    /// Local → scene coordinates.
    pub fn to_world(&self, local: Point3) -> Point3 {
        self.origin + self.x * local.x + self.y * local.y + self.z * local.z
    }

    /// Largest deviation from orthonormality over all axis pairs.
    pub fn orthonormality_error(&self) -> f64 {
        let axes = [self.x, self.y, self.z];
        let mut err: f64 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                err = err.max((axes[i].dot(axes[j]) - expect).abs());
            }
        }
        err
    }
}

/// Rotate a local point about the frame Z axis by `angle_deg` (counter-clockwise).
pub fn rotate_about_z(p: Point3, angle_deg: f64) -> Point3 {
    let (s, c) = angle_deg.to_radians().sin_cos();
    Point3::new(c * p.x - s * p.y, s * p.x + c * p.y, p.z)
}
