// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Coordinates
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cylindrical (R, Z, phi) ↔ Cartesian (X, Y, Z) conversion.
//!
//! Machine convention: phi is measured from the +Y axis towards +X, so
//! X = R sin(phi), Y = R cos(phi) and phi = atan2(X, Y), in degrees,
//! normalised into [0, 360). NaN inputs propagate to NaN outputs.

use flview_types::state::{Point3, PointCyl};

/// Fold an angle into [0, 360).
pub fn normalize_deg(phi_deg: f64) -> f64 {
    let phi = phi_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if phi >= 360.0 {
        0.0
    } else {
        phi
    }
}

pub fn cyl_to_cart(p: PointCyl) -> Point3 {
    let phi = p.phi_deg.to_radians();
    Point3::new(p.r * phi.sin(), p.r * phi.cos(), p.z)
}

pub fn cart_to_cyl(p: Point3) -> PointCyl {
    PointCyl::new(p.norm_xy(), p.z, azimuth_deg(p))
}

pub fn cyl_to_cart_all(points: &[PointCyl]) -> Vec<Point3> {
    points.iter().copied().map(cyl_to_cart).collect()
}

pub fn cart_to_cyl_all(points: &[Point3]) -> Vec<PointCyl> {
    points.iter().copied().map(cart_to_cyl).collect()
}

/// Toroidal angle of a Cartesian point [deg].
pub fn azimuth_deg(p: Point3) -> f64 {
    normalize_deg(p.x.atan2(p.y).to_degrees())
}
