// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Synthetic View
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Complete view build: store → sightline → cull → image plane → projection.
//!
//! The store is assembled in a fixed order: hardware, then calibration
//! markers, then field lines as they are added. A missing sightline
//! aborts the build and no partial view is returned.

use flview_math::coords::cyl_to_cart;
use flview_types::config::ViewConfig;
use flview_types::error::ViewResult;
use flview_types::state::{NewSegment, Point3, SegmentStore};
use log::{debug, info};

use crate::aperture::{locate_sightline, Sightline};
use crate::culling::{cull_segment, cull_store, CullParams, CulledScene};
use crate::hardware::{calibration_segments, GeometryCache, GeometryKey, HardwareSource};
use crate::image_plane::ImagePlane;
use crate::projection::{project_point, project_points, project_store, ProjectedSegment};

/// One camera view of the scene.
#[derive(Debug, Clone)]
pub struct SyntheticView {
    pub config: ViewConfig,
    pub eye: Point3,
    /// Full, unculled store.
    pub store: SegmentStore,
    pub sightline: Sightline,
    pub cull: CullParams,
    pub culled: CulledScene,
    pub plane: ImagePlane,
    /// Index-aligned with `culled.store`.
    pub projected: Vec<ProjectedSegment>,
}

impl SyntheticView {
    /// Build from already loaded hardware segments.
    pub fn build(config: ViewConfig, hardware: Vec<NewSegment>) -> ViewResult<Self> {
        config.validate()?;
        let eye = cyl_to_cart(config.aperture);

        let mut store = SegmentStore::new();
        store.extend(hardware);
        store.extend(calibration_segments(&config.calibration_corners));
        debug!(
            "Scene store: {} segments, {} points",
            store.len(),
            store.point_count()
        );

        let sightline = locate_sightline(eye, config.alpha_deg, config.beta_deg, &store)?;
        let cull = CullParams::new(&sightline, &config);
        let culled = cull_store(
            &cull,
            &store,
            Some((sightline.spot_id, sightline.spot_point)),
        );
        let plane = ImagePlane::from_config(&sightline, &config)?;
        let projected = project_store(&culled.store, eye, &plane, config.rotation_deg);

        info!(
            "View '{}' built: spot at {:?}, {}/{} segments visible",
            config.view_kind,
            sightline.spot.to_array(),
            culled.store.len(),
            store.len()
        );

        Ok(SyntheticView {
            config,
            eye,
            store,
            sightline,
            cull,
            culled,
            plane,
            projected,
        })
    }

    /// Build with hardware geometry taken from `cache`, loading it on a miss.
    pub fn build_cached(
        config: ViewConfig,
        cache: &mut GeometryCache,
        source: &dyn HardwareSource,
    ) -> ViewResult<Self> {
        let key = GeometryKey::from_config(&config);
        let hardware = cache.get_or_load(source, &key)?.to_vec();
        Self::build(config, hardware)
    }

    /// Append a field line, cull and project it.
    ///
    /// Returns the projected visible points; empty when the line is
    /// entirely outside the field of view.
    pub fn add_field_line(&mut self, line: NewSegment) -> Vec<Point3> {
        let ids = self.store.extend(std::iter::once(line));
        let Some(seg) = ids.first().and_then(|&id| self.store.get(id)) else {
            return Vec::new();
        };
        let Some((trimmed, kept)) = cull_segment(&self.cull, seg) else {
            return Vec::new();
        };

        let points = project_points(
            &trimmed.points,
            self.eye,
            &self.plane,
            self.config.rotation_deg,
        );
        self.projected.push(ProjectedSegment {
            id: trimmed.id,
            label: trimmed.label.clone(),
            kind: trimmed.kind,
            points: points.clone(),
        });
        self.culled.adopt(trimmed, kept);
        points
    }

    pub fn projected_by_label(&self, label: &str) -> Option<&ProjectedSegment> {
        self.projected.iter().find(|p| p.label == label)
    }

    /// Projected position of the sightline spot, the frame's visual centre.
    pub fn spot_marker(&self) -> Option<Point3> {
        let (iseg, ip) = self.culled.spot?;
        self.projected.get(iseg)?.points.get(ip).copied()
    }

    /// Projection of an arbitrary scene point through this view.
    pub fn project(&self, p: Point3) -> Point3 {
        project_point(p, self.eye, &self.plane, self.config.rotation_deg)
    }
}
