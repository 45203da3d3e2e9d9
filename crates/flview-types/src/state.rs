// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Scene data model: points, labelled polylines and the append-only store.

use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::constants::EPS_LENGTH;

/// Cartesian scene position [m].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    pub fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Point3) -> Point3 {
        Point3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Length of the projection onto the horizontal (X, Y) plane.
    pub fn norm_xy(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector, or `None` when the length is below [`EPS_LENGTH`].
    pub fn normalized(self) -> Option<Point3> {
        let n = self.norm();
        if n < EPS_LENGTH || !n.is_finite() {
            None
        } else {
            Some(self * (1.0 / n))
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Point3 {
    type Output = Point3;
    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;
    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Point3;
    fn mul(self, s: f64) -> Point3 {
        Point3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Point3 {
    type Output = Point3;
    fn neg(self) -> Point3 {
        Point3::new(-self.x, -self.y, -self.z)
    }
}

/// Cylindrical position: major radius R [m], height Z [m], toroidal angle phi [deg].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCyl {
    pub r: f64,
    pub z: f64,
    pub phi_deg: f64,
}

impl PointCyl {
    pub const fn new(r: f64, z: f64, phi_deg: f64) -> Self {
        PointCyl { r, z, phi_deg }
    }
}

/// Stable segment identity. Assigned monotonically by [`SegmentStore`], never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub usize);

/// Provenance of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Hardware,
    Calibration,
    FieldLine,
}

/// A polyline waiting to be appended to a [`SegmentStore`].
#[derive(Debug, Clone)]
pub struct NewSegment {
    pub label: String,
    pub kind: SegmentKind,
    pub color: [f32; 3],
    pub points: Vec<Point3>,
}

impl NewSegment {
    pub fn new(label: impl Into<String>, kind: SegmentKind, points: Vec<Point3>) -> Self {
        let color = match kind {
            SegmentKind::Hardware => [0.5, 0.5, 0.5],
            SegmentKind::Calibration => [1.0, 0.0, 0.0],
            SegmentKind::FieldLine => [0.0, 0.8, 1.0],
        };
        NewSegment {
            label: label.into(),
            kind,
            color,
            points,
        }
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }
}

/// A labelled, coloured polyline owned by a [`SegmentStore`].
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: SegmentId,
    pub label: String,
    pub kind: SegmentKind,
    pub color: [f32; 3],
    /// Port colour index (1-based) for segments lying in a port plane.
    pub port: Option<usize>,
    pub points: Vec<Point3>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same segment restricted to the given point indices, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Segment {
        Segment {
            id: self.id,
            label: self.label.clone(),
            kind: self.kind,
            color: self.color,
            port: self.port,
            points: indices.iter().map(|&i| self.points[i]).collect(),
        }
    }
}

/// Insertion-ordered, append-only collection of segments.
///
/// Producers (hardware loader, calibration corners, field lines) append
/// whole batches; segments are never edited in place.
#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    next_id: usize,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from segments that already carry ids, e.g. a trimmed
    /// copy of another store. Ids must be strictly increasing.
    pub fn from_segments(segments: Vec<Segment>, next_id: usize) -> Self {
        debug_assert!(segments.windows(2).all(|w| w[0].id < w[1].id));
        debug_assert!(segments.last().map_or(true, |s| s.id.0 < next_id));
        SegmentStore { segments, next_id }
    }

    /// Append a batch of polylines, returning the ids assigned to them.
    pub fn extend<I>(&mut self, batch: I) -> Vec<SegmentId>
    where
        I: IntoIterator<Item = NewSegment>,
    {
        let mut ids = Vec::new();
        for seg in batch {
            let id = SegmentId(self.next_id);
            self.next_id += 1;
            self.segments.push(Segment {
                id,
                label: seg.label,
                kind: seg.kind,
                color: seg.color,
                port: None,
                points: seg.points,
            });
            ids.push(id);
        }
        ids
    }

    /// Append a segment that already carries an id from a parent store.
    /// The id must not precede the ids held here.
    pub fn adopt(&mut self, seg: Segment) {
        debug_assert!(self.segments.last().map_or(true, |s| s.id < seg.id));
        self.next_id = self.next_id.max(seg.id.0 + 1);
        self.segments.push(seg);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Id the next appended segment will receive.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Dense position of a segment id, if present.
    pub fn position(&self, id: SegmentId) -> Option<usize> {
        self.segments.binary_search_by_key(&id, |s| s.id).ok()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.position(id).map(|i| &self.segments[i])
    }

    /// First segment carrying `label`.
    pub fn by_label(&self, label: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.label == label)
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Fixed-shape `[n_segments, max_len, 3]` view, NaN padded.
    pub fn padded_points(&self) -> Array3<f64> {
        let max_len = self.segments.iter().map(Segment::len).max().unwrap_or(0);
        let mut out = Array3::from_elem((self.segments.len(), max_len, 3), f64::NAN);
        for (i, seg) in self.segments.iter().enumerate() {
            for (j, p) in seg.points.iter().enumerate() {
                out[[i, j, 0]] = p.x;
                out[[i, j, 1]] = p.y;
                out[[i, j, 2]] = p.z;
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a SegmentStore {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
