// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field-Line Records
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-field-line pixel records and their padding builder.

use serde::{Deserialize, Serialize};

/// Pixel-space trace of one field line, immutable once built.
///
/// `x` and `y` share a fixed capacity across a record set; only the first
/// `n_in_frame` entries are meaningful, the rest are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLineRecord {
    pub label: String,
    /// Position in the seed grid, `iz * nr + ir`.
    pub seed_index: usize,
    pub shot: i64,
    pub time: f64,
    pub seed_r: f64,
    pub seed_z: f64,
    /// Points in the traced curve before culling.
    pub traced_points: usize,
    pub n_in_frame: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl FieldLineRecord {
    /// True (unpadded) pixel coordinates.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .take(self.n_in_frame)
            .map(|(&x, &y)| (x, y))
    }

    pub fn capacity(&self) -> usize {
        self.x.len()
    }
}

/// Record data before the shared capacity is known.
#[derive(Debug, Clone)]
pub struct PendingRecord {
    pub label: String,
    pub seed_index: usize,
    pub shot: i64,
    pub time: f64,
    pub seed_r: f64,
    pub seed_z: f64,
    pub traced_points: usize,
    pub pixels: Vec<(f64, f64)>,
}

/// Accumulates records and pads them to the largest in-frame count on `finish`.
#[derive(Debug, Default)]
pub struct FieldLineRecordBuilder {
    pending: Vec<PendingRecord>,
}

impl FieldLineRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PendingRecord) {
        self.pending.push(record);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn finish(self) -> Vec<FieldLineRecord> {
        let capacity = self
            .pending
            .iter()
            .map(|p| p.pixels.len())
            .max()
            .unwrap_or(0);

        self.pending
            .into_iter()
            .map(|p| {
                let mut x = vec![0.0; capacity];
                let mut y = vec![0.0; capacity];
                for (i, &(px, py)) in p.pixels.iter().enumerate() {
                    x[i] = px;
                    y[i] = py;
                }
                FieldLineRecord {
                    label: p.label,
                    seed_index: p.seed_index,
                    shot: p.shot,
                    time: p.time,
                    seed_r: p.seed_r,
                    seed_z: p.seed_z,
                    traced_points: p.traced_points,
                    n_in_frame: p.pixels.len(),
                    x,
                    y,
                }
            })
            .collect()
    }
}
