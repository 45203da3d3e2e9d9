// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field-Line Image Set
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Persisted output of a field-line run: image volume plus records.
//!
//! Stored as a NumPy `.npz` archive so the images can be fitted against
//! camera frames outside this crate. Record metadata also serialises to
//! JSON.

use flview_types::config::ViewConfig;
use flview_types::error::{ViewError, ViewResult};
use flview_types::record::FieldLineRecord;
use ndarray::{
    arr0, s, Array1, Array2, Array3, ArrayView2, Dimension, Ix0, Ix1, Ix2, Ix3, OwnedRepr,
};
use ndarray_npy::{NpzReader, NpzWriter, ReadableElement};
use serde::Serialize;
use std::fs::{self, File};
use std::path::PathBuf;

use crate::fieldlines::MappingReport;
use crate::raster::rasterize;

/// Sibling path the archive is written to before it is moved into place.
fn partial_path(path: &str) -> PathBuf {
    PathBuf::from(format!("{path}.part"))
}

/// Images of every accepted field line with their provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLineImageSet {
    pub shot: i64,
    pub time: f64,
    pub smoothing: usize,
    /// Toroidal angle the lines were started from [deg].
    pub start_phi: f64,
    pub fieldline_r: Array1<f64>,
    pub fieldline_z: Array1<f64>,
    /// Shape (64, 64, N), `[row, col, line]`.
    pub images: Array3<f64>,
    pub records: Vec<FieldLineRecord>,
}

/// JSON view of the set without the image volume.
#[derive(Serialize)]
struct ImageSetMeta<'a> {
    shot: i64,
    time: f64,
    smoothing: usize,
    start_phi: f64,
    records: &'a [FieldLineRecord],
}

impl FieldLineImageSet {
    /// Rasterise the records of a successful mapping run.
    pub fn from_records(
        records: Vec<FieldLineRecord>,
        shot: i64,
        time: f64,
        smoothing: usize,
        start_phi: f64,
    ) -> Self {
        let images = rasterize(&records, smoothing);
        FieldLineImageSet {
            shot,
            time,
            smoothing,
            start_phi,
            fieldline_r: records.iter().map(|r| r.seed_r).collect(),
            fieldline_z: records.iter().map(|r| r.seed_z).collect(),
            images,
            records,
        }
    }

    /// Image set for a mapping run made with `config`.
    pub fn from_report(report: MappingReport, config: &ViewConfig) -> Self {
        Self::from_records(
            report.records,
            config.shot,
            config.time,
            config.smoothing_window,
            config.aperture.phi_deg,
        )
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn image(&self, k: usize) -> ArrayView2<'_, f64> {
        self.images.slice(s![.., .., k])
    }

    pub fn save_npz(&self, path: &str) -> ViewResult<()> {
        let n = self.records.len();
        let capacity = self.records.first().map_or(0, FieldLineRecord::capacity);
        let mut pixel_x = Array2::zeros((n, capacity));
        let mut pixel_y = Array2::zeros((n, capacity));
        for (i, rec) in self.records.iter().enumerate() {
            if rec.capacity() != capacity {
                return Err(ViewError::Npz(format!(
                    "record {} has capacity {}, expected {capacity}",
                    rec.label,
                    rec.capacity()
                )));
            }
            pixel_x.row_mut(i).assign(&Array1::from_vec(rec.x.clone()));
            pixel_y.row_mut(i).assign(&Array1::from_vec(rec.y.clone()));
        }
        let partial = partial_path(path);
        let written = File::create(&partial)
            .map_err(ViewError::from)
            .and_then(|file| self.write_npz(file, path, &pixel_x, &pixel_y));
        match written {
            Ok(()) => {
                fs::rename(&partial, path)?;
                Ok(())
            }
            Err(e) => {
                fs::remove_file(&partial).ok();
                Err(e)
            }
        }
    }

    fn write_npz(
        &self,
        file: File,
        path: &str,
        pixel_x: &Array2<f64>,
        pixel_y: &Array2<f64>,
    ) -> ViewResult<()> {
        let as_i64 = |f: fn(&FieldLineRecord) -> usize| -> Array1<i64> {
            self.records.iter().map(|r| f(r) as i64).collect()
        };
        let mut npz = NpzWriter::new(file);
        let write_err = |e: ndarray_npy::WriteNpzError| {
            ViewError::Npz(format!("Failed to write npz '{path}': {e}"))
        };
        npz.add_array("fl_image", &self.images).map_err(write_err)?;
        npz.add_array("fieldline_r", &self.fieldline_r).map_err(write_err)?;
        npz.add_array("fieldline_z", &self.fieldline_z).map_err(write_err)?;
        npz.add_array("pixel_x", pixel_x).map_err(write_err)?;
        npz.add_array("pixel_y", pixel_y).map_err(write_err)?;
        npz.add_array("n_in_frame", &as_i64(|r| r.n_in_frame)).map_err(write_err)?;
        npz.add_array("traced_points", &as_i64(|r| r.traced_points)).map_err(write_err)?;
        npz.add_array("seed_index", &as_i64(|r| r.seed_index)).map_err(write_err)?;
        npz.add_array("shot", &arr0(self.shot)).map_err(write_err)?;
        npz.add_array("time", &arr0(self.time)).map_err(write_err)?;
        npz.add_array("smoothing", &arr0(self.smoothing as i64)).map_err(write_err)?;
        npz.add_array("start_phi", &arr0(self.start_phi)).map_err(write_err)?;
        npz.finish().map_err(write_err)?;
        Ok(())
    }

    pub fn load_npz(path: &str) -> ViewResult<Self> {
        let file = File::open(path)?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| ViewError::Npz(format!("Failed to open npz '{path}': {e}")))?;

        let images: Array3<f64> = read_array::<f64, Ix3>(&mut npz, "fl_image")?;
        let fieldline_r: Array1<f64> = read_array::<f64, Ix1>(&mut npz, "fieldline_r")?;
        let fieldline_z: Array1<f64> = read_array::<f64, Ix1>(&mut npz, "fieldline_z")?;
        let pixel_x: Array2<f64> = read_array::<f64, Ix2>(&mut npz, "pixel_x")?;
        let pixel_y: Array2<f64> = read_array::<f64, Ix2>(&mut npz, "pixel_y")?;
        let n_in_frame: Array1<i64> = read_array::<i64, Ix1>(&mut npz, "n_in_frame")?;
        let traced_points: Array1<i64> = read_array::<i64, Ix1>(&mut npz, "traced_points")?;
        let seed_index: Array1<i64> = read_array::<i64, Ix1>(&mut npz, "seed_index")?;
        let shot = read_array::<i64, Ix0>(&mut npz, "shot")?.into_scalar();
        let time = read_array::<f64, Ix0>(&mut npz, "time")?.into_scalar();
        let smoothing = read_array::<i64, Ix0>(&mut npz, "smoothing")?.into_scalar();
        let start_phi = read_array::<f64, Ix0>(&mut npz, "start_phi")?.into_scalar();

        let n = fieldline_r.len();
        let consistent = fieldline_z.len() == n
            && images.dim().2 == n
            && pixel_x.nrows() == n
            && pixel_y.dim() == pixel_x.dim()
            && n_in_frame.len() == n
            && traced_points.len() == n
            && seed_index.len() == n;
        if !consistent {
            return Err(ViewError::Npz(format!("inconsistent line counts in '{path}'")));
        }

        let records = (0..n)
            .map(|i| FieldLineRecord {
                label: format!("fieldline{}", seed_index[i]),
                seed_index: seed_index[i] as usize,
                shot,
                time,
                seed_r: fieldline_r[i],
                seed_z: fieldline_z[i],
                traced_points: traced_points[i] as usize,
                n_in_frame: n_in_frame[i] as usize,
                x: pixel_x.row(i).to_vec(),
                y: pixel_y.row(i).to_vec(),
            })
            .collect();

        Ok(FieldLineImageSet {
            shot,
            time,
            smoothing: smoothing as usize,
            start_phi,
            fieldline_r,
            fieldline_z,
            images,
            records,
        })
    }

    /// Metadata and records as JSON; the image volume is left out.
    pub fn to_json(&self) -> ViewResult<String> {
        let meta = ImageSetMeta {
            shot: self.shot,
            time: self.time,
            smoothing: self.smoothing,
            start_phi: self.start_phi,
            records: &self.records,
        };
        Ok(serde_json::to_string_pretty(&meta)?)
    }
}

fn read_array<T, D>(npz: &mut NpzReader<File>, key: &str) -> ViewResult<ndarray::Array<T, D>>
where
    T: ReadableElement,
    D: Dimension,
{
    npz.by_name::<OwnedRepr<T>, D>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<T>, D>(key))
        .map_err(|e| ViewError::Npz(format!("Failed to read {key} from npz: {e}")))
}
